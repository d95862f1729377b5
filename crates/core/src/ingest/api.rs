use crate::config::{HttpMethod, Settings};
use crate::domain::raw::{ApiRecord, RawRecord};
use crate::ingest::{DealSource, SourceUnavailable};
use anyhow::Context;
use serde_json::Value;
use std::time::Duration;

/// Single-shot HTTP JSON source: one GET or POST against a configured
/// endpoint whose body must be a JSON array of deal objects.
#[derive(Debug)]
pub struct ApiSource {
    http: reqwest::Client,
    url: String,
    method: HttpMethod,
}

impl ApiSource {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let url = settings.require_api_url()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build api http client")?;

        Ok(Self {
            http,
            url,
            method: settings.api_method,
        })
    }
}

#[async_trait::async_trait]
impl DealSource for ApiSource {
    fn source_name(&self) -> &'static str {
        "api"
    }

    async fn fetch(&self, brands: &[String]) -> Result<Vec<RawRecord>, SourceUnavailable> {
        let request = match self.method {
            HttpMethod::Get => self
                .http
                .get(&self.url)
                .query(&[("brands", brands.join(","))]),
            HttpMethod::Post => self
                .http
                .post(&self.url)
                .json(&serde_json::json!({ "brands": brands })),
        };

        let res = request
            .send()
            .await
            .map_err(|err| SourceUnavailable::new("api", format!("request failed: {err}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(SourceUnavailable::new("api", format!("HTTP {status}")));
        }

        let body: Value = res
            .json()
            .await
            .map_err(|err| SourceUnavailable::new("api", format!("body is not JSON: {err}")))?;

        records_from_body(body)
    }
}

/// The endpoint contract is a top-level JSON array; anything else is a
/// malformed payload. Non-object elements are dropped with a warning rather
/// than failing the whole pull.
pub fn records_from_body(body: Value) -> Result<Vec<RawRecord>, SourceUnavailable> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(SourceUnavailable::new(
                "api",
                format!("expected a JSON array, got {}", json_kind(&other)),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(fields) => records.push(RawRecord::Api(ApiRecord { fields })),
            other => {
                tracing::warn!(kind = json_kind(&other), "dropping non-object api element");
            }
        }
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_objects_becomes_records() {
        let body = json!([
            {"brand": "肯德基", "price": 19.9},
            {"brand": "麦当劳", "price": 22.9}
        ]);
        let records = records_from_body(body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_array_is_a_valid_empty_result() {
        let records = records_from_body(json!([])).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn non_array_body_is_source_unavailable() {
        let err = records_from_body(json!({"items": []})).unwrap_err();
        assert_eq!(err.source, "api");
        assert!(err.detail.contains("expected a JSON array"));
    }

    #[test]
    fn non_object_elements_are_dropped() {
        let body = json!([{"brand": "德克士"}, 42, "noise"]);
        let records = records_from_body(body).unwrap();
        assert_eq!(records.len(), 1);
    }
}
