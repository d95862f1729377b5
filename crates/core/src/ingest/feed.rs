use crate::config::Settings;
use crate::domain::raw::{FeedRecord, RawRecord};
use crate::ingest::price::extract_price;
use crate::ingest::{DealSource, SourceUnavailable};
use anyhow::Context;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Pulls one or more syndication feeds, concatenates their entries, and keeps
/// only entries mentioning a requested brand. Price fields are best-effort
/// extractions; entries without a recognizable price are still kept.
#[derive(Debug)]
pub struct FeedSource {
    http: reqwest::Client,
    urls: Vec<String>,
}

impl FeedSource {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !settings.feed_urls.is_empty(),
            "DEALPOST_FEED_URLS must list at least one feed for the feed source"
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build feed http client")?;

        Ok(Self {
            http,
            urls: settings.feed_urls.clone(),
        })
    }

    async fn fetch_one(&self, url: &str) -> anyhow::Result<Vec<feed_rs::model::Entry>> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("feed request failed: {url}"))?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "feed HTTP {status}: {url}");

        let bytes = res
            .bytes()
            .await
            .with_context(|| format!("failed to read feed body: {url}"))?;
        let feed = feed_rs::parser::parse(&bytes[..])
            .with_context(|| format!("failed to parse feed: {url}"))?;

        Ok(feed.entries)
    }
}

#[async_trait::async_trait]
impl DealSource for FeedSource {
    fn source_name(&self) -> &'static str {
        "feed"
    }

    async fn fetch(&self, brands: &[String]) -> Result<Vec<RawRecord>, SourceUnavailable> {
        let mut entries = Vec::new();
        let mut failures = 0usize;

        for url in &self.urls {
            match self.fetch_one(url).await {
                Ok(batch) => {
                    tracing::info!(url, entries = batch.len(), "fetched feed");
                    entries.extend(batch);
                }
                Err(err) => {
                    failures += 1;
                    tracing::warn!(url, error = %err, "feed fetch failed, skipping");
                }
            }
        }

        // A partially degraded pull is still usable; only a total failure is.
        if failures == self.urls.len() {
            return Err(SourceUnavailable::new("feed", "all configured feeds failed"));
        }

        Ok(entries
            .into_iter()
            .filter_map(|entry| record_from_entry(&entry, brands))
            .map(RawRecord::Feed)
            .collect())
    }
}

/// Brand filter: case-sensitive substring match over the configured brand
/// strings, applied to the entry title and summary.
fn matched_brand(brands: &[String], title: &str, summary: &str) -> Option<String> {
    brands
        .iter()
        .find(|brand| title.contains(brand.as_str()) || summary.contains(brand.as_str()))
        .cloned()
}

fn record_from_entry(entry: &feed_rs::model::Entry, brands: &[String]) -> Option<FeedRecord> {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();
    let summary = entry
        .summary
        .as_ref()
        .map(|s| strip_html(&s.content))
        .unwrap_or_default();

    let brand = matched_brand(brands, &title, &summary)?;

    let combined = format!("{title} {summary}");
    Some(FeedRecord {
        brand,
        title,
        link: entry.links.first().map(|l| l.href.clone()),
        published: entry
            .published
            .or(entry.updated)
            .map(|dt| dt.date_naive()),
        final_price: extract_price(&combined),
        original_price: None,
        summary,
    })
}

fn strip_html(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
    tags.replace_all(text, " ")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_entries(xml: &str) -> Vec<feed_rs::model::Entry> {
        feed_rs::parser::parse(xml.as_bytes()).unwrap().entries
    }

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>deals</title>
<item>
  <title>肯德基 疯狂星期四回归</title>
  <description>&lt;p&gt;全家桶到手价59.9元&lt;/p&gt;</description>
  <link>https://example.com/kfc</link>
</item>
<item>
  <title>奶茶第二杯半价</title>
  <description>限时活动</description>
</item>
<item>
  <title>新店开业</title>
  <description>麦当劳 新店开业，免费小食</description>
</item>
</channel></rss>"#;

    #[test]
    fn keeps_only_brand_matching_entries() {
        let brands = vec!["肯德基".to_string(), "麦当劳".to_string()];
        let records: Vec<_> = parse_entries(SAMPLE_RSS)
            .iter()
            .filter_map(|e| record_from_entry(e, &brands))
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].brand, "肯德基");
        assert_eq!(records[1].brand, "麦当劳");
    }

    #[test]
    fn brand_match_is_case_sensitive() {
        let brands = vec!["KFC".to_string()];
        assert!(matched_brand(&brands, "kfc deal of the day", "").is_none());
        assert!(matched_brand(&brands, "KFC deal of the day", "").is_some());
    }

    #[test]
    fn extracts_price_and_strips_html_from_summary() {
        let brands = vec!["肯德基".to_string()];
        let records: Vec<_> = parse_entries(SAMPLE_RSS)
            .iter()
            .filter_map(|e| record_from_entry(e, &brands))
            .collect();

        assert_eq!(records[0].final_price, Some(59.9));
        assert_eq!(records[0].summary, "全家桶到手价59.9元");
    }

    #[test]
    fn priceless_entries_are_kept_with_unset_price() {
        let brands = vec!["麦当劳".to_string()];
        let records: Vec<_> = parse_entries(SAMPLE_RSS)
            .iter()
            .filter_map(|e| record_from_entry(e, &brands))
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].final_price, None);
    }
}
