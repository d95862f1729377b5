pub mod api;
pub mod feed;
pub mod mock;
pub mod price;

use crate::config::{Settings, SourceKind};
use crate::domain::raw::RawRecord;
use std::fmt;

/// Adapter failure: the backing transport could not complete the request
/// (timeout, non-2xx, malformed payload). Zero results is not an error.
#[derive(Debug, Clone)]
pub struct SourceUnavailable {
    pub source: &'static str,
    pub detail: String,
}

impl SourceUnavailable {
    pub fn new(source: &'static str, detail: impl Into<String>) -> Self {
        Self {
            source,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source unavailable (source={}): {}", self.source, self.detail)
    }
}

impl std::error::Error for SourceUnavailable {}

#[async_trait::async_trait]
pub trait DealSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Fetch today's raw promotional records for the requested brands.
    /// Finite and restartable per invocation; an empty vec is a valid result.
    async fn fetch(&self, brands: &[String]) -> Result<Vec<RawRecord>, SourceUnavailable>;
}

pub fn build_source(settings: &Settings) -> anyhow::Result<Box<dyn DealSource>> {
    match settings.source {
        SourceKind::Mock => Ok(Box::new(mock::MockSource::new())),
        SourceKind::Feed => Ok(Box::new(feed::FeedSource::from_settings(settings)?)),
        SourceKind::Api => Ok(Box::new(api::ApiSource::from_settings(settings)?)),
    }
}
