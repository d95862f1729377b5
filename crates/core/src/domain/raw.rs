use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Source-specific record as produced by a source adapter. Consumed only by
/// the normalizer; it never crosses that boundary.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Mock(MockRecord),
    Feed(FeedRecord),
    Api(ApiRecord),
}

#[derive(Debug, Clone)]
pub struct MockRecord {
    pub date: NaiveDate,
    pub brand: String,
    pub title: String,
    pub original_price: f64,
    pub final_price: f64,
    pub main_image_url: String,
    pub recommendation: String,
}

/// One syndication-feed entry that matched a requested brand. Prices are
/// best-effort extractions from free text and may be absent.
#[derive(Debug, Clone)]
pub struct FeedRecord {
    pub brand: String,
    pub title: String,
    pub summary: String,
    pub link: Option<String>,
    pub published: Option<NaiveDate>,
    pub final_price: Option<f64>,
    pub original_price: Option<f64>,
}

/// One element of the JSON array returned by the API source, kept as the raw
/// object so the normalizer can run its alias resolution over it.
#[derive(Debug, Clone)]
pub struct ApiRecord {
    pub fields: Map<String, Value>,
}
