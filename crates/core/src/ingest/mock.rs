use crate::config::DEFAULT_BRANDS;
use crate::domain::raw::{MockRecord, RawRecord};
use crate::ingest::{DealSource, SourceUnavailable};
use crate::time::local_today;
use chrono::Utc;

/// Zero-dependency baseline source: one deterministic preset offer per
/// requested brand, cycling through a small catalogue. Also serves as the
/// pipeline's test fixture.
#[derive(Debug, Default)]
pub struct MockSource;

struct Preset {
    title: &'static str,
    original_price: f64,
    final_price: f64,
    recommendation: &'static str,
}

const PRESETS: &[Preset] = &[
    Preset {
        title: "早餐超值双人套餐",
        original_price: 32.0,
        final_price: 19.9,
        recommendation: "适合两人早餐搭配，性价比高。",
    },
    Preset {
        title: "午餐精选堡+饮料",
        original_price: 36.0,
        final_price: 22.9,
        recommendation: "工作日午餐刚刚好，饱腹又不贵。",
    },
    Preset {
        title: "家庭分享桶",
        original_price: 89.0,
        final_price: 59.9,
        recommendation: "三四人聚餐首选，适合聚会分享。",
    },
];

impl MockSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl DealSource for MockSource {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, brands: &[String]) -> Result<Vec<RawRecord>, SourceUnavailable> {
        let fallback: Vec<String>;
        let brands: &[String] = if brands.is_empty() {
            fallback = DEFAULT_BRANDS.iter().map(|s| s.to_string()).collect();
            fallback.as_slice()
        } else {
            brands
        };

        let today = local_today(Utc::now());
        let records = brands
            .iter()
            .enumerate()
            .map(|(idx, brand)| {
                let preset = &PRESETS[idx % PRESETS.len()];
                RawRecord::Mock(MockRecord {
                    date: today,
                    brand: brand.clone(),
                    title: preset.title.to_string(),
                    original_price: preset.original_price,
                    final_price: preset.final_price,
                    main_image_url: format!("https://example.com/{brand}/deal_{idx}.jpg"),
                    recommendation: preset.recommendation.to_string(),
                })
            })
            .collect();

        Ok(records)
    }
}
