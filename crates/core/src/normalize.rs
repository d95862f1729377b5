use crate::domain::deal::{round1, Deal};
use crate::domain::raw::{ApiRecord, FeedRecord, MockRecord, RawRecord};
use crate::ingest::price::extract_price;
use chrono::NaiveDate;
use serde_json::Value;

// Ordered alias lists for the API source's loosely-specified field names;
// the first present key wins. Localized spellings come from feeds that
// publish Chinese field names.
const DATE_ALIASES: &[&str] = &["date", "日期"];
const BRAND_ALIASES: &[&str] = &["brand", "brand_name", "品牌"];
const TITLE_ALIASES: &[&str] = &["title", "name", "标题"];
const ORIGINAL_PRICE_ALIASES: &[&str] = &["original_price", "list_price", "原价"];
const FINAL_PRICE_ALIASES: &[&str] = &["final_price", "price", "到手价"];
const DISCOUNT_ALIASES: &[&str] = &["discount_percent", "discount", "优惠力度"];
const IMAGE_ALIASES: &[&str] = &["main_image_url", "image_url", "image", "主图"];
const RECOMMENDATION_ALIASES: &[&str] = &["recommendation", "note", "推荐语"];

/// Map any raw record into a fully-constructed `Deal`. Total over every
/// shape a source adapter can produce: unresolvable fields take defaults
/// (`0` for prices, `""` for text, `today` for the date) instead of failing.
pub fn normalize(raw: RawRecord, today: NaiveDate) -> Deal {
    match raw {
        RawRecord::Mock(record) => from_mock(record),
        RawRecord::Feed(record) => from_feed(record, today),
        RawRecord::Api(record) => from_api(record, today),
    }
}

fn from_mock(record: MockRecord) -> Deal {
    let discount_percent =
        Deal::derive_discount_percent(record.original_price, record.final_price);
    Deal {
        date: record.date,
        brand: record.brand,
        title: record.title,
        original_price: record.original_price,
        final_price: record.final_price,
        discount_percent,
        main_image_url: Some(record.main_image_url),
        recommendation: Some(record.recommendation),
    }
}

fn from_feed(record: FeedRecord, today: NaiveDate) -> Deal {
    let original_price = record.original_price.unwrap_or(0.0);
    let final_price = record.final_price.unwrap_or(0.0);
    Deal {
        date: record.published.unwrap_or(today),
        brand: record.brand,
        title: record.title,
        original_price,
        final_price,
        discount_percent: Deal::derive_discount_percent(original_price, final_price),
        main_image_url: None,
        recommendation: non_empty(record.summary),
    }
}

fn from_api(record: ApiRecord, today: NaiveDate) -> Deal {
    let fields = &record.fields;

    let original_price = first_number(fields, ORIGINAL_PRICE_ALIASES).unwrap_or(0.0);
    let final_price = first_number(fields, FINAL_PRICE_ALIASES).unwrap_or(0.0);
    let discount_percent = first_number(fields, DISCOUNT_ALIASES)
        .map(round1)
        .unwrap_or_else(|| Deal::derive_discount_percent(original_price, final_price));

    Deal {
        date: first_string(fields, DATE_ALIASES)
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
            .unwrap_or(today),
        brand: first_string(fields, BRAND_ALIASES).unwrap_or_default(),
        title: first_string(fields, TITLE_ALIASES).unwrap_or_default(),
        original_price,
        final_price,
        discount_percent,
        main_image_url: first_string(fields, IMAGE_ALIASES).and_then(non_empty),
        recommendation: first_string(fields, RECOMMENDATION_ALIASES).and_then(non_empty),
    }
}

fn first_string(fields: &serde_json::Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(fields: &serde_json::Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    aliases.iter().find_map(|key| match fields.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        // Free-text amounts ("¥19.9") show up in loosely-typed payloads.
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().or_else(|| extract_price(s)),
        _ => None,
    })
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw::ApiRecord;
    use serde_json::json;

    fn api_record(value: serde_json::Value) -> RawRecord {
        match value {
            Value::Object(fields) => RawRecord::Api(ApiRecord { fields }),
            _ => panic!("fixture must be an object"),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    #[test]
    fn empty_record_takes_documented_defaults() {
        let deal = normalize(api_record(json!({})), today());
        assert_eq!(deal.date, today());
        assert_eq!(deal.brand, "");
        assert_eq!(deal.title, "");
        assert_eq!(deal.original_price, 0.0);
        assert_eq!(deal.final_price, 0.0);
        assert_eq!(deal.discount_percent, 0.0);
        assert_eq!(deal.main_image_url, None);
        assert_eq!(deal.recommendation, None);
    }

    #[test]
    fn alias_order_is_first_match_wins() {
        let deal = normalize(
            api_record(json!({"price": 25.0, "final_price": 19.9, "到手价": 10.0})),
            today(),
        );
        assert_eq!(deal.final_price, 19.9);
    }

    #[test]
    fn localized_aliases_resolve() {
        let deal = normalize(
            api_record(json!({
                "品牌": "德克士",
                "标题": "脆皮炸鸡双人餐",
                "原价": 66.0,
                "到手价": 39.9
            })),
            today(),
        );
        assert_eq!(deal.brand, "德克士");
        assert_eq!(deal.original_price, 66.0);
        assert_eq!(deal.final_price, 39.9);
        assert_eq!(deal.discount_percent, 39.5);
    }

    #[test]
    fn string_prices_are_parsed_from_free_text() {
        let deal = normalize(api_record(json!({"price": "¥19.9"})), today());
        assert_eq!(deal.final_price, 19.9);
    }

    #[test]
    fn supplied_discount_is_kept_and_rounded() {
        let deal = normalize(
            api_record(json!({"original_price": 30.0, "price": 15.0, "discount": 42.123})),
            today(),
        );
        assert_eq!(deal.discount_percent, 42.1);
    }

    #[test]
    fn feed_record_without_price_defaults_to_zero() {
        let record = RawRecord::Feed(crate::domain::raw::FeedRecord {
            brand: "肯德基".to_string(),
            title: "新品上市".to_string(),
            summary: String::new(),
            link: None,
            published: None,
            final_price: None,
            original_price: None,
        });
        let deal = normalize(record, today());
        assert_eq!(deal.final_price, 0.0);
        assert_eq!(deal.discount_percent, 0.0);
        assert_eq!(deal.date, today());
        assert_eq!(deal.recommendation, None);
    }
}
