use regex::Regex;
use std::sync::OnceLock;

// Currency amount adjacent to a symbol or unit: "¥19.9", "￥ 22", "$5.99",
// or the suffixed form "19.9元".
fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:[¥￥$]\s*([0-9]+(?:\.[0-9]+)?))|(?:([0-9]+(?:\.[0-9]+)?)\s*元)")
            .expect("price pattern is valid")
    })
}

/// Best-effort price extraction from free text. Returns the first
/// currency-adjacent amount, or `None` when the text carries no price.
pub fn extract_price(text: &str) -> Option<f64> {
    let caps = price_pattern().captures(text)?;
    let digits = caps.get(1).or_else(|| caps.get(2))?;
    digits.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_symbol_prefixed_amounts() {
        assert_eq!(extract_price("限时 ¥19.9 秒杀"), Some(19.9));
        assert_eq!(extract_price("now only $5.99!"), Some(5.99));
        assert_eq!(extract_price("￥ 22 起"), Some(22.0));
    }

    #[test]
    fn extracts_unit_suffixed_amounts() {
        assert_eq!(extract_price("到手价59.9元，含配送"), Some(59.9));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(extract_price("原价¥36，现价¥22.9"), Some(36.0));
    }

    #[test]
    fn no_price_yields_none() {
        assert_eq!(extract_price("今日新品上市"), None);
        // A bare number with no currency marker is not a price.
        assert_eq!(extract_price("第3波活动开始"), None);
    }
}
