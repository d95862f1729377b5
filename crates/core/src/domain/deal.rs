use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical normalized offer record. Always fully constructed: the
/// normalizer fills every field, so downstream stages never see a
/// half-populated deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub date: NaiveDate,
    pub brand: String,
    pub title: String,
    pub original_price: f64,
    pub final_price: f64,
    pub discount_percent: f64,
    pub main_image_url: Option<String>,
    pub recommendation: Option<String>,
}

impl Deal {
    /// Discount as a percentage of the original price, rounded to one
    /// decimal. Zero when the original price is zero: a free-or-unknown
    /// list price gives no meaningful discount, and a negative percentage
    /// display is worse than none.
    pub fn derive_discount_percent(original_price: f64, final_price: f64) -> f64 {
        if original_price <= 0.0 {
            return 0.0;
        }
        round1((1.0 - final_price / original_price) * 100.0)
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_rounded_discount() {
        assert_eq!(Deal::derive_discount_percent(32.0, 19.9), 37.8);
        assert_eq!(Deal::derive_discount_percent(89.0, 59.9), 32.7);
    }

    #[test]
    fn zero_original_price_is_zero_discount() {
        assert_eq!(Deal::derive_discount_percent(0.0, 19.9), 0.0);
    }

    #[test]
    fn negative_discount_passes_through_when_original_positive() {
        // final > original is rendered as-is, not corrected.
        assert_eq!(Deal::derive_discount_percent(10.0, 15.0), -50.0);
    }
}
