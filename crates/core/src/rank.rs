use crate::domain::deal::Deal;

/// Order deals brand-lexically for display and mark the best value.
///
/// `best_index` points into the returned vector at the deal with the highest
/// `discount_percent`; ties go to the deal seen earliest in the input. Empty
/// input yields `None`.
pub fn rank(deals: Vec<Deal>) -> (Vec<Deal>, Option<usize>) {
    if deals.is_empty() {
        return (deals, None);
    }

    // Resolve the winner against input order first, so ties keep the
    // first-seen deal regardless of how sorting rearranges them.
    let mut best_input = 0usize;
    for (idx, deal) in deals.iter().enumerate().skip(1) {
        if deal.discount_percent > deals[best_input].discount_percent {
            best_input = idx;
        }
    }

    let mut indexed: Vec<(usize, Deal)> = deals.into_iter().enumerate().collect();
    indexed.sort_by(|a, b| a.1.brand.cmp(&b.1.brand));

    let best_index = indexed.iter().position(|(input_idx, _)| *input_idx == best_input);
    let ordered = indexed.into_iter().map(|(_, deal)| deal).collect();

    (ordered, best_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn deal(brand: &str, discount_percent: f64) -> Deal {
        Deal {
            date: NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(),
            brand: brand.to_string(),
            title: "套餐".to_string(),
            original_price: 30.0,
            final_price: 20.0,
            discount_percent,
            main_image_url: None,
            recommendation: None,
        }
    }

    #[test]
    fn empty_input_has_no_best() {
        let (ordered, best) = rank(vec![]);
        assert!(ordered.is_empty());
        assert_eq!(best, None);
    }

    #[test]
    fn best_index_tracks_max_discount_through_reordering() {
        let (ordered, best) = rank(vec![deal("z-brand", 50.0), deal("a-brand", 10.0)]);
        assert_eq!(ordered[0].brand, "a-brand");
        assert_eq!(ordered[1].brand, "z-brand");
        assert_eq!(best, Some(1));
    }

    #[test]
    fn ties_keep_first_seen_input_deal() {
        let (ordered, best) = rank(vec![deal("b", 30.0), deal("a", 30.0)]);
        // Both discounts tie; the first input deal ("b") wins, now at index 1.
        assert_eq!(best, Some(1));
        assert_eq!(ordered[best.unwrap()].brand, "b");
    }

    #[test]
    fn ordering_is_stable_for_equal_brands() {
        let mut first = deal("same", 10.0);
        first.title = "first".to_string();
        let mut second = deal("same", 20.0);
        second.title = "second".to_string();

        let (ordered, best) = rank(vec![first, second]);
        assert_eq!(ordered[0].title, "first");
        assert_eq!(ordered[1].title, "second");
        assert_eq!(best, Some(1));
    }
}
