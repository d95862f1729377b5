pub mod schedule;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

const CST_OFFSET_SECS: i32 = 8 * 3600;

/// Run date in fixed UTC+8 (the schedule's timezone). Fixed offset rather
/// than a tz database lookup; CST has no daylight saving.
pub fn local_today(now_utc: DateTime<Utc>) -> NaiveDate {
    match chrono::FixedOffset::east_opt(CST_OFFSET_SECS) {
        Some(cst) => now_utc.with_timezone(&cst).date_naive(),
        None => now_utc.date_naive(),
    }
}

pub fn resolve_run_date(
    date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = date_arg {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{s}', expected YYYY-MM-DD"));
    }
    Ok(local_today(now_utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_today_is_utc_plus_eight() {
        // 2026-08-27 17:00 UTC = 2026-08-28 01:00 CST.
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 17, 0, 0).unwrap();
        assert_eq!(local_today(now), NaiveDate::from_ymd_opt(2026, 8, 28).unwrap());

        let earlier = Utc.with_ymd_and_hms(2026, 8, 27, 8, 0, 0).unwrap();
        assert_eq!(local_today(earlier), NaiveDate::from_ymd_opt(2026, 8, 27).unwrap());
    }

    #[test]
    fn explicit_date_arg_wins() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 8, 0, 0).unwrap();
        let d = resolve_run_date(Some("2026-01-02"), now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert!(resolve_run_date(Some("bad"), now).is_err());
    }
}
