use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, TimeZone, Utc};
use std::time::Duration;

pub const FALLBACK_HOUR: u32 = 8;
pub const FALLBACK_MINUTE: u32 = 0;

const CST_OFFSET_SECS: i32 = 8 * 3600;

/// Parse an "HH:MM" schedule string. Malformed or out-of-range input falls
/// back to 08:00; the bad value is reported, never fatal.
pub fn parse_schedule_time(schedule_time: &str) -> (u32, u32) {
    match try_parse(schedule_time) {
        Some(parsed) => parsed,
        None => {
            tracing::error!(
                schedule_time,
                "invalid schedule_time, falling back to {FALLBACK_HOUR:02}:{FALLBACK_MINUTE:02}"
            );
            (FALLBACK_HOUR, FALLBACK_MINUTE)
        }
    }
}

fn try_parse(schedule_time: &str) -> Option<(u32, u32)> {
    let (hour, minute) = schedule_time.trim().split_once(':')?;
    let hour = hour.parse::<u32>().ok()?;
    let minute = minute.parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Time until the next `hour:minute` firing in the schedule's UTC+8 clock.
pub fn next_run_delay(now_utc: DateTime<Utc>, hour: u32, minute: u32) -> Duration {
    let hour = hour.min(23);
    let minute = minute.min(59);

    let Some(cst) = FixedOffset::east_opt(CST_OFFSET_SECS) else {
        return Duration::from_secs(60);
    };
    let now = now_utc.with_timezone(&cst);

    let today_target = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .and_then(|naive| cst.from_local_datetime(&naive).single());
    let Some(today_target) = today_target else {
        return Duration::from_secs(60);
    };

    let target = if today_target > now {
        today_target
    } else {
        today_target + ChronoDuration::days(1)
    };

    (target - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_schedule_time("08:00"), (8, 0));
        assert_eq!(parse_schedule_time(" 23:59 "), (23, 59));
    }

    #[test]
    fn malformed_input_falls_back() {
        assert_eq!(parse_schedule_time("8am"), (8, 0));
        assert_eq!(parse_schedule_time("25:00"), (8, 0));
        assert_eq!(parse_schedule_time("12:60"), (8, 0));
        assert_eq!(parse_schedule_time(""), (8, 0));
        assert_eq!(parse_schedule_time("1:2:3"), (8, 0));
    }

    #[test]
    fn delay_targets_same_day_when_still_ahead() {
        // 2026-08-27 23:00 UTC = 2026-08-28 07:00 CST; 08:00 CST is an hour out.
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 23, 0, 0).unwrap();
        assert_eq!(next_run_delay(now, 8, 0), Duration::from_secs(3600));
    }

    #[test]
    fn delay_rolls_to_tomorrow_when_passed() {
        // 2026-08-28 01:00 UTC = 09:00 CST; next 08:00 CST is 23h away.
        let now = Utc.with_ymd_and_hms(2026, 8, 28, 1, 0, 0).unwrap();
        assert_eq!(next_run_delay(now, 8, 0), Duration::from_secs(23 * 3600));
    }
}
