use time::{macros::format_description, Date};

use crate::error::{AppError, AppResult};

/// Parse a strict `YYYY-MM-DD` calendar day. Impossible dates and trailing
/// garbage are rejected.
pub fn parse_day(s: &str) -> AppResult<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation(format!("invalid date: {s}")))
}

/// Canonical `YYYY-MM-DD` rendering, the key format of the availability
/// map.
pub fn format_day(day: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}

/// All days from `start` to `end` inclusive. The range is symmetric:
/// reversed endpoints are swapped, not rejected.
pub fn expand_range(start: Date, end: Date) -> Vec<Date> {
    let (mut cur, last) = if start <= end { (start, end) } else { (end, start) };
    let mut days = Vec::new();
    while cur <= last {
        days.push(cur);
        match cur.next_day() {
            Some(next) => cur = next,
            None => break,
        }
    }
    days
}

/// Sort and deduplicate into the distinct day set fed to the conflict
/// checker.
pub fn normalize(mut days: Vec<Date>) -> Vec<Date> {
    days.sort_unstable();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_valid_days() {
        assert_eq!(parse_day("2025-11-20").unwrap(), date!(2025 - 11 - 20));
        assert_eq!(parse_day("2024-02-29").unwrap(), date!(2024 - 02 - 29));
    }

    #[test]
    fn rejects_malformed_days() {
        assert!(parse_day("2025-13-01").is_err());
        assert!(parse_day("2025-02-30").is_err());
        assert!(parse_day("2025-1-1").is_err());
        assert!(parse_day("2025-11-20T00:00:00Z").is_err());
        assert!(parse_day("tomorrow").is_err());
        assert!(parse_day("").is_err());
    }

    #[test]
    fn format_is_zero_padded() {
        assert_eq!(format_day(date!(2025 - 01 - 05)), "2025-01-05");
        assert_eq!(format_day(date!(2025 - 12 - 25)), "2025-12-25");
    }

    #[test]
    fn parse_format_roundtrip() {
        let day = parse_day("2025-11-20").unwrap();
        assert_eq!(format_day(day), "2025-11-20");
    }

    #[test]
    fn range_is_inclusive() {
        let days = expand_range(date!(2025 - 11 - 20), date!(2025 - 11 - 22));
        assert_eq!(
            days,
            vec![
                date!(2025 - 11 - 20),
                date!(2025 - 11 - 21),
                date!(2025 - 11 - 22)
            ]
        );
    }

    #[test]
    fn reversed_range_is_swapped() {
        let forward = expand_range(date!(2025 - 11 - 20), date!(2025 - 11 - 22));
        let backward = expand_range(date!(2025 - 11 - 22), date!(2025 - 11 - 20));
        assert_eq!(forward, backward);
    }

    #[test]
    fn single_day_range() {
        assert_eq!(
            expand_range(date!(2025 - 07 - 04), date!(2025 - 07 - 04)),
            vec![date!(2025 - 07 - 04)]
        );
    }

    #[test]
    fn range_crosses_month_boundary() {
        let days = expand_range(date!(2025 - 01 - 30), date!(2025 - 02 - 02));
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], date!(2025 - 02 - 01));
    }

    #[test]
    fn normalize_sorts_and_dedups() {
        let days = normalize(vec![
            date!(2025 - 12 - 26),
            date!(2025 - 12 - 24),
            date!(2025 - 12 - 26),
            date!(2025 - 12 - 25),
        ]);
        assert_eq!(
            days,
            vec![
                date!(2025 - 12 - 24),
                date!(2025 - 12 - 25),
                date!(2025 - 12 - 26)
            ]
        );
    }
}
