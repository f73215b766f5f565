//! Day-offset computation against an explicit reference date.
//!
//! The reference date is always a parameter, never the wall clock, so runs
//! are reproducible and tests do not depend on when they execute.

use chrono::NaiveDate;

/// Difference in days between the reference date and a `YYYY-MM-DD` date
/// string. Positive for past dates, negative for future ones, `None` when the
/// string does not parse.
pub fn calc_timediff(reference: NaiveDate, raw: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    Some((reference - date).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
    }

    #[test]
    fn invalid_formats_yield_none() {
        assert_eq!(calc_timediff(reference(), "2020 A"), None);
        assert_eq!(calc_timediff(reference(), ""), None);
        assert_eq!(calc_timediff(reference(), "01.02.2020"), None);
    }

    #[test]
    fn past_dates_are_positive() {
        assert!(calc_timediff(reference(), "2020-01-01").unwrap() > 1);
    }

    #[test]
    fn future_dates_are_negative() {
        assert!(calc_timediff(reference(), "2030-01-01").unwrap() < 1);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(calc_timediff(reference(), " 2021-05-31 "), Some(1));
    }
}
