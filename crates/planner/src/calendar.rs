//! Calendar-day arithmetic for campaign windows.

use chrono::{Duration, NaiveDate};

/// Number of calendar days in `[start, end]`, counting both ends.
///
/// Zero or negative when `end` precedes `start`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// `date` shifted by a signed number of days, or `None` past the calendar's range.
pub fn offset(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// `count` consecutive dates beginning at `first`.
pub fn day_range(first: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inclusive_days() {
        assert_eq!(inclusive_days(date(2024, 3, 1), date(2024, 3, 1)), 1);
        assert_eq!(inclusive_days(date(2024, 3, 1), date(2024, 3, 3)), 3);
        // Leap day is counted.
        assert_eq!(inclusive_days(date(2024, 2, 27), date(2024, 3, 1)), 4);
        assert_eq!(inclusive_days(date(2024, 3, 5), date(2024, 3, 1)), -3);
    }

    #[test]
    fn test_offset_crosses_month_and_year() {
        assert_eq!(offset(date(2024, 1, 2), -4), Some(date(2023, 12, 29)));
        assert_eq!(offset(date(2024, 12, 30), 7), Some(date(2025, 1, 6)));
        assert_eq!(offset(date(2024, 6, 15), 0), Some(date(2024, 6, 15)));
        assert_eq!(offset(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn test_day_range() {
        let days: Vec<NaiveDate> = day_range(date(2024, 2, 28), 3).collect();
        assert_eq!(days, vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]);
        assert_eq!(day_range(date(2024, 2, 28), 0).count(), 0);
    }
}
