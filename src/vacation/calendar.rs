use chrono::{Datelike, NaiveDate, Weekday};

/// Counts the weekdays between `start` and `end`, both inclusive.
///
/// Saturdays and Sundays are skipped; there is no holiday calendar. An inverted
/// range yields zero.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> i32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_business_day(*day))
        .count() as i32
}

pub fn is_business_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}
