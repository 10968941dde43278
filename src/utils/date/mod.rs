// Date utility functions
// Week arithmetic for the visible grid columns

use chrono::{Datelike, Days, NaiveDate};

/// First day of the week containing `date`. `first_day_of_week` counts
/// from Sunday (0 = Sunday, 1 = Monday).
pub fn week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday() as u64;
    let offset = (weekday + 7 - (first_day_of_week as u64 % 7)) % 7;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// The `days` consecutive dates shown for the week containing `date`.
pub fn visible_dates(date: NaiveDate, first_day_of_week: u8, days: u32) -> Vec<NaiveDate> {
    week_start(date, first_day_of_week)
        .iter_days()
        .take(days as usize)
        .collect()
}

/// Same weekday `weeks` weeks away (negative goes back).
pub fn shift_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    let days = Days::new(weeks.unsigned_abs() * 7);
    let shifted = if weeks >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    shifted.unwrap_or(date)
}
