use chrono::{Datelike, Duration, NaiveDate};

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Shifts by whole months, clamping the day to the length of the target month.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

/// Shifts by whole years; 29 February clamps to 28 February.
pub fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    shift_months(date, years * 12)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

pub fn is_end_of_month(date: NaiveDate) -> bool {
    date == end_of_month(date)
}

/// Calendar-year distance from `from` to `to`.
pub fn year_delta(from: NaiveDate, to: NaiveDate) -> i32 {
    to.year() - from.year()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first| (first - Duration::days(1)).day())
        .unwrap_or(28)
}
