//! Business-day and update-cutoff helpers.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Most recent business day strictly before `date`, skipping weekends.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date.pred_opt().unwrap_or(date);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day = day.pred_opt().unwrap_or(day);
    }
    day
}

/// Upper bound on the sample times an update run will persist.
///
/// On a weekend, or on a weekday before `cutoff_hour` local time, the most
/// recent complete session is the previous business day; the cutoff is the
/// end of that day. Otherwise today's session counts and the cutoff is the
/// end of today. End of day is 23:59:00 so intraday samples through the
/// close are included.
pub fn update_cutoff(now: NaiveDateTime, cutoff_hour: u32) -> NaiveDateTime {
    let today = now.date();
    let is_weekend = matches!(today.weekday(), Weekday::Sat | Weekday::Sun);

    let cutoff_date = if is_weekend || now.hour() < cutoff_hour {
        previous_business_day(today)
    } else {
        today
    };

    cutoff_date.and_hms_opt(23, 59, 0).unwrap_or(now)
}
