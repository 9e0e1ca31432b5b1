// Next session date
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// The day after `last_session`, moved past the weekend. Holidays are not known here.
pub fn next_trading_day(last_session: NaiveDate) -> NaiveDate {
    let next = last_session + Duration::days(1);
    match next.weekday() {
        Weekday::Sat => next + Duration::days(2),
        Weekday::Sun => next + Duration::days(1),
        _ => next,
    }
}
