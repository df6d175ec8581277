//! Formatting dates.

use std::fmt;
use chrono::{DateTime, Local, Utc};
use chrono::format::{Item, Fixed, Numeric, Pad};


//------------ Constructing ISO Dates ----------------------------------------

/// Formats a UTC date as an ISO 8601 timestamp with milliseconds.
///
/// The output looks like `2026-10-19T08:15:30.123Z`. This is the format
/// used in journal entries and the `timestamp` members of JSON responses.
pub fn format_iso_date(date: DateTime<Utc>) -> impl fmt::Display {
    const UTC_ISO_DATE: &[Item<'static>] = &[
        Item::Numeric(Numeric::Year, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Month, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Day, Pad::Zero),
        Item::Literal("T"),
        Item::Numeric(Numeric::Hour, Pad::Zero),
        Item::Literal(":"),
        Item::Numeric(Numeric::Minute, Pad::Zero),
        Item::Literal(":"),
        Item::Numeric(Numeric::Second, Pad::Zero),
        Item::Fixed(Fixed::Nanosecond3),
        Item::Literal("Z"),
    ];

    date.format_with_items(UTC_ISO_DATE.iter())
}

/// Returns the current time as an ISO 8601 string.
pub fn now_iso() -> String {
    format_iso_date(Utc::now()).to_string()
}

pub fn format_local_iso_date(date: DateTime<Local>) -> impl fmt::Display {
    const LOCAL_ISO_DATE: &[Item<'static>] = &[
        Item::Numeric(Numeric::Year, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Month, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Day, Pad::Zero),
        Item::Literal("T"),
        Item::Numeric(Numeric::Hour, Pad::Zero),
        Item::Literal(":"),
        Item::Numeric(Numeric::Minute, Pad::Zero),
        Item::Literal(":"),
        Item::Numeric(Numeric::Second, Pad::Zero),
    ];

    date.format_with_items(LOCAL_ISO_DATE.iter())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso_date_with_millis() {
        let date = Utc.from_utc_datetime(
            &chrono::naive::NaiveDate::from_ymd_opt(
                1994, 11, 6
            ).unwrap().and_hms_milli_opt(8, 49, 37, 42).unwrap()
        );
        assert_eq!(
            format_iso_date(date).to_string(),
            "1994-11-06T08:49:37.042Z"
        );

        let date = Utc.from_utc_datetime(
            &chrono::naive::NaiveDate::from_ymd_opt(
                2026, 1, 2
            ).unwrap().and_hms_opt(3, 4, 5).unwrap()
        );
        assert_eq!(
            format_iso_date(date).to_string(),
            "2026-01-02T03:04:05.000Z"
        );
    }
}
