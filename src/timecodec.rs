//! Timestamp parsing and minute-of-day conversion.
//!
//! Trip sources export timestamps like `3/20/2024 8:18:13 AM` with no
//! guarantee of zero padding. Parsing never fails the caller: a string that
//! defeats both the standard and the manual parse degrades to the current
//! wall-clock instant with a warning.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::diag::{self, Diagnostic};

/// Minutes in a day; minute-of-day values live in `[0, 1440)`.
pub const MINUTES_PER_DAY: i64 = 1440;

const STANDARD_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Parses a `M/D/YYYY H:MM:SS AM|PM` timestamp.
///
/// Tries the standard chrono format first, then a manual field-by-field
/// parse. If both fail (or the input is empty), returns the current
/// wall-clock instant and emits a [`Diagnostic::MalformedTimestamp`].
pub fn parse(text: &str) -> NaiveDateTime {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        diag::emit(&Diagnostic::MalformedTimestamp(text.to_string()));
        return Local::now().naive_local();
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, STANDARD_FORMAT) {
        return dt;
    }

    match parse_manual(trimmed) {
        Some(dt) => dt,
        None => {
            diag::emit(&Diagnostic::MalformedTimestamp(text.to_string()));
            Local::now().naive_local()
        }
    }
}

/// Field-by-field fallback for timestamps the strict format rejects,
/// e.g. extra internal whitespace or a lowercase meridiem.
fn parse_manual(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    let meridiem = parts.next()?;

    let mut date_fields = date_part.split('/');
    let month: u32 = date_fields.next()?.parse().ok()?;
    let day: u32 = date_fields.next()?.parse().ok()?;
    let year: i32 = date_fields.next()?.parse().ok()?;

    let mut time_fields = time_part.split(':');
    let mut hour: u32 = time_fields.next()?.parse().ok()?;
    let minute: u32 = time_fields.next()?.parse().ok()?;
    let second: u32 = time_fields.next().unwrap_or("0").parse().ok()?;

    // 12-hour to 24-hour: PM adds 12 except for 12 PM; 12 AM is hour 0.
    match meridiem.to_ascii_uppercase().as_str() {
        "PM" if hour < 12 => hour += 12,
        "AM" if hour == 12 => hour = 0,
        "AM" | "PM" => {}
        _ => return None,
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Converts an instant to minutes since midnight (`hour * 60 + minute`).
///
/// An absent instant yields 0 with an [`Diagnostic::InvalidInstant`] warning.
pub fn minutes_since_midnight(instant: Option<NaiveDateTime>) -> u32 {
    match instant {
        Some(dt) => dt.hour() * 60 + dt.minute(),
        None => {
            diag::emit(&Diagnostic::InvalidInstant);
            0
        }
    }
}

/// Renders a minute-of-day value as a short clock string, e.g. `8:18 AM`.
///
/// Values outside `[0, 1440)` roll over with standard time arithmetic, so
/// `-10` renders as `11:50 PM`.
pub fn format_minutes(minutes: i64) -> String {
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    let hour = (m / 60) as u32;
    let minute = (m % 60) as u32;

    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };

    format!("{}:{:02} {}", hour12, minute, meridiem)
}
