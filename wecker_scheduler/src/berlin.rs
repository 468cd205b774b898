use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDateError {
    #[error("expected DD.MM.YY HH:MM")]
    Pattern,
    #[error("no such date on the calendar")]
    OutOfRange,
}

/// Parses `DD.MM.YY HH:MM` read as Berlin wall-clock time into a UTC instant.
/// Two-digit years always mean 20xx.
pub fn parse_berlin_date(when: &str) -> Result<DateTime<Utc>, ParseDateError> {
    let mut parts = when.split_whitespace();
    let (Some(date), Some(time), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseDateError::Pattern);
    };

    let mut date = date.split('.');
    let (Some(day), Some(month), Some(year), None) =
        (date.next(), date.next(), date.next(), date.next())
    else {
        return Err(ParseDateError::Pattern);
    };

    let mut time = time.split(':');
    let (Some(hour), Some(minute), None) = (time.next(), time.next(), time.next()) else {
        return Err(ParseDateError::Pattern);
    };

    resolve(
        component(day, 1, 2)?,
        component(month, 1, 2)?,
        component(year, 2, 2)?,
        component(hour, 1, 2)?,
        component(minute, 2, 2)?,
    )
}

pub fn resolve(
    day: u32,
    month: u32,
    two_digit_year: u32,
    hour: u32,
    minute: u32,
) -> Result<DateTime<Utc>, ParseDateError> {
    let year = 2000 + i32::try_from(two_digit_year).map_err(|_| ParseDateError::OutOfRange)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseDateError::OutOfRange)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ParseDateError::OutOfRange)?;

    resolve_berlin(NaiveDateTime::new(date, time))
}

// The offset must be the one in effect on that date, never a fixed +1h.
// Readings inside the autumn fold occur twice on the wall clock: we take the
// first occurrence. Readings inside the spring gap never occur: we take the
// instant the clock actually shows one hour later.
fn resolve_berlin(naive: NaiveDateTime) -> Result<DateTime<Utc>, ParseDateError> {
    match Berlin.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Berlin
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or(ParseDateError::OutOfRange),
    }
}

/// Renders an instant back into Berlin wall-clock form for confirmations.
pub fn format_berlin(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Berlin)
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

fn component(raw: &str, min_len: usize, max_len: usize) -> Result<u32, ParseDateError> {
    if raw.len() < min_len || raw.len() > max_len || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseDateError::Pattern);
    }

    raw.parse().map_err(|_| ParseDateError::Pattern)
}
