//! ISO-8601 duration parsing.
//!
//! Phase durations are configured as `P[n]D[T[n]H[n]M[n]S[.f]]`:
//!
//! - `PT10M` - ten minutes
//! - `P1DT2H` - one day and two hours
//! - `PT0.5S` - half a second
//! - `-PT5S` / `PT-5S` - negative durations (signs per component allowed)
//!
//! Parsing is case-insensitive. Fractions of a second take up to nine
//! digits and may use `.` or `,` as separator. Blank input means "not
//! configured" and yields `Ok(None)`.

use chrono::TimeDelta;
use thiserror::Error;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const SECONDS_PER_MINUTE: i128 = 60;
const SECONDS_PER_HOUR: i128 = 3_600;
const SECONDS_PER_DAY: i128 = 86_400;

/// The input is not a valid ISO-8601 duration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid duration '{input}': expected P[n]D[T[n]H[n]M[n]S[.f]]")]
pub struct DurationParseError {
    /// The rejected input.
    pub input: String,
}

/// Parse an ISO-8601 duration string.
///
/// ```
/// use chrono::TimeDelta;
/// use rust_gamelib::core::parse_iso_duration;
///
/// assert_eq!(parse_iso_duration("PT10M").unwrap(), Some(TimeDelta::minutes(10)));
/// assert_eq!(parse_iso_duration("  ").unwrap(), None);
/// assert!(parse_iso_duration("not-a-duration").is_err());
/// ```
pub fn parse_iso_duration(input: &str) -> Result<Option<TimeDelta>, DurationParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let invalid = || DurationParseError {
        input: input.to_string(),
    };

    let upper = text.to_ascii_uppercase();
    let (negate, rest) = match upper.as_bytes()[0] {
        b'-' => (true, &upper[1..]),
        b'+' => (false, &upper[1..]),
        _ => (false, upper.as_str()),
    };
    let rest = rest.strip_prefix('P').ok_or_else(invalid)?;

    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut nanos: i128 = 0;
    let mut found_component = false;

    if !date.is_empty() {
        let days = date.strip_suffix('D').ok_or_else(invalid)?;
        nanos += parse_signed(days).ok_or_else(invalid)? * SECONDS_PER_DAY * NANOS_PER_SECOND;
        found_component = true;
    }

    if let Some(time) = time {
        if time.is_empty() {
            return Err(invalid());
        }

        let mut remaining = time;
        for (unit, seconds) in [('H', SECONDS_PER_HOUR), ('M', SECONDS_PER_MINUTE)] {
            if let Some(index) = remaining.find(unit) {
                let value = parse_signed(&remaining[..index]).ok_or_else(invalid)?;
                nanos += value * seconds * NANOS_PER_SECOND;
                remaining = &remaining[index + 1..];
                found_component = true;
            }
        }

        if !remaining.is_empty() {
            let seconds = remaining.strip_suffix('S').ok_or_else(invalid)?;
            nanos += parse_seconds(seconds).ok_or_else(invalid)?;
            found_component = true;
        }
    }

    if !found_component {
        return Err(invalid());
    }

    if negate {
        nanos = -nanos;
    }

    to_time_delta(nanos).map(Some).ok_or_else(invalid)
}

/// Parse `[+-]digits`.
fn parse_signed(text: &str) -> Option<i128> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i128 = digits.parse::<i64>().ok()?.into();
    Some(if text.starts_with('-') { -value } else { value })
}

/// Parse `[+-]digits[(.|,)fraction]` into nanoseconds.
fn parse_seconds(text: &str) -> Option<i128> {
    let (whole, fraction) = match text.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    let seconds = parse_signed(whole)?;
    let mut nanos = seconds * NANOS_PER_SECOND;

    if let Some(fraction) = fraction {
        if fraction.is_empty()
            || fraction.len() > 9
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let padded = format!("{fraction:0<9}");
        let fraction_nanos: i128 = padded.parse::<i64>().ok()?.into();
        if whole.starts_with('-') {
            nanos -= fraction_nanos;
        } else {
            nanos += fraction_nanos;
        }
    }

    Some(nanos)
}

fn to_time_delta(nanos: i128) -> Option<TimeDelta> {
    let seconds = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok()?;
    let subsec = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND)).ok()?;
    TimeDelta::new(seconds, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(text: &str) -> TimeDelta {
        parse_iso_duration(text).unwrap().unwrap()
    }

    #[test]
    fn test_minutes() {
        assert_eq!(parse("PT10M"), TimeDelta::minutes(10));
        assert_eq!(parse("pt10m"), TimeDelta::minutes(10));
    }

    #[test]
    fn test_full_form() {
        let expected = TimeDelta::days(5)
            + TimeDelta::hours(4)
            + TimeDelta::minutes(3)
            + TimeDelta::milliseconds(2_001);
        assert_eq!(parse("P5DT4H3M2.001S"), expected);
    }

    #[test]
    fn test_days_only() {
        assert_eq!(parse("P2D"), TimeDelta::days(2));
    }

    #[test]
    fn test_fraction_with_comma() {
        assert_eq!(parse("PT0,5S"), TimeDelta::milliseconds(500));
    }

    #[test]
    fn test_negative_durations() {
        assert_eq!(parse("-PT5S"), TimeDelta::seconds(-5));
        assert_eq!(parse("PT-5S"), TimeDelta::seconds(-5));
        assert_eq!(parse("PT-1.5S"), TimeDelta::milliseconds(-1_500));
        assert_eq!(parse("-PT-5S"), TimeDelta::seconds(5));
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(parse_iso_duration("").unwrap(), None);
        assert_eq!(parse_iso_duration("   ").unwrap(), None);
    }

    #[test]
    fn test_rejects_malformed() {
        for input in [
            "not-a-duration",
            "P",
            "PT",
            "P5",
            "P1DT",
            "PT5M3H",
            "PT1.S",
            "PT1.0000000001S",
            "10M",
            "PTXS",
            "P1D2H",
        ] {
            let err = parse_iso_duration(input).unwrap_err();
            assert_eq!(err.input, input, "input {input:?} should be rejected");
        }
    }

    proptest! {
        #[test]
        fn prop_components_add_up(
            days in 0i64..1_000,
            hours in 0i64..48,
            minutes in 0i64..120,
            seconds in 0i64..120,
        ) {
            let text = format!("P{days}DT{hours}H{minutes}M{seconds}S");
            let expected = TimeDelta::days(days)
                + TimeDelta::hours(hours)
                + TimeDelta::minutes(minutes)
                + TimeDelta::seconds(seconds);
            prop_assert_eq!(parse(&text), expected);
        }

        #[test]
        fn prop_never_panics(input in "\\PC{0,24}") {
            let _ = parse_iso_duration(&input);
        }
    }
}
