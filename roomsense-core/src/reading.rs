//! Sensor readings and the raw-payload parser
//!
//! The sensor process publishes plain-text payloads of the form
//! `"<temperature>,<humidity>"` (two decimal places recommended, not
//! enforced). Parsing is pure: no unit conversion, no rounding, no range
//! checks. Range semantics belong to the threshold evaluation downstream.
//!
//! The payload carries no timestamp. One is assigned from the wall clock at
//! the moment a payload parses successfully, at second granularity.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};

use crate::constants::TIMESTAMP_FORMAT;
use crate::errors::ParseError;

/// One immutable temperature + humidity + timestamp sample.
///
/// Produced by [`crate::state::SensorState::update`] from a parsed payload,
/// retained in the history ring until evicted and in the durable log
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Temperature in °C, as published by the sensor.
    pub temperature: f32,
    /// Relative humidity in %, as published by the sensor.
    pub humidity: f32,
    /// Civil wall-clock time the reading was accepted, second granularity.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

impl Reading {
    /// Build a reading stamped with the current wall-clock time.
    pub fn now(temperature: f32, humidity: f32) -> Self {
        let now = Local::now().naive_local();
        Self {
            temperature,
            humidity,
            // Log rows and snapshots carry second granularity
            timestamp: now.with_nanosecond(0).unwrap_or(now),
        }
    }

    /// Timestamp in the fixed `YYYY-MM-DD HH:MM:SS` format.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Parse a raw `"<temperature>,<humidity>"` payload.
///
/// The payload is trimmed of surrounding whitespace and split on a single
/// comma. It must yield exactly two fields, both finite floats.
///
/// ```
/// use roomsense_core::{parse_payload, ParseError};
///
/// assert_eq!(parse_payload("23.50,45.20"), Ok((23.5, 45.2)));
/// assert_eq!(
///     parse_payload("1,2,3"),
///     Err(ParseError::WrongFieldCount { found: 3 })
/// );
/// ```
pub fn parse_payload(payload: &str) -> Result<(f32, f32), ParseError> {
    let fields: Vec<&str> = payload.trim().split(',').collect();
    if fields.len() != 2 {
        return Err(ParseError::WrongFieldCount {
            found: fields.len(),
        });
    }

    let temperature = parse_field(fields[0])?;
    let humidity = parse_field(fields[1])?;
    Ok((temperature, humidity))
}

fn parse_field(field: &str) -> Result<f32, ParseError> {
    let value: f32 = field
        .trim()
        .parse()
        .map_err(|_| ParseError::NonNumericField)?;

    // "NaN" and "inf" parse as floats but make no sense as sensor values
    if !value.is_finite() {
        return Err(ParseError::NonNumericField);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_payload() {
        assert_eq!(parse_payload("23.50,45.20"), Ok((23.5, 45.2)));
        assert_eq!(parse_payload("-5.00,99.90"), Ok((-5.0, 99.9)));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(parse_payload("  23.50,45.20\n"), Ok((23.5, 45.2)));
        assert_eq!(parse_payload("23.50, 45.20"), Ok((23.5, 45.2)));
    }

    #[test]
    fn wrong_field_count() {
        assert_eq!(
            parse_payload("abc"),
            Err(ParseError::WrongFieldCount { found: 1 })
        );
        assert_eq!(
            parse_payload("1"),
            Err(ParseError::WrongFieldCount { found: 1 })
        );
        assert_eq!(
            parse_payload("1,2,3"),
            Err(ParseError::WrongFieldCount { found: 3 })
        );
        assert_eq!(
            parse_payload(""),
            Err(ParseError::WrongFieldCount { found: 1 })
        );
    }

    #[test]
    fn non_numeric_field() {
        assert_eq!(parse_payload("abc,45.2"), Err(ParseError::NonNumericField));
        assert_eq!(parse_payload("23.5,"), Err(ParseError::NonNumericField));
        assert_eq!(
            parse_payload("NaN,45.2"),
            Err(ParseError::NonNumericField)
        );
        assert_eq!(
            parse_payload("inf,45.2"),
            Err(ParseError::NonNumericField)
        );
    }

    #[test]
    fn reading_timestamp_has_second_granularity() {
        let reading = Reading::now(21.0, 50.0);
        assert_eq!(reading.timestamp.nanosecond(), 0);
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(reading.timestamp_string().len(), 19);
    }

    #[test]
    fn reading_serializes_timestamp_as_fixed_format() {
        let reading = Reading::now(21.0, 50.0);
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(
            json["timestamp"].as_str().unwrap(),
            reading.timestamp_string()
        );
    }

    proptest! {
        #[test]
        fn parser_never_panics(payload in ".*") {
            let _ = parse_payload(&payload);
        }

        #[test]
        fn finite_pairs_parse(t in -1000.0f32..1000.0, h in 0.0f32..100.0) {
            let payload = format!("{t},{h}");
            let (pt, ph) = parse_payload(&payload).unwrap();
            prop_assert_eq!(pt, t);
            prop_assert_eq!(ph, h);
        }
    }
}
