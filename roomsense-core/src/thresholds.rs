//! Threshold configuration and violation evaluation
//!
//! Thresholds describe the acceptable `[min, max]` band per field. A value
//! is a violation only when it is strictly outside the band: a reading
//! sitting exactly on `temp_min` or `temp_max` is fine.
//!
//! The config is replaced wholesale, never merged field by field, and is
//! deliberately not validated for `min < max` (see DESIGN.md): an inverted
//! range reports every reading as a `Min` violation because the lower bound
//! is checked first.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HUMIDITY_MAX, DEFAULT_HUMIDITY_MIN, DEFAULT_TEMP_MAX, DEFAULT_TEMP_MIN,
};
use crate::reading::Reading;

/// Active alert thresholds for both sensor fields.
///
/// Defaults exist before any reading arrives, so threshold checks are
/// meaningful from process start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Lower temperature bound in °C.
    pub temp_min: f32,
    /// Upper temperature bound in °C.
    pub temp_max: f32,
    /// Lower relative-humidity bound in %.
    pub humidity_min: f32,
    /// Upper relative-humidity bound in %.
    pub humidity_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_min: DEFAULT_TEMP_MIN,
            temp_max: DEFAULT_TEMP_MAX,
            humidity_min: DEFAULT_HUMIDITY_MIN,
            humidity_max: DEFAULT_HUMIDITY_MAX,
        }
    }
}

/// Which bound a value crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    /// Value fell below the configured minimum.
    Min,
    /// Value rose above the configured maximum.
    Max,
}

/// Outcome of checking one field against its band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Whether the value is outside the band.
    pub exceeded: bool,
    /// Crossed bound; absent when `exceeded` is false.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ViolationKind>,
    /// Human-readable description; absent when `exceeded` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Violation {
    fn within_bounds() -> Self {
        Self {
            exceeded: false,
            kind: None,
            message: None,
        }
    }

    fn exceeded(kind: ViolationKind, message: String) -> Self {
        Self {
            exceeded: true,
            kind: Some(kind),
            message: Some(message),
        }
    }
}

/// Per-field violation results for the latest reading.
///
/// Both fields are `None` until the first reading arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThresholdReport {
    /// Temperature result, `None` when no reading exists yet.
    pub temperature: Option<Violation>,
    /// Humidity result, `None` when no reading exists yet.
    pub humidity: Option<Violation>,
}

impl Thresholds {
    /// Check a reading against the configured bands.
    ///
    /// Both checks see the same config; the caller takes care that reading
    /// and config come from one consistent state view.
    pub fn evaluate(&self, reading: &Reading) -> ThresholdReport {
        ThresholdReport {
            temperature: Some(check_band(
                reading.temperature,
                self.temp_min,
                self.temp_max,
                "Temperature",
                "°C",
            )),
            humidity: Some(check_band(
                reading.humidity,
                self.humidity_min,
                self.humidity_max,
                "Humidity",
                "%",
            )),
        }
    }
}

// Open-interval test: boundary values are not violations
fn check_band(value: f32, min: f32, max: f32, label: &str, unit: &str) -> Violation {
    if value < min {
        Violation::exceeded(
            ViolationKind::Min,
            format!("{label} {value}{unit} below minimum of {min}{unit}"),
        )
    } else if value > max {
        Violation::exceeded(
            ViolationKind::Max,
            format!("{label} {value}{unit} above maximum of {max}{unit}"),
        )
    } else {
        Violation::within_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f32, humidity: f32) -> Reading {
        Reading::now(temperature, humidity)
    }

    #[test]
    fn defaults_match_documented_values() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.temp_min, 18.0);
        assert_eq!(thresholds.temp_max, 26.0);
        assert_eq!(thresholds.humidity_min, 30.0);
        assert_eq!(thresholds.humidity_max, 70.0);
    }

    #[test]
    fn value_within_band() {
        let report = Thresholds::default().evaluate(&reading(22.0, 50.0));

        let temperature = report.temperature.unwrap();
        assert!(!temperature.exceeded);
        assert!(temperature.kind.is_none());
        assert!(temperature.message.is_none());
        assert!(!report.humidity.unwrap().exceeded);
    }

    #[test]
    fn boundary_value_is_not_a_violation() {
        let thresholds = Thresholds::default();

        let at_min = thresholds.evaluate(&reading(18.0, 50.0));
        assert!(!at_min.temperature.unwrap().exceeded);

        let at_max = thresholds.evaluate(&reading(26.0, 50.0));
        assert!(!at_max.temperature.unwrap().exceeded);
    }

    #[test]
    fn just_outside_band_is_a_violation() {
        let thresholds = Thresholds::default();

        let below = thresholds.evaluate(&reading(17.99, 50.0)).temperature.unwrap();
        assert!(below.exceeded);
        assert_eq!(below.kind, Some(ViolationKind::Min));

        let above = thresholds.evaluate(&reading(26.01, 50.0)).temperature.unwrap();
        assert!(above.exceeded);
        assert_eq!(above.kind, Some(ViolationKind::Max));
    }

    #[test]
    fn humidity_checked_independently() {
        let report = Thresholds::default().evaluate(&reading(22.0, 75.0));

        assert!(!report.temperature.unwrap().exceeded);
        let humidity = report.humidity.unwrap();
        assert!(humidity.exceeded);
        assert_eq!(humidity.kind, Some(ViolationKind::Max));
        assert!(humidity.message.unwrap().contains("above maximum"));
    }

    #[test]
    fn inverted_range_reports_min_first() {
        // set_thresholds performs no min < max validation; with an inverted
        // band the lower-bound check wins for every value
        let thresholds = Thresholds {
            temp_min: 30.0,
            temp_max: 10.0,
            ..Thresholds::default()
        };

        let result = thresholds.evaluate(&reading(20.0, 50.0)).temperature.unwrap();
        assert!(result.exceeded);
        assert_eq!(result.kind, Some(ViolationKind::Min));
    }

    #[test]
    fn report_serializes_like_the_query_surface_expects() {
        let json =
            serde_json::to_value(Thresholds::default().evaluate(&reading(17.0, 50.0))).unwrap();

        assert_eq!(json["temperature"]["exceeded"], true);
        assert_eq!(json["temperature"]["type"], "min");
        assert!(json["temperature"]["message"].is_string());
        // Non-violations omit kind and message entirely
        assert_eq!(json["humidity"]["exceeded"], false);
        assert!(json["humidity"].get("type").is_none());
    }
}
