//! Sensor domain model
//!
//! [`SensorInfo`] can only be obtained through a validating constructor, so
//! holding one means every field is within range. It is immutable; each
//! successful `get_info` produces a fresh value and comparisons between
//! snapshots are field-wise.
//!
//! # Examples
//!
//! ```rust
//! use sensorpc_core::{SensorInfo, ValidationErrorKind};
//! use serde_json::json;
//!
//! let info = SensorInfo::parse(&json!({
//!     "name": "Sensor",
//!     "hid": "a1b2",
//!     "model": "TS-1",
//!     "firmware_version": 10,
//!     "reading_interval": 3,
//! }))
//! .unwrap();
//! assert_eq!(info.firmware_version().get(), 10);
//!
//! let err = SensorInfo::parse(&json!({
//!     "name": "Sensor",
//!     "hid": "a1b2",
//!     "model": "TS-1",
//!     "firmware_version": 16,
//!     "reading_interval": 3,
//! }))
//! .unwrap_err();
//! assert_eq!(err.field, "firmware_version");
//! assert_eq!(err.kind, ValidationErrorKind::RangeViolation);
//! ```

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Missing, or not of the expected JSON type
    TypeMismatch,
    /// Right type, out of the allowed range (includes empty strings)
    RangeViolation,
}

/// A sensor field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} on field '{field}': {detail}")]
pub struct ValidationError {
    /// What kind of violation
    pub kind: ValidationErrorKind,
    /// Wire name of the offending field
    pub field: &'static str,
    /// Human readable explanation
    pub detail: String,
}

impl ValidationError {
    fn type_mismatch(field: &'static str, expected: &str, found: Option<&Value>) -> Self {
        let found = match found {
            None => "nothing".to_string(),
            Some(value) => value.to_string(),
        };
        Self {
            kind: ValidationErrorKind::TypeMismatch,
            field,
            detail: format!("expected {}, found {}", expected, found),
        }
    }

    fn range_violation(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::RangeViolation,
            field,
            detail: detail.into(),
        }
    }
}

/// A firmware version within the range the device ships
///
/// Updates walk the chain `10 → 11 → … → 15` one step at a time and stop
/// at [`FirmwareVersion::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion(u8);

impl FirmwareVersion {
    /// Oldest firmware the device can report
    pub const MIN: FirmwareVersion = FirmwareVersion(10);
    /// Latest firmware; updates stop here
    pub const MAX: FirmwareVersion = FirmwareVersion(15);

    /// Validate a raw version number
    pub fn new(version: i64) -> Result<Self, ValidationError> {
        if version < i64::from(Self::MIN.0) || version > i64::from(Self::MAX.0) {
            return Err(ValidationError::range_violation(
                "firmware_version",
                format!(
                    "{} is outside [{}, {}]",
                    version,
                    Self::MIN.0,
                    Self::MAX.0
                ),
            ));
        }
        Ok(Self(version as u8))
    }

    /// The raw version number
    pub fn get(self) -> u8 {
        self.0
    }

    /// The version one update later, `None` at the latest version
    pub fn next(self) -> Option<Self> {
        if self.is_latest() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    /// True at [`FirmwareVersion::MAX`]
    pub fn is_latest(self) -> bool {
        self == Self::MAX
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FirmwareVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

/// Validated description of the sensor, as returned by `get_info`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SensorInfo {
    name: String,
    hid: String,
    model: String,
    firmware_version: FirmwareVersion,
    reading_interval: u64,
}

impl SensorInfo {
    /// Build a sensor description from already-typed values
    pub fn new(
        name: impl Into<String>,
        hid: impl Into<String>,
        model: impl Into<String>,
        firmware_version: i64,
        reading_interval: u64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_empty("name", name.into())?,
            hid: non_empty("hid", hid.into())?,
            model: non_empty("model", model.into())?,
            firmware_version: FirmwareVersion::new(firmware_version)?,
            reading_interval: reading_interval_in_range(reading_interval)?,
        })
    }

    /// Validate a raw `get_info` result
    ///
    /// Fields are checked in the order `name`, `hid`, `model`,
    /// `firmware_version`, `reading_interval` and the first violation is
    /// returned. Extra keys are ignored.
    pub fn parse(raw: &Value) -> Result<Self, ValidationError> {
        let name = string_field(raw, "name")?;
        let hid = string_field(raw, "hid")?;
        let model = string_field(raw, "model")?;
        let firmware_version = FirmwareVersion::new(integer_field(raw, "firmware_version")?)?;
        let reading_interval = reading_interval_field(raw)?;

        Ok(Self {
            name,
            hid,
            model,
            firmware_version,
            reading_interval,
        })
    }

    /// Sensor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hardware id
    pub fn hid(&self) -> &str {
        &self.hid
    }

    /// Model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Installed firmware
    pub fn firmware_version(&self) -> FirmwareVersion {
        self.firmware_version
    }

    /// Seconds between readings
    pub fn reading_interval(&self) -> u64 {
        self.reading_interval
    }
}

impl TryFrom<&Value> for SensorInfo {
    type Error = ValidationError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

fn string_field(raw: &Value, field: &'static str) -> Result<String, ValidationError> {
    match raw.get(field) {
        Some(Value::String(s)) => non_empty(field, s.clone()),
        other => Err(ValidationError::type_mismatch(field, "a string", other)),
    }
}

fn integer_field(raw: &Value, field: &'static str) -> Result<i64, ValidationError> {
    let value = raw.get(field);
    match value {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
            // u64 values past i64::MAX are still integers, just out of range
            Ok(n.as_i64().unwrap_or(i64::MAX))
        }
        other => Err(ValidationError::type_mismatch(field, "an integer", other)),
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::range_violation(field, "must not be empty"));
    }
    Ok(value)
}

/// Any integer the wire can carry, as long as it is at least 1
fn reading_interval_field(raw: &Value) -> Result<u64, ValidationError> {
    match raw.get("reading_interval") {
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => match n.as_u64() {
            Some(interval) => reading_interval_in_range(interval),
            None => Err(ValidationError::range_violation(
                "reading_interval",
                format!("{} is not a positive number of seconds", n),
            )),
        },
        other => Err(ValidationError::type_mismatch("reading_interval", "an integer", other)),
    }
}

fn reading_interval_in_range(interval: u64) -> Result<u64, ValidationError> {
    if interval < 1 {
        return Err(ValidationError::range_violation(
            "reading_interval",
            format!("{} is not a positive number of seconds", interval),
        ));
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_raw() -> Value {
        json!({
            "name": "Sensor",
            "hid": "0a1b2c",
            "model": "T-1000",
            "firmware_version": 12,
            "reading_interval": 4,
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut raw = valid_raw();
        raw[field] = value;
        raw
    }

    fn without(field: &str) -> Value {
        let mut raw = valid_raw();
        raw.as_object_mut().unwrap().remove(field);
        raw
    }

    #[test]
    fn test_parse_keeps_field_values() {
        let info = SensorInfo::parse(&valid_raw()).unwrap();

        assert_eq!(info.name(), "Sensor");
        assert_eq!(info.hid(), "0a1b2c");
        assert_eq!(info.model(), "T-1000");
        assert_eq!(info.firmware_version().get(), 12);
        assert_eq!(info.reading_interval(), 4);
        assert_eq!(serde_json::to_value(&info).unwrap(), valid_raw());
    }

    #[test]
    fn test_parse_accepts_range_bounds() {
        for version in [10, 15] {
            assert!(SensorInfo::parse(&with("firmware_version", json!(version))).is_ok());
        }
        assert!(SensorInfo::parse(&with("reading_interval", json!(1))).is_ok());
    }

    #[test]
    fn test_parse_ignores_extra_keys() {
        let raw = with("uptime", json!(1234));
        assert!(SensorInfo::parse(&raw).is_ok());
    }

    #[test]
    fn test_single_violations_name_the_field() {
        let cases = [
            (with("name", json!("")), "name", ValidationErrorKind::RangeViolation),
            (with("hid", json!("")), "hid", ValidationErrorKind::RangeViolation),
            (with("model", json!("")), "model", ValidationErrorKind::RangeViolation),
            (
                with("firmware_version", json!(9)),
                "firmware_version",
                ValidationErrorKind::RangeViolation,
            ),
            (
                with("firmware_version", json!(16)),
                "firmware_version",
                ValidationErrorKind::RangeViolation,
            ),
            (
                with("reading_interval", json!(0)),
                "reading_interval",
                ValidationErrorKind::RangeViolation,
            ),
            (
                with("reading_interval", json!(-3)),
                "reading_interval",
                ValidationErrorKind::RangeViolation,
            ),
        ];

        for (raw, field, kind) in cases {
            let err = SensorInfo::parse(&raw).unwrap_err();
            assert_eq!(err.field, field, "raw: {}", raw);
            assert_eq!(err.kind, kind, "raw: {}", raw);
        }
    }

    #[test]
    fn test_type_mismatches() {
        let cases = [
            (with("name", json!(42)), "name"),
            (with("hid", Value::Null), "hid"),
            (without("model"), "model"),
            (with("firmware_version", json!("12")), "firmware_version"),
            (with("firmware_version", json!(12.0)), "firmware_version"),
            (with("reading_interval", json!(true)), "reading_interval"),
        ];

        for (raw, field) in cases {
            let err = SensorInfo::parse(&raw).unwrap_err();
            assert_eq!(err.field, field);
            assert_eq!(err.kind, ValidationErrorKind::TypeMismatch);
        }
    }

    #[test]
    fn test_non_object_is_type_mismatch() {
        for raw in [json!({}), json!("rebooting"), json!([]), Value::Null] {
            let err = SensorInfo::parse(&raw).unwrap_err();
            assert_eq!(err.field, "name");
            assert_eq!(err.kind, ValidationErrorKind::TypeMismatch);
        }
    }

    #[test]
    fn test_huge_firmware_is_range_violation() {
        let err = SensorInfo::parse(&with("firmware_version", json!(u64::MAX))).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::RangeViolation);
    }

    #[test]
    fn test_wide_reading_interval_is_kept() {
        for interval in [1u64 << 32, u64::MAX] {
            let raw = with("reading_interval", json!(interval));
            let info = SensorInfo::parse(&raw).unwrap();

            assert_eq!(info.reading_interval(), interval);
            assert_eq!(serde_json::to_value(&info).unwrap(), raw);
        }
        assert!(SensorInfo::new("Sensor", "0a1b2c", "T-1000", 12, 1 << 32).is_ok());
        assert!(SensorInfo::new("Sensor", "0a1b2c", "T-1000", 12, 0).is_err());
    }

    #[test]
    fn test_structural_equality() {
        let a = SensorInfo::parse(&valid_raw()).unwrap();
        let b = SensorInfo::new("Sensor", "0a1b2c", "T-1000", 12, 4).unwrap();
        let c = SensorInfo::new("Renamed", "0a1b2c", "T-1000", 12, 4).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_firmware_chain() {
        let mut version = FirmwareVersion::MIN;
        let mut seen = vec![version.get()];
        while let Some(next) = version.next() {
            version = next;
            seen.push(version.get());
        }

        assert_eq!(seen, vec![10, 11, 12, 13, 14, 15]);
        assert!(version.is_latest());
        assert!(FirmwareVersion::new(9).is_err());
        assert!(FirmwareVersion::new(16).is_err());
    }
}
