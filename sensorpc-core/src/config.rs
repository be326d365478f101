//! Connection settings for a sensor
//!
//! A [`SensorConfig`] is built once at startup and handed to the client
//! builder; nothing reads it from global state afterwards.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default sensor host, including the scheme
pub const DEFAULT_HOST: &str = "http://127.0.0.1";
/// Default sensor port
pub const DEFAULT_PORT: u16 = 9898;
/// Default pin sent in the `Authorization` header
pub const DEFAULT_PIN: &str = "0000";
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the sensor lives and how to authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    /// Host with scheme, e.g. `http://127.0.0.1`
    pub host: String,
    /// TCP port of the JSON-RPC endpoint
    pub port: u16,
    /// Pin sent verbatim as the `Authorization` header
    pub pin: String,
    /// Upper bound for a single HTTP round trip
    pub request_timeout: Duration,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            pin: DEFAULT_PIN.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SensorConfig {
    /// Create a configuration for the given host and port with the default pin
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Defaults overridden by `SENSOR_HOST`, `SENSOR_PORT` and `SENSOR_PIN`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SENSOR_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("SENSOR_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("SENSOR_PORT is not a port: {}", port)))?;
        }
        if let Ok(pin) = std::env::var("SENSOR_PIN") {
            config.pin = pin;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the pin
    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = pin.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL of the JSON-RPC endpoint: `{host}:{port}/rpc`
    pub fn endpoint(&self) -> String {
        format!("{}:{}/rpc", self.host.trim_end_matches('/'), self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::Config("Sensor host cannot be empty".to_string()));
        }
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(Error::Config(format!(
                "Sensor host '{}' must start with http:// or https://",
                self.host
            )));
        }
        if self.port == 0 {
            return Err(Error::Config("Sensor port must be greater than 0".to_string()));
        }
        if self.pin.is_empty() {
            return Err(Error::Config("Sensor pin cannot be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SensorConfig::default();
        assert_eq!(config.host, "http://127.0.0.1");
        assert_eq!(config.port, 9898);
        assert_eq!(config.pin, "0000");
        assert_eq!(config.endpoint(), "http://127.0.0.1:9898/rpc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = SensorConfig::new("http://sensor.local/", 8080);
        assert_eq!(config.endpoint(), "http://sensor.local:8080/rpc");
    }

    #[test]
    fn test_builder_methods() {
        let config = SensorConfig::new("https://10.0.0.5", 443)
            .with_pin("1234")
            .with_request_timeout(Duration::from_secs(2));

        assert_eq!(config.pin, "1234");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            SensorConfig::new("", 9898),
            SensorConfig::new("127.0.0.1", 9898),
            SensorConfig::new("http://127.0.0.1", 0),
            SensorConfig::default().with_pin(""),
            SensorConfig::default().with_request_timeout(Duration::ZERO),
        ];

        for config in bad {
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{:?}", config);
        }
    }
}
