//! Client builder for configuring polling and observability
//!
//! The `ClientBuilder` provides a fluent API for configuring a
//! [`SensorClient`] before use. It allows you to:
//! - Change the poll budget used by the convergence checks
//! - Swap the HTTP transport for another [`Transport`]
//! - Configure observability (OpenTelemetry)
//! - Set service name for telemetry
//!
//! # Examples
//!
//! ```rust,no_run
//! use sensorpc_client::{ClientBuilder, RetrySpec};
//! use sensorpc_core::SensorConfig;
//! use std::time::Duration;
//!
//! # fn example() -> sensorpc_core::Result<()> {
//! // Faster polling
//! let client = ClientBuilder::new(SensorConfig::default())
//!     .with_retry(RetrySpec::new(5, Duration::from_millis(200)))
//!     .build()?;
//!
//! // With observability
//! let client2 = ClientBuilder::new(SensorConfig::from_env()?)
//!     .with_default_observability()
//!     .service_name("sensor-bench")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::{ClientMetrics, HttpTransport, RetrySpec, SensorClient, Transport};
use sensorpc_core::{Error, ObservabilityConfig, Result, SensorConfig};
use std::sync::Arc;

/// Builder for configuring and creating a SensorClient
pub struct ClientBuilder {
    config: SensorConfig,
    retry: RetrySpec,
    transport: Option<Arc<dyn Transport>>,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new(config: SensorConfig) -> Self {
        Self {
            config,
            retry: RetrySpec::default(),
            transport: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Poll budget for reboot, reset and firmware update checks
    pub fn with_retry(mut self, retry: RetrySpec) -> Self {
        self.retry = retry;
        self
    }

    /// Use a custom transport instead of HTTP
    ///
    /// The sensor config is then only used for validation.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SensorClient> {
        self.config.validate()?;

        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            sensorpc_core::init_observability(config).map_err(|e| {
                Error::Observability(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(ClientMetrics::new()))
        } else {
            None
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };

        tracing::debug!(
            endpoint = %self.config.endpoint(),
            max_attempts = self.retry.max_attempts(),
            interval_ms = self.retry.interval().as_millis() as u64,
            "Sensor client ready"
        );

        Ok(SensorClient {
            transport,
            retry: self.retry,
            metrics,
        })
    }
}
