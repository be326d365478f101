//! JSON-RPC 2.0 client for the sensor over HTTP
//!
//! This crate talks to a single networked temperature sensor. Every call is
//! one HTTP POST to `{host}:{port}/rpc` with the pin in the `Authorization`
//! header, and every operation awaits its response before the next request
//! is sent.
//!
//! # Core Features
//!
//! - **HTTP Transport**: one round trip per call, failures absorbed as `{}`
//! - **Typed calls**: `get_info`, `get_reading`, `set_name`,
//!   `set_reading_interval`, `get_methods`
//! - **Polling**: fixed-interval attempts with a hard budget
//! - **Convergence checks**: reset, reboot and firmware update with
//!   post-condition verification
//! - **Observability**: OpenTelemetry integration for traces and metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sensorpc_client::SensorClient;
//! use sensorpc_core::SensorConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SensorClient::new(&SensorConfig::default())?;
//!
//!     let info = client.get_info().await?;
//!     println!("{} runs firmware {}", info.name(), info.firmware_version());
//!
//!     let reading = client.get_reading().await?;
//!     println!("Temperature: {}", reading);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Waiting for the device
//!
//! ```rust,no_run
//! use sensorpc_client::{ClientBuilder, FirmwareUpdate, RetrySpec};
//! use sensorpc_core::SensorConfig;
//! use std::time::Duration;
//!
//! # async fn example() -> sensorpc_core::Result<()> {
//! let client = ClientBuilder::new(SensorConfig::from_env()?)
//!     .with_retry(RetrySpec::new(15, Duration::from_secs(1)))
//!     .build()?;
//!
//! match client.convergence().update_firmware().await? {
//!     FirmwareUpdate::Updated { from, to } => println!("{} -> {}", from, to),
//!     FirmwareUpdate::AlreadyLatest { version } => println!("already at {}", version),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod client_builder;
mod convergence;
mod metrics;
mod poll;
mod transport;

pub use client::SensorClient;
pub use client_builder::ClientBuilder;
pub use convergence::{
    Convergence, FirmwareUpdate, ALREADY_LATEST_ACK, REBOOT_ACK, RESET_ACK,
};
pub use metrics::ClientMetrics;
pub use poll::{poll, PollOutcome, RetrySpec, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
pub use transport::{HttpTransport, Transport};
