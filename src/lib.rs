//! sensorpc - JSON-RPC 2.0 over HTTP for a networked sensor
//!
//! This is the convenience crate that re-exports the sensorpc sub-crates.
//!
//! # Architecture
//!
//! - **sensorpc-core**: envelopes, codec, sensor domain model, errors, observability
//! - **sensorpc-client**: HTTP transport, polling, typed client, convergence checks
//!
//! The `sensor-check` binary lives in `sensorpc-cli`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sensorpc::SensorClient;
//! use sensorpc::core::SensorConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SensorClient::new(&SensorConfig::from_env()?)?;
//!
//!     let info = client.convergence().reboot().await?;
//!     println!("{} is back on firmware {}", info.name(), info.firmware_version());
//!
//!     Ok(())
//! }
//! ```

pub use sensorpc_client as client;
pub use sensorpc_core as core;

pub use sensorpc_client::{ClientBuilder, SensorClient};
pub use sensorpc_core::{Error, Result, SensorConfig, SensorInfo};
