//! Core JSON-RPC types and sensor domain model for sensorpc
//!
//! This crate holds everything about talking to the sensor that does not
//! need a network:
//!
//! - **Types**: request builder and resolved response envelope
//! - **Codec**: tolerant body decoding and response resolution
//! - **Sensor**: the validated [`SensorInfo`] model and firmware version chain
//! - **Error handling**: the device error taxonomy and the crate error type
//! - **Config**: host, port and pin of the device
//! - **Observability**: tracing subscriber and OpenTelemetry export
//!
//! # Example
//!
//! ```rust
//! use sensorpc_core::{codec, RpcRequest, RpcResponse, SensorInfo, SensorMethod};
//! use serde_json::json;
//!
//! let request = RpcRequest::build(SensorMethod::GetInfo, None);
//! assert_eq!(request.method, "get_info");
//!
//! let raw = json!({"result": {
//!     "name": "Sensor", "hid": "ab", "model": "M",
//!     "firmware_version": 11, "reading_interval": 1
//! }});
//! match codec::resolve(&raw) {
//!     RpcResponse::Success(result) => {
//!         let info = SensorInfo::parse(&result).unwrap();
//!         assert_eq!(info.firmware_version().get(), 11);
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod observability;
pub mod sensor;
pub mod types;

pub use config::SensorConfig;
pub use error::{Error, ErrorCode, Result, RpcError};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use sensor::{FirmwareVersion, SensorInfo, ValidationError, ValidationErrorKind};
pub use types::{RpcRequest, RpcResponse, SensorMethod};
