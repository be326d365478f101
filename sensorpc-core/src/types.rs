//! JSON-RPC 2.0 envelopes as the sensor speaks them
//!
//! The sensor only ever sees one request at a time, so ids are plain
//! integers that default to `1` and are never used for correlation.
//!
//! # Message Types
//!
//! 1. **RpcRequest**: a method call, built fresh for every send
//! 2. **RpcResponse**: the resolved answer, one of success, failure or empty
//!
//! The raw response body is never handed to callers; [`crate::codec::resolve`]
//! turns it into an [`RpcResponse`] once, at the boundary.

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Protocol version written into every well-formed request
pub const JSONRPC_VERSION: &str = "2.0";

/// Id used when the caller does not pick one
pub const DEFAULT_REQUEST_ID: i64 = 1;

/// Methods exposed by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMethod {
    /// Read the sensor description
    GetInfo,
    /// Take a temperature reading
    GetReading,
    /// Rename the sensor (`{"name": ...}`)
    SetName,
    /// Change the reading interval (`{"interval": ...}`)
    SetReadingInterval,
    /// List the methods the device supports
    GetMethods,
    /// Restore factory settings (asynchronous on the device)
    ResetToFactory,
    /// Bump firmware by one version (asynchronous on the device)
    UpdateFirmware,
    /// Restart the device (asynchronous on the device)
    Reboot,
}

impl SensorMethod {
    /// Every method, in the order the device documents them
    pub const ALL: [SensorMethod; 8] = [
        SensorMethod::GetInfo,
        SensorMethod::GetReading,
        SensorMethod::SetName,
        SensorMethod::SetReadingInterval,
        SensorMethod::GetMethods,
        SensorMethod::ResetToFactory,
        SensorMethod::UpdateFirmware,
        SensorMethod::Reboot,
    ];

    /// Wire name of the method
    pub fn as_str(self) -> &'static str {
        match self {
            SensorMethod::GetInfo => "get_info",
            SensorMethod::GetReading => "get_reading",
            SensorMethod::SetName => "set_name",
            SensorMethod::SetReadingInterval => "set_reading_interval",
            SensorMethod::GetMethods => "get_methods",
            SensorMethod::ResetToFactory => "reset_to_factory",
            SensorMethod::UpdateFirmware => "update_firmware",
            SensorMethod::Reboot => "reboot",
        }
    }
}

impl fmt::Display for SensorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown sensor method: {}", s))
    }
}

/// JSON-RPC 2.0 request
///
/// Field order matches what the device documents:
/// `{"method", "jsonrpc", "id", "params"?}`.
///
/// # Params
///
/// `params` is omitted entirely when there are none. An empty mapping is
/// treated the same as no mapping: the device answers an explicit `{}`
/// differently from a missing member, so the builder never inserts one.
///
/// # Examples
///
/// ```rust
/// use sensorpc_core::{RpcRequest, SensorMethod};
/// use serde_json::json;
///
/// let request = RpcRequest::build(SensorMethod::GetInfo, None);
/// assert_eq!(
///     serde_json::to_value(&request).unwrap(),
///     json!({"method": "get_info", "jsonrpc": "2.0", "id": 1})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Name of the remote method to invoke
    pub method: String,
    /// JSON-RPC version, "2.0" unless deliberately overridden
    pub jsonrpc: String,
    /// Request id
    pub id: i64,
    /// Named parameters, skipped in JSON if absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl RpcRequest {
    /// Create a request with version "2.0", id 1 and no params
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: DEFAULT_REQUEST_ID,
            params: None,
        }
    }

    /// Build a request for a sensor method, dropping empty params
    pub fn build(method: SensorMethod, params: Option<Map<String, Value>>) -> Self {
        let request = Self::new(method.as_str());
        match params {
            Some(params) => request.with_params(params),
            None => request,
        }
    }

    /// Attach params; an empty mapping leaves the request without any
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = if params.is_empty() { None } else { Some(params) };
        self
    }

    /// Override the protocol version string
    pub fn with_version(mut self, jsonrpc: impl Into<String>) -> Self {
        self.jsonrpc = jsonrpc.into();
        self
    }

    /// Override the request id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// A response envelope after resolution
///
/// Exactly one branch applies. `Empty` covers bodies with neither a usable
/// `result` nor a usable `error`, which is what a restarting device looks
/// like from the outside.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    /// The method ran; carries `result`
    Success(Value),
    /// The device rejected the call
    Failure(RpcError),
    /// No answer yet
    Empty,
}

impl RpcResponse {
    /// Returns true for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, RpcResponse::Success(_))
    }

    /// Returns true for `Failure`
    pub fn is_failure(&self) -> bool {
        matches!(self, RpcResponse::Failure(_))
    }

    /// Returns true for `Empty`
    pub fn is_empty(&self) -> bool {
        matches!(self, RpcResponse::Empty)
    }

    /// Convert into a `Result`, mapping `Empty` to [`crate::Error::EmptyResponse`]
    pub fn into_result(self) -> crate::Result<Value> {
        match self {
            RpcResponse::Success(value) => Ok(value),
            RpcResponse::Failure(error) => Err(crate::Error::Rpc(error)),
            RpcResponse::Empty => Err(crate::Error::EmptyResponse),
        }
    }
}
