//! Error types for sensorpc
//!
//! Two families of errors live here:
//!
//! - **Error**: everything a caller of the sensor client can see (uses thiserror)
//! - **RpcError**: the wire-format `error` member of a JSON-RPC response
//!
//! # Error Codes
//!
//! The sensor honors the standard JSON-RPC 2.0 codes plus one
//! implementation-defined server error:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32000`: Method execution error
//!
//! # Propagation
//!
//! Transport problems never reach this enum; the transport answers with an
//! empty body instead. Protocol errors are first seen as
//! [`RpcResponse::Failure`](crate::RpcResponse) and only become
//! [`Error::Rpc`] when a typed client call needs a result.
//!
//! # Examples
//!
//! ```rust
//! use sensorpc_core::{ErrorCode, RpcError};
//!
//! let error = RpcError::from_code(ErrorCode::MethodNotFound);
//! assert_eq!(error.code, -32601);
//! assert_eq!(error.message, "Method not found");
//! ```

use crate::sensor::{SensorInfo, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for sensorpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC parse error code
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC invalid request code
pub const INVALID_REQUEST: i32 = -32600;
/// JSON-RPC method not found code
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC invalid params code
pub const INVALID_PARAMS: i32 = -32602;
/// Device specific method execution error code
pub const METHOD_EXECUTION_ERROR: i32 = -32000;

/// Error codes the sensor is known to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid JSON was received by the device
    ParseError,
    /// The JSON sent is not a valid request object
    InvalidRequest,
    /// The method does not exist on the device
    MethodNotFound,
    /// Invalid method parameter(s)
    InvalidParams,
    /// The method was accepted but failed while executing
    MethodExecution,
}

impl ErrorCode {
    /// Every known code, in wire order
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::ParseError,
        ErrorCode::InvalidRequest,
        ErrorCode::MethodNotFound,
        ErrorCode::InvalidParams,
        ErrorCode::MethodExecution,
    ];

    /// Numeric value sent on the wire
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => PARSE_ERROR,
            ErrorCode::InvalidRequest => INVALID_REQUEST,
            ErrorCode::MethodNotFound => METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => INVALID_PARAMS,
            ErrorCode::MethodExecution => METHOD_EXECUTION_ERROR,
        }
    }

    /// Canonical message the device pairs with this code
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::MethodExecution => "Method execution error",
        }
    }

    /// Look up a known code; `None` for anything outside the taxonomy
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

/// Everything that can go wrong talking to the sensor
///
/// Only validation failures and post-condition violations are meant to
/// escalate; transport and protocol anomalies are absorbed lower down as
/// sentinels and surface here only when a typed call has nothing else to
/// return.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The device answered with a JSON-RPC error envelope
    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// The device gave neither a result nor an error
    ///
    /// Covers unreachable hosts, non-JSON bodies and `{}` alike. Normal while
    /// the device restarts, which is why the poll engine treats it as a
    /// failed attempt rather than a fatal one.
    #[error("Empty response from sensor")]
    EmptyResponse,

    /// Serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// `get_info` returned data that does not describe a valid sensor
    #[error("Invalid sensor info: {0}")]
    Validation(#[from] ValidationError),

    /// A result had the wrong JSON shape for the method
    #[error("Unexpected result for {method}: {detail}")]
    UnexpectedResult {
        /// Wire method name
        method: String,
        /// What was wrong with it
        detail: String,
    },

    /// A fire-and-forget method returned the wrong acknowledgement literal
    #[error("Unexpected acknowledgement to {method}: expected {expected:?}, got {actual}")]
    UnexpectedAcknowledgement {
        /// Wire method name
        method: String,
        /// Literal the device should have answered with
        expected: String,
        /// What it answered with instead
        actual: serde_json::Value,
    },

    /// The device never reached the expected state within the poll budget
    #[error("Sensor did not converge after {operation}: {attempts} attempts exhausted")]
    ConvergenceTimeout {
        /// Operation that was being waited on
        operation: String,
        /// Attempts spent
        attempts: u32,
    },

    /// Persisted device state changed across an operation that must keep it
    #[error("Sensor state drifted across {operation}: before {before:?}, after {after:?}")]
    StateDrift {
        /// Operation that changed the state
        operation: String,
        /// Snapshot taken before the operation
        before: Box<SensorInfo>,
        /// Snapshot taken after convergence
        after: Box<SensorInfo>,
    },

    /// A firmware update converged on the wrong version
    #[error("Firmware version went from {before} to {after}, expected {expected}")]
    FirmwareMismatch {
        /// Version before the update
        before: u8,
        /// Version observed after the update
        after: u8,
        /// Version that should have been observed
        expected: u8,
    },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Tracing or metrics exporters could not be installed
    #[error("Observability error: {0}")]
    Observability(String),
}

/// JSON-RPC 2.0 error object as sent by the device
///
/// Appears in the `error` member of a response. `data` is optional and only
/// carried through for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Optional additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// Create an error with an arbitrary code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error carrying the canonical message for `code`
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code.code(), code.message())
    }

    /// The known code this error carries, if any
    pub fn kind(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    /// True if the code is known and the message is its canonical text
    pub fn is_canonical(&self) -> bool {
        self.kind().is_some_and(|k| k.message() == self.message)
    }
}

impl std::fmt::Display for RpcError {
    /// Formats as "[code] message", e.g. "[-32601] Method not found"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}
