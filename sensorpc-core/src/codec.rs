//! Encoding requests and resolving response bodies
//!
//! Decoding here is deliberately forgiving. A body that is not JSON, or JSON
//! that is not an object, becomes an empty object, and [`resolve`] turns
//! that into [`RpcResponse::Empty`]. Nothing in this module returns an error
//! for a bad response.
//!
//! # Examples
//!
//! ```rust
//! use sensorpc_core::{codec, RpcResponse};
//!
//! let raw = codec::decode_body(r#"{"jsonrpc":"2.0","result":"rebooting","id":1}"#);
//! assert_eq!(codec::resolve(&raw), RpcResponse::Success("rebooting".into()));
//!
//! let garbage = codec::decode_body("<html>502</html>");
//! assert!(codec::resolve(&garbage).is_empty());
//! ```

use crate::error::{Error, Result, RpcError};
use crate::types::{RpcRequest, RpcResponse};
use serde_json::{Map, Value};

/// An empty JSON object, the "no result, no error" body
pub fn empty_body() -> Value {
    Value::Object(Map::new())
}

/// Encode a request to its JSON value
pub fn encode_request(req: &RpcRequest) -> Result<Value> {
    serde_json::to_value(req).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a response body, falling back to an empty object
///
/// Anything that does not parse as a JSON object yields `{}`.
pub fn decode_body(data: &str) -> Value {
    match serde_json::from_str::<Value>(data) {
        Ok(value) if value.is_object() => value,
        Ok(other) => {
            tracing::debug!(body = %other, "Response body is not a JSON object");
            empty_body()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Response body is not valid JSON");
            empty_body()
        }
    }
}

/// Resolve a raw response into exactly one branch
///
/// Precedence, applied once here so callers never inspect keys themselves:
///
/// 1. a well-formed `error` object (integer `code`, string `message`)
/// 2. a non-null `result`
/// 3. otherwise `Empty`
///
/// A response carrying both members is a server bug; the error wins so a
/// failure is never mistaken for success. A malformed `error` member is
/// ignored.
pub fn resolve(raw: &Value) -> RpcResponse {
    if let Some(error) = raw.get("error") {
        match serde_json::from_value::<RpcError>(error.clone()) {
            Ok(error) => return RpcResponse::Failure(error),
            Err(e) => tracing::warn!(error = %e, "Ignoring malformed error member"),
        }
    }

    match raw.get("result") {
        Some(Value::Null) | None => RpcResponse::Empty,
        Some(result) => RpcResponse::Success(result.clone()),
    }
}
