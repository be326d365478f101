//! The sensor client
//!
//! [`SensorClient`] ties the pieces together: it builds a request, hands it
//! to the [`Transport`], resolves the body once and converts the outcome
//! into typed values.
//!
//! # Layers
//!
//! - [`SensorClient::send_raw`]: any JSON body in, raw body out. Used to
//!   exercise the device with deliberately malformed envelopes.
//! - [`SensorClient::send`]: an [`RpcRequest`] in, a resolved
//!   [`RpcResponse`] out. Never fails.
//! - [`SensorClient::call`] and the typed methods: `Result`s, with
//!   `Failure` mapped to [`Error::Rpc`] and `Empty` to
//!   [`Error::EmptyResponse`].
//!
//! The device mutations that complete in the background (reset, reboot,
//! firmware update) live on [`Convergence`], reached through
//! [`SensorClient::convergence`].
//!
//! # Sequencing
//!
//! Every method awaits its single round trip before returning and the
//! client never pipelines, so at most one request is in flight per client.

use crate::convergence::Convergence;
use crate::metrics::ClientMetrics;
use crate::poll::RetrySpec;
use crate::transport::{HttpTransport, Transport};
use crate::ClientBuilder;
use sensorpc_core::{
    codec, Error, Result, RpcRequest, RpcResponse, SensorConfig, SensorInfo, SensorMethod,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// JSON-RPC client for one sensor
#[derive(Clone)]
pub struct SensorClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) retry: RetrySpec,
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl SensorClient {
    /// HTTP client for the configured sensor with default polling
    pub fn new(config: &SensorConfig) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    /// Client over an arbitrary transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            retry: RetrySpec::default(),
            metrics: None,
        }
    }

    /// Start configuring a client
    pub fn builder(config: SensorConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Poll budget used by [`SensorClient::convergence`]
    pub fn retry(&self) -> RetrySpec {
        self.retry
    }

    /// Send a JSON body as-is and return the raw response body
    ///
    /// Returns `{}` when the device is unreachable or the body is not JSON.
    pub async fn send_raw(&self, body: &Value) -> Value {
        self.transport.send(body).await
    }

    /// Send a request and resolve the response
    #[tracing::instrument(skip(self, request), fields(method = %request.method))]
    pub async fn send(&self, request: &RpcRequest) -> RpcResponse {
        let start = std::time::Instant::now();

        let body = match codec::encode_request(request) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode request");
                return RpcResponse::Empty;
            }
        };

        let response = codec::resolve(&self.transport.send(&body).await);
        let duration = start.elapsed().as_secs_f64();

        let outcome = match &response {
            RpcResponse::Success(_) => "success",
            RpcResponse::Failure(error) => {
                tracing::debug!(%error, "Sensor returned an error");
                if let Some(ref m) = self.metrics {
                    m.record_error(&request.method, error.code);
                }
                "error"
            }
            RpcResponse::Empty => {
                tracing::debug!("Sensor returned no result");
                "empty"
            }
        };

        if let Some(ref m) = self.metrics {
            m.record_request(&request.method, outcome, duration);
        }

        response
    }

    /// Call a method and return its `result`
    pub async fn call(&self, method: SensorMethod, params: Option<Map<String, Value>>) -> Result<Value> {
        self.send(&RpcRequest::build(method, params)).await.into_result()
    }

    /// Read and validate the sensor description
    pub async fn get_info(&self) -> Result<SensorInfo> {
        let result = self.call(SensorMethod::GetInfo, None).await?;
        Ok(SensorInfo::parse(&result)?)
    }

    /// Take a temperature reading
    pub async fn get_reading(&self) -> Result<f64> {
        match self.call(SensorMethod::GetReading, None).await? {
            Value::Number(n) if n.is_f64() => n
                .as_f64()
                .ok_or_else(|| unexpected(SensorMethod::GetReading, "reading out of range")),
            other => Err(unexpected(
                SensorMethod::GetReading,
                format!("expected a float, got {}", other),
            )),
        }
    }

    /// Rename the sensor, returning the device's acknowledgement
    pub async fn set_name(&self, name: &str) -> Result<Value> {
        self.call(SensorMethod::SetName, Some(params(json!({ "name": name })))).await
    }

    /// Change the reading interval; the device answers with its updated info
    pub async fn set_reading_interval(&self, interval: u64) -> Result<SensorInfo> {
        let result = self
            .call(
                SensorMethod::SetReadingInterval,
                Some(params(json!({ "interval": interval }))),
            )
            .await?;
        Ok(SensorInfo::parse(&result)?)
    }

    /// Names of the methods the device supports
    pub async fn get_methods(&self) -> Result<Vec<String>> {
        let result = self.call(SensorMethod::GetMethods, None).await?;
        serde_json::from_value(result.clone()).map_err(|_| {
            unexpected(
                SensorMethod::GetMethods,
                format!("expected a list of names, got {}", result),
            )
        })
    }

    /// Operations whose effect has to be polled for
    pub fn convergence(&self) -> Convergence<'_> {
        Convergence::new(self, self.retry)
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn unexpected(method: SensorMethod, detail: impl Into<String>) -> Error {
    Error::UnexpectedResult {
        method: method.as_str().to_string(),
        detail: detail.into(),
    }
}
