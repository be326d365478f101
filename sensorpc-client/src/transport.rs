//! Sending one request to the sensor
//!
//! A transport performs exactly one round trip per call and never retries;
//! retrying is the poll engine's job. It also never fails: connection
//! errors, timeouts and bodies that are not JSON objects all come back as
//! an empty object, which the resolver reads as "no answer yet".

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use sensorpc_core::{codec, Error, Result, SensorConfig};
use serde_json::Value;

/// One-shot delivery of a JSON body to the sensor
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `body` and return the decoded response body, or `{}` on any failure
    async fn send(&self, body: &Value) -> Value;
}

/// HTTP POST transport to `{host}:{port}/rpc`
///
/// The pin goes into the `Authorization` header exactly as configured, with
/// no scheme prefix.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    pin: String,
}

impl HttpTransport {
    /// Build a transport for the configured sensor
    pub fn new(config: &SensorConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            pin: config.pin.clone(),
        })
    }

    /// URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, body), fields(endpoint = %self.endpoint))]
    async fn send(&self, body: &Value) -> Value {
        let response = match self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.pin.as_str())
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Sensor unreachable");
                return codec::empty_body();
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(text) => {
                tracing::trace!(%status, body = %text, "Sensor responded");
                codec::decode_body(&text)
            }
            Err(e) => {
                tracing::warn!(%status, error = %e, "Failed to read sensor response");
                codec::empty_body()
            }
        }
    }
}
