//! Client metrics definitions
//!
//! OpenTelemetry instruments recorded by [`SensorClient`](crate::SensorClient)
//! when observability is enabled through the builder. They are exported by
//! whatever meter provider `init_observability` installed; without one they
//! are no-ops.
//!
//! # Metrics Collected
//!
//! - **sensorpc.client.requests.total**: requests sent, by method and outcome
//! - **sensorpc.client.request.duration**: round trip latency in seconds
//! - **sensorpc.client.errors.total**: JSON-RPC error responses, by code
//! - **sensorpc.client.poll.attempts**: attempts spent per convergence poll
//! - **sensorpc.client.convergence.total**: convergence checks, by operation and outcome

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Instrumentation scope used for the client meter
const METER_NAME: &str = "sensorpc-client";

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Total number of requests sent
    pub requests_total: Counter<u64>,
    /// Request duration in seconds
    pub request_duration: Histogram<f64>,
    /// Total number of JSON-RPC error responses
    pub errors_total: Counter<u64>,
    /// Attempts spent per poll
    pub poll_attempts: Histogram<u64>,
    /// Convergence checks by outcome
    pub convergence_total: Counter<u64>,
}

impl ClientMetrics {
    /// Create metrics on the global meter provider
    pub fn new() -> Self {
        let meter = global::meter(METER_NAME);
        Self::new_with_meter(&meter)
    }

    /// Create metrics on a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("sensorpc.client.requests.total")
                .with_description("Total number of requests sent to the sensor")
                .build(),
            request_duration: meter
                .f64_histogram("sensorpc.client.request.duration")
                .with_description("Request duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("sensorpc.client.errors.total")
                .with_description("Total number of JSON-RPC error responses")
                .build(),
            poll_attempts: meter
                .u64_histogram("sensorpc.client.poll.attempts")
                .with_description("Attempts spent waiting for the sensor to converge")
                .build(),
            convergence_total: meter
                .u64_counter("sensorpc.client.convergence.total")
                .with_description("Convergence checks by operation and outcome")
                .build(),
        }
    }

    /// Record a request; `outcome` is "success", "error" or "empty"
    pub fn record_request(&self, method: &str, outcome: &'static str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("outcome", outcome),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record a JSON-RPC error response
    pub fn record_error(&self, method: &str, code: i32) {
        self.errors_total.add(
            1,
            &[
                KeyValue::new("method", method.to_string()),
                KeyValue::new("code", i64::from(code)),
            ],
        );
    }

    /// Record the outcome of a convergence poll
    pub fn record_convergence(&self, operation: &'static str, converged: bool, attempts: u32) {
        let outcome = if converged { "converged" } else { "timeout" };
        let attributes = &[
            KeyValue::new("operation", operation),
            KeyValue::new("outcome", outcome),
        ];
        self.poll_attempts.record(u64::from(attempts), attributes);
        self.convergence_total.add(1, attributes);
    }
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}
