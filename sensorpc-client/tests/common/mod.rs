//! Common test utilities for sensorpc-client integration tests
//!
//! This module provides a simulated sensor served over HTTP so the client
//! can be exercised end to end without real hardware.

#![allow(dead_code)]

use sensorpc_client::{ClientBuilder, RetrySpec, SensorClient};
use sensorpc_core::SensorConfig;
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Reply};

pub const PIN: &str = "4321";
pub const FACTORY_NAME: &str = "Sensor";
pub const FACTORY_INTERVAL: u64 = 1;
pub const HID: &str = "ae7d31b0";
pub const MODEL: &str = "TS-1";

/// How the simulated device misbehaves
#[derive(Debug, Clone)]
pub struct Behavior {
    /// How long the device stays silent after reboot, reset or update
    pub downtime: Duration,
    /// Answer every request with a body that is not JSON
    pub garbage_body: bool,
    /// Never refresh the reading, whatever the reading interval says
    pub stale_readings: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            downtime: Duration::from_millis(60),
            garbage_body: false,
            stale_readings: false,
        }
    }
}

#[derive(Debug)]
struct DeviceState {
    name: String,
    firmware_version: i64,
    reading_interval: u64,
    reading: f64,
    refreshed_at: Instant,
    offline_until: Option<Instant>,
}

impl DeviceState {
    fn factory() -> Self {
        Self {
            name: FACTORY_NAME.to_string(),
            firmware_version: 10,
            reading_interval: FACTORY_INTERVAL,
            reading: 21.5,
            refreshed_at: Instant::now(),
            offline_until: None,
        }
    }

    fn info(&self) -> Value {
        json!({
            "name": self.name,
            "hid": HID,
            "model": MODEL,
            "firmware_version": self.firmware_version,
            "reading_interval": self.reading_interval,
        })
    }

    /// The reading only moves once per `reading_interval` seconds
    fn current_reading(&mut self, stale: bool) -> f64 {
        let period = Duration::from_secs(self.reading_interval);
        if !stale && self.refreshed_at.elapsed() >= period {
            self.reading += 0.25;
            self.refreshed_at = Instant::now();
        }
        self.reading
    }

    fn is_offline(&self) -> bool {
        self.offline_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }
}

/// Simulated sensor on an ephemeral local port
pub struct SimulatedSensor {
    addr: SocketAddr,
    state: Arc<Mutex<DeviceState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl SimulatedSensor {
    /// Start a sensor with the default behavior
    pub async fn start() -> Self {
        Self::with_behavior(Behavior::default()).await
    }

    /// Start a sensor with custom behavior
    pub async fn with_behavior(behavior: Behavior) -> Self {
        let state = Arc::new(Mutex::new(DeviceState::factory()));
        let route_state = state.clone();

        let rpc = warp::post()
            .and(warp::path("rpc"))
            .and(warp::path::end())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::bytes())
            .map(move |auth: Option<String>, body: Bytes| {
                if behavior.garbage_body {
                    return warp::reply::with_status("<html>oops</html>".to_string(), StatusCode::OK)
                        .into_response();
                }
                if auth.as_deref() != Some(PIN) {
                    return warp::reply::with_status(String::new(), StatusCode::UNAUTHORIZED)
                        .into_response();
                }

                let mut state = route_state.lock().unwrap();
                if state.is_offline() {
                    return warp::reply::with_status(String::new(), StatusCode::SERVICE_UNAVAILABLE)
                        .into_response();
                }

                let response = handle(&mut state, &body, &behavior);
                warp::reply::json(&response).into_response()
            });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr, server) =
            warp::serve(rpc).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                shutdown_rx.await.ok();
            });
        tokio::spawn(server);

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Config pointing at this sensor with the right pin
    pub fn config(&self) -> SensorConfig {
        SensorConfig::new("http://127.0.0.1", self.addr.port())
            .with_pin(PIN)
            .with_request_timeout(Duration::from_secs(2))
    }

    /// Client with a poll budget sized for the simulated downtime
    pub fn client(&self) -> SensorClient {
        self.client_with_retry(RetrySpec::new(40, Duration::from_millis(25)))
    }

    /// Client with a custom poll budget
    pub fn client_with_retry(&self, retry: RetrySpec) -> SensorClient {
        ClientBuilder::new(self.config())
            .with_retry(retry)
            .build()
            .unwrap()
    }

    /// Force the firmware version
    pub fn set_firmware(&self, version: i64) {
        self.state.lock().unwrap().firmware_version = version;
    }

    /// Current device state as `get_info` would report it
    pub fn info(&self) -> Value {
        self.state.lock().unwrap().info()
    }
}

impl Drop for SimulatedSensor {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn handle(state: &mut DeviceState, body: &[u8], behavior: &Behavior) -> Value {
    let request: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return error(Value::Null, -32700, "Parse error"),
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = match (request.get("jsonrpc"), request.get("method")) {
        (Some(Value::String(v)), Some(Value::String(m))) if v == "2.0" => m.clone(),
        _ => return error(id, -32600, "Invalid request"),
    };
    let params = request
        .get("params")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let result = match method.as_str() {
        "get_info" => Ok(state.info()),
        "get_reading" => Ok(json!(state.current_reading(behavior.stale_readings))),
        "get_methods" => Ok(json!([
            "get_info",
            "get_reading",
            "set_name",
            "set_reading_interval",
            "get_methods",
            "reset_to_factory",
            "update_firmware",
            "reboot"
        ])),
        "set_name" => set_name(state, &params),
        "set_reading_interval" => set_reading_interval(state, &params),
        "reset_to_factory" => {
            state.name = FACTORY_NAME.to_string();
            state.reading_interval = FACTORY_INTERVAL;
            go_offline(state, behavior.downtime);
            Ok(json!("resetting"))
        }
        "reboot" => {
            go_offline(state, behavior.downtime);
            Ok(json!("rebooting"))
        }
        "update_firmware" => {
            if state.firmware_version >= 15 {
                Ok(json!("already at latest firmware version"))
            } else {
                state.firmware_version += 1;
                go_offline(state, behavior.downtime);
                Ok(json!("updating"))
            }
        }
        _ => Err((-32601, "Method not found")),
    };

    match result {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err((code, message)) => error(id, code, message),
    }
}

fn set_name(state: &mut DeviceState, params: &Map<String, Value>) -> Result<Value, (i32, &'static str)> {
    match params.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {
            state.name = name.to_string();
            Ok(json!("ok"))
        }
        _ => Err((-32602, "Invalid params")),
    }
}

fn set_reading_interval(
    state: &mut DeviceState,
    params: &Map<String, Value>,
) -> Result<Value, (i32, &'static str)> {
    match params.get("interval").and_then(Value::as_u64) {
        Some(interval) if interval >= 1 => {
            state.reading_interval = interval;
            Ok(state.info())
        }
        _ => Err((-32602, "Invalid params")),
    }
}

fn go_offline(state: &mut DeviceState, downtime: Duration) {
    state.offline_until = Some(Instant::now() + downtime);
}

fn error(id: Value, code: i32, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}

/// Config for a port nothing listens on
pub fn unreachable_config() -> SensorConfig {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    SensorConfig::new("http://127.0.0.1", port)
        .with_pin(PIN)
        .with_request_timeout(Duration::from_secs(2))
}
