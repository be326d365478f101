//! sensor-check - talk to a networked sensor from the command line
//!
//! Wraps the sensorpc client in one subcommand per device operation, plus a
//! `check` command that runs the end to end sanity scenario.
//!
//! # Usage
//!
//! ```bash
//! # Describe the sensor on the default address
//! sensor-check info
//!
//! # Another device, pin from the environment
//! SENSOR_PIN=1234 sensor-check --sensor-host http://10.0.0.7 --sensor-port 9000 reading
//!
//! # Bring the firmware all the way up
//! sensor-check update-firmware --to-latest
//!
//! # Sanity scenario, exporting spans and metrics over OTLP
//! sensor-check --otlp check
//!
//! # Readings must refresh once per interval
//! sensor-check interval-check --seconds 2
//! ```
//!
//! Exits non-zero on any error.

mod check;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensorpc_client::{ClientBuilder, FirmwareUpdate, RetrySpec, SensorClient};
use sensorpc_core::config::{DEFAULT_HOST, DEFAULT_PIN, DEFAULT_PORT};
use sensorpc_core::{ObservabilityConfig, SensorConfig, SensorInfo};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Query and exercise a JSON-RPC sensor", long_about = None)]
struct Args {
    /// Sensor host, including the scheme
    #[arg(long, env = "SENSOR_HOST", default_value = DEFAULT_HOST)]
    sensor_host: String,

    /// Sensor port
    #[arg(long, env = "SENSOR_PORT", default_value_t = DEFAULT_PORT)]
    sensor_port: u16,

    /// Pin sent in the Authorization header
    #[arg(long, env = "SENSOR_PIN", default_value = DEFAULT_PIN)]
    sensor_pin: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Export traces and metrics over OTLP
    #[arg(long)]
    otlp: bool,

    /// Attempts spent waiting for the sensor after reset, reboot or update
    #[arg(long, default_value_t = sensorpc_client::DEFAULT_MAX_ATTEMPTS)]
    attempts: u32,

    /// Pause between those attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sensor description
    Info,
    /// Take a temperature reading
    Reading,
    /// List the methods the sensor supports
    Methods,
    /// Rename the sensor
    SetName {
        /// New name
        name: String,
    },
    /// Change the reading interval
    SetInterval {
        /// Interval in seconds
        seconds: u64,
    },
    /// Restore factory settings and wait for the sensor to come back
    Reset,
    /// Reboot and verify the sensor comes back unchanged
    Reboot,
    /// Update the firmware by one version
    UpdateFirmware {
        /// Keep updating until the latest version
        #[arg(long)]
        to_latest: bool,
    },
    /// Run the sanity scenario
    Check,
    /// Set the reading interval and verify readings refresh after it
    IntervalCheck {
        /// Interval in seconds
        #[arg(long, default_value_t = check::REFRESH_INTERVAL)]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let observability = ObservabilityConfig::new("sensor-check")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_log_level(args.log_level.clone())
        .with_json_logs(args.json_logs)
        .with_traces(args.otlp)
        .with_metrics(args.otlp);

    let config =
        SensorConfig::new(args.sensor_host.clone(), args.sensor_port).with_pin(args.sensor_pin.clone());

    let client = ClientBuilder::new(config)
        .with_retry(RetrySpec::new(
            args.attempts,
            Duration::from_millis(args.interval_ms),
        ))
        .with_observability(observability)
        .build()
        .context("Failed to create sensor client")?;

    let result = run(&client, args.command).await;
    sensorpc_core::shutdown_observability();
    result
}

async fn run(client: &SensorClient, command: Command) -> Result<()> {
    match command {
        Command::Info => print_info(&client.get_info().await?),
        Command::Reading => println!("{}", client.get_reading().await?),
        Command::Methods => {
            for method in client.get_methods().await? {
                println!("{}", method);
            }
        }
        Command::SetName { name } => {
            let ack = client.set_name(&name).await?;
            println!("{}", ack);
        }
        Command::SetInterval { seconds } => print_info(&client.set_reading_interval(seconds).await?),
        Command::Reset => print_info(&client.convergence().reset_to_factory().await?),
        Command::Reboot => print_info(&client.convergence().reboot().await?),
        Command::UpdateFirmware { to_latest } => {
            let steps = if to_latest {
                client.convergence().update_to_latest().await?
            } else {
                vec![client.convergence().update_firmware().await?]
            };
            for step in steps {
                match step {
                    FirmwareUpdate::Updated { from, to } => println!("firmware {} -> {}", from, to),
                    FirmwareUpdate::AlreadyLatest { version } => {
                        println!("firmware {} is already the latest", version)
                    }
                }
            }
        }
        Command::Check => check::run(client).await?,
        Command::IntervalCheck { seconds } => {
            check::reading_interval(client, seconds).await?;
            println!("Readings refresh every {} seconds", seconds);
        }
    }
    Ok(())
}

fn print_info(info: &SensorInfo) {
    match serde_json::to_string_pretty(info) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{:?}", info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["sensor-check", "info"]).unwrap();
        assert_eq!(args.sensor_port, DEFAULT_PORT);
        assert_eq!(args.attempts, 15);
        assert!(matches!(args.command, Command::Info));
    }

    #[test]
    fn test_args_subcommands() {
        let args = Args::try_parse_from([
            "sensor-check",
            "--sensor-host",
            "http://10.0.0.7",
            "--sensor-port",
            "9000",
            "update-firmware",
            "--to-latest",
        ])
        .unwrap();
        assert_eq!(args.sensor_host, "http://10.0.0.7");
        assert_eq!(args.sensor_port, 9000);
        assert!(matches!(args.command, Command::UpdateFirmware { to_latest: true }));

        let args = Args::try_parse_from(["sensor-check", "set-interval", "5"]).unwrap();
        assert!(matches!(args.command, Command::SetInterval { seconds: 5 }));

        let args = Args::try_parse_from(["sensor-check", "interval-check"]).unwrap();
        assert!(matches!(args.command, Command::IntervalCheck { seconds: 1 }));

        let args =
            Args::try_parse_from(["sensor-check", "interval-check", "--seconds", "3"]).unwrap();
        assert!(matches!(args.command, Command::IntervalCheck { seconds: 3 }));
    }

    #[test]
    fn test_args_reject_missing_command() {
        assert!(Args::try_parse_from(["sensor-check"]).is_err());
    }
}
