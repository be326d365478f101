//! Device mutations that take effect in the background
//!
//! `reset_to_factory`, `reboot` and `update_firmware` are acknowledged
//! immediately but applied afterwards, and the device stops answering while
//! it restarts. [`Convergence`] sends the mutation, checks the
//! acknowledgement literal and then polls `get_info` until the device
//! reports the expected state.
//!
//! Running out of attempts is [`Error::ConvergenceTimeout`]. A device that
//! comes back in the wrong state is [`Error::StateDrift`] or
//! [`Error::FirmwareMismatch`].

use crate::poll::{poll, PollOutcome, RetrySpec};
use crate::SensorClient;
use sensorpc_core::{Error, FirmwareVersion, Result, SensorInfo, SensorMethod};
use serde_json::Value;

/// Acknowledgement to `reset_to_factory`
pub const RESET_ACK: &str = "resetting";
/// Acknowledgement to `reboot`
pub const REBOOT_ACK: &str = "rebooting";
/// Acknowledgement to `update_firmware` at the newest version
pub const ALREADY_LATEST_ACK: &str = "already at latest firmware version";

/// What a firmware update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareUpdate {
    /// Moved one step up the chain
    Updated {
        /// Version before the update
        from: FirmwareVersion,
        /// Version after the update
        to: FirmwareVersion,
    },
    /// Nothing to do
    AlreadyLatest {
        /// Current (maximum) version
        version: FirmwareVersion,
    },
}

/// Convergence checks over a borrowed client
pub struct Convergence<'a> {
    client: &'a SensorClient,
    retry: RetrySpec,
}

impl<'a> Convergence<'a> {
    /// Use `retry` for every wait
    pub fn new(client: &'a SensorClient, retry: RetrySpec) -> Self {
        Self { client, retry }
    }

    /// Override the poll budget
    pub fn with_retry(mut self, retry: RetrySpec) -> Self {
        self.retry = retry;
        self
    }

    /// Restore factory settings and wait for the device to come back
    #[tracing::instrument(skip(self))]
    pub async fn reset_to_factory(&self) -> Result<SensorInfo> {
        self.acknowledge(SensorMethod::ResetToFactory, RESET_ACK).await?;
        let info = self.wait_for_info("reset_to_factory", |_| true).await?;
        tracing::info!(name = info.name(), "Sensor reset to factory settings");
        Ok(info)
    }

    /// Restart the device and require that it comes back unchanged
    #[tracing::instrument(skip(self))]
    pub async fn reboot(&self) -> Result<SensorInfo> {
        let before = self.client.get_info().await?;

        self.acknowledge(SensorMethod::Reboot, REBOOT_ACK).await?;
        let after = self.wait_for_info("reboot", |_| true).await?;

        if after != before {
            return Err(Error::StateDrift {
                operation: "reboot".to_string(),
                before: Box::new(before),
                after: Box::new(after),
            });
        }

        tracing::info!("Sensor rebooted");
        Ok(after)
    }

    /// Move the firmware one version up, or confirm it is already at the top
    #[tracing::instrument(skip(self))]
    pub async fn update_firmware(&self) -> Result<FirmwareUpdate> {
        let before = self.client.get_info().await?.firmware_version();
        let ack = self.client.call(SensorMethod::UpdateFirmware, None).await?;

        if before.is_latest() {
            expect_ack(SensorMethod::UpdateFirmware, ALREADY_LATEST_ACK, &ack)?;

            let after = self
                .wait_for_info("update_firmware", |_| true)
                .await?
                .firmware_version();
            if after != before {
                return Err(Error::FirmwareMismatch {
                    before: before.get(),
                    after: after.get(),
                    expected: before.get(),
                });
            }

            tracing::info!(version = %before, "Firmware already at latest version");
            return Ok(FirmwareUpdate::AlreadyLatest { version: before });
        }

        if ack.as_str() == Some(ALREADY_LATEST_ACK) {
            return Err(Error::UnexpectedAcknowledgement {
                method: SensorMethod::UpdateFirmware.as_str().to_string(),
                expected: format!(
                    "an update acknowledgement below version {}",
                    FirmwareVersion::MAX
                ),
                actual: ack,
            });
        }

        let after = self
            .wait_for_info("update_firmware", |info| info.firmware_version() > before)
            .await?
            .firmware_version();

        match before.next() {
            Some(expected) if expected == after => {
                tracing::info!(from = %before, to = %after, "Firmware updated");
                Ok(FirmwareUpdate::Updated { from: before, to: after })
            }
            expected => Err(Error::FirmwareMismatch {
                before: before.get(),
                after: after.get(),
                expected: expected.unwrap_or(before).get(),
            }),
        }
    }

    /// Update until the device reports the newest firmware
    ///
    /// Returns every step taken, ending with `AlreadyLatest`.
    pub async fn update_to_latest(&self) -> Result<Vec<FirmwareUpdate>> {
        let max_steps = usize::from(FirmwareVersion::MAX.get() - FirmwareVersion::MIN.get()) + 1;
        let mut steps = Vec::new();

        for _ in 0..max_steps {
            let step = self.update_firmware().await?;
            steps.push(step);
            if matches!(step, FirmwareUpdate::AlreadyLatest { .. }) {
                return Ok(steps);
            }
        }

        // Every update moved up, yet the device never reported the top version
        Err(Error::ConvergenceTimeout {
            operation: "update_to_latest".to_string(),
            attempts: max_steps as u32,
        })
    }

    /// Reset the device if it no longer matches `expected`
    ///
    /// Returns `false` when no reset was needed.
    #[tracing::instrument(skip(self, expected))]
    pub async fn ensure_state(&self, expected: &SensorInfo) -> Result<bool> {
        let current = self.client.get_info().await?;
        if &current == expected {
            return Ok(false);
        }

        tracing::warn!(?current, ?expected, "Sensor state drifted, resetting to factory");
        let restored = self.reset_to_factory().await?;

        if &restored != expected {
            return Err(Error::StateDrift {
                operation: "ensure_state".to_string(),
                before: Box::new(expected.clone()),
                after: Box::new(restored),
            });
        }

        Ok(true)
    }

    async fn acknowledge(&self, method: SensorMethod, expected: &str) -> Result<()> {
        let ack = self.client.call(method, None).await?;
        expect_ack(method, expected, &ack)
    }

    async fn wait_for_info<P>(&self, operation: &'static str, predicate: P) -> Result<SensorInfo>
    where
        P: FnMut(&SensorInfo) -> bool,
    {
        let client = self.client;
        let outcome = poll(&self.retry, || client.get_info(), predicate).await;

        if let Some(ref m) = client.metrics {
            m.record_convergence(operation, outcome.is_found(), outcome.attempts());
        }

        match outcome {
            PollOutcome::Found { value, attempts } => {
                tracing::debug!(operation, attempts, "Sensor converged");
                Ok(value)
            }
            PollOutcome::NotFound { attempts } => Err(Error::ConvergenceTimeout {
                operation: operation.to_string(),
                attempts,
            }),
        }
    }
}

fn expect_ack(method: SensorMethod, expected: &str, actual: &Value) -> Result<()> {
    if actual.as_str() == Some(expected) {
        Ok(())
    } else {
        Err(Error::UnexpectedAcknowledgement {
            method: method.as_str().to_string(),
            expected: expected.to_string(),
            actual: actual.clone(),
        })
    }
}
