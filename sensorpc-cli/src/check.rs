//! End to end sanity scenario
//!
//! Renames the sensor, changes its reading interval, verifies both through
//! `get_info`, takes a reading, checks that readings move once per
//! interval and finally restores factory settings so the device is left as
//! it was found.

use anyhow::{ensure, Context, Result};
use sensorpc_client::SensorClient;
use std::time::Duration;

const CHECK_NAME: &str = "sensor-check";
const CHECK_INTERVAL: u64 = 5;

/// Interval used by the reading refresh step of [`run`]
pub const REFRESH_INTERVAL: u64 = 1;

/// Run the scenario; the first failed step aborts it
pub async fn run(client: &SensorClient) -> Result<()> {
    client
        .set_name(CHECK_NAME)
        .await
        .context("set_name failed")?;

    let updated = client
        .set_reading_interval(CHECK_INTERVAL)
        .await
        .context("set_reading_interval failed")?;
    ensure!(
        updated.reading_interval() == CHECK_INTERVAL,
        "set_reading_interval answered with interval {}",
        updated.reading_interval()
    );

    // Field types and ranges are checked while parsing
    let info = client.get_info().await.context("get_info failed")?;
    ensure!(
        info.name() == CHECK_NAME,
        "Sensor name was not updated, got {:?}",
        info.name()
    );
    ensure!(
        info.reading_interval() == CHECK_INTERVAL,
        "Sensor reading interval was not updated, got {}",
        info.reading_interval()
    );
    tracing::info!(
        hid = info.hid(),
        model = info.model(),
        firmware = %info.firmware_version(),
        "Sensor info verified"
    );

    let reading = client
        .get_reading()
        .await
        .context("Sensor doesn't seem to register temperature")?;
    tracing::info!(reading, "Reading taken");

    reading_interval(client, REFRESH_INTERVAL).await?;

    let restored = client
        .convergence()
        .reset_to_factory()
        .await
        .context("reset_to_factory failed")?;

    println!("Sanity check passed ({} is back to factory settings)", restored.name());
    Ok(())
}

/// Set the reading interval and require a fresh reading one interval later
pub async fn reading_interval(client: &SensorClient, seconds: u64) -> Result<()> {
    ensure!(seconds >= 1, "Reading interval must be at least one second");

    let updated = client
        .set_reading_interval(seconds)
        .await
        .context("set_reading_interval failed")?;
    ensure!(
        updated.reading_interval() == seconds,
        "Sensor reading interval was not updated, expected {} got {}",
        seconds,
        updated.reading_interval()
    );

    let before = client.get_reading().await.context("get_reading failed")?;
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    let after = client.get_reading().await.context("get_reading failed")?;

    ensure!(
        before != after,
        "Sensor readings after {} seconds of waiting are equal to readings before waiting",
        seconds
    );
    tracing::info!(before, after, seconds, "Reading refreshed within its interval");
    Ok(())
}
