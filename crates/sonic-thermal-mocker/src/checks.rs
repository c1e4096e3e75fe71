//! Checks of CLI output and thermal algorithm state against mockers.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use sonic_mgmt_common::Host;

use crate::error::{MockerError, MockerResult};
use crate::factory::MockerFactory;
use crate::mocker::{Mocker, THERMAL_STATUS_MOCKER};

/// Waits `max_wait`, runs `command` and checks its table against `mocker`.
pub async fn check_cli_output_with_mocker<H: Host + ?Sized>(
    dut: &H,
    mocker: &dyn Mocker,
    command: &str,
    max_wait: Duration,
) -> MockerResult<()> {
    debug!(host = dut.hostname(), command, wait_secs = max_wait.as_secs(), "Waiting for mocked data");
    sleep(max_wait).await;

    let rows = dut.show_and_parse(command).await?;
    if rows.is_empty() {
        return Err(MockerError::EmptyOutput {
            command: command.to_string(),
        });
    }
    if !mocker.check_result(&rows).await? {
        return Err(MockerError::MockMismatch {
            command: command.to_string(),
        });
    }
    Ok(())
}

/// Checks the thermal control algorithm state through a
/// `ThermalStatusMocker`.
///
/// Returns true when the platform provides no such mocker.
pub async fn check_thermal_algorithm_status(
    dut: Arc<dyn Host>,
    platform: &str,
    factory: &MockerFactory,
    expected: bool,
) -> MockerResult<bool> {
    let Some(mocker) = factory.create(dut, platform, THERMAL_STATUS_MOCKER)? else {
        info!(platform, "No thermal status mocker, skipping algorithm check");
        return Ok(true);
    };
    match mocker.as_thermal_status() {
        Some(thermal) => thermal.check_thermal_algorithm_status(expected).await,
        None => Ok(true),
    }
}
