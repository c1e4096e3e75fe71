//! Mocker traits.
//!
//! A mocker replaces the thermal or fan data a platform reports, so that
//! thermal-control behavior can be checked without touching the hardware.
//! Vendors implement [`Mocker`] plus whichever capability sub-traits their
//! platform supports, and expose them through the `as_*` accessors.

use async_trait::async_trait;

use sonic_mgmt_common::ShowRow;

use crate::error::MockerResult;

/// Registry name of fan status mockers.
pub const FAN_STATUS_MOCKER: &str = "FanStatusMocker";

/// Registry name of single fan mockers.
pub const SINGLE_FAN_MOCKER: &str = "SingleFanMocker";

/// Registry name of thermal status mockers.
pub const THERMAL_STATUS_MOCKER: &str = "ThermalStatusMocker";

/// Base interface of every mocker.
#[async_trait]
pub trait Mocker: Send + Sync {
    /// Writes the mocked data to the DUT.
    async fn mock_data(&self) -> MockerResult<()> {
        Ok(())
    }

    /// Compares parsed CLI rows with the mocked data.
    async fn check_result(&self, actual: &[ShowRow]) -> MockerResult<bool>;

    /// Undoes everything the mocker changed on the DUT.
    async fn deinit(&self) -> MockerResult<()> {
        Ok(())
    }

    fn as_fan_status(&self) -> Option<&dyn FanStatusMocker> {
        None
    }

    fn as_single_fan(&self) -> Option<&dyn SingleFanMocker> {
        None
    }

    fn as_thermal_status(&self) -> Option<&dyn ThermalStatusMocker> {
        None
    }
}

/// Mocks speed and presence of all fans.
#[async_trait]
pub trait FanStatusMocker: Mocker {
    /// True if every fan runs at `expected_speed` percent.
    async fn check_all_fan_speed(&self, expected_speed: u8) -> MockerResult<bool>;
}

/// Mocks one fan.
#[async_trait]
pub trait SingleFanMocker: Mocker {
    fn is_fan_removable(&self) -> bool;

    /// Present and at normal speed.
    async fn mock_normal(&self) -> MockerResult<()>;

    async fn mock_absence(&self) -> MockerResult<()>;

    async fn mock_presence(&self) -> MockerResult<()>;

    /// `good == false` marks the fan faulty.
    async fn mock_status(&self, good: bool) -> MockerResult<()>;

    async fn mock_normal_speed(&self) -> MockerResult<()>;

    /// Slower than target, beyond the speed tolerance.
    async fn mock_under_speed(&self) -> MockerResult<()>;

    /// Faster than target, beyond the speed tolerance.
    async fn mock_over_speed(&self) -> MockerResult<()>;
}

/// Mocks temperatures and thresholds.
#[async_trait]
pub trait ThermalStatusMocker: Mocker {
    /// True if the thermal control algorithm is enabled exactly when
    /// `expected` is.
    async fn check_thermal_algorithm_status(&self, expected: bool) -> MockerResult<bool>;
}
