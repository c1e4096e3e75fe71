//! Thermal control test support for SONiC platforms.
//!
//! - [`Mocker`] and its capability traits, implemented per vendor
//! - [`MockerRegistry`]: mocker type name to constructor
//! - [`MockerFactory`]: creates mockers for one test and tears them down
//! - daemon helpers for `thermalctld` in the `pmon` container
//! - [`ThermalPolicyFile`]: swap the thermal policy for the duration of a
//!   test
//!
//! # Example
//!
//! ```ignore
//! let registry = Arc::new(MockerRegistry::new().with(FAN_STATUS_MOCKER, |dut| {
//!     Arc::new(MlnxFanStatusMocker::new(dut)) as Arc<dyn Mocker>
//! }));
//! let factory = MockerFactory::new(registry);
//! let platform = platform_of(&*dut).await?;
//! if let Some(mocker) = factory.create(dut.clone(), &platform, FAN_STATUS_MOCKER)? {
//!     mocker.mock_data().await?;
//!     check_cli_output_with_mocker(&*dut, &*mocker, "show platform fan", Duration::from_secs(30)).await?;
//! }
//! factory.teardown().await?;
//! ```

pub mod checks;
pub mod daemon;
pub mod error;
pub mod factory;
pub mod mocker;
pub mod platform;
pub mod policy;
pub mod registry;

pub use checks::{check_cli_output_with_mocker, check_thermal_algorithm_status};
pub use daemon::{
    get_pmon_daemon_status, restart_thermal_control_daemon,
    restart_thermal_control_daemon_if_present, start_thermal_control_daemon,
    stop_thermal_control_daemon, DaemonStatus, DutFacts, THERMALCTLD,
};
pub use error::{MockerError, MockerResult};
pub use factory::{supports_platform, MockerFactory};
pub use mocker::{
    FanStatusMocker, Mocker, SingleFanMocker, ThermalStatusMocker, FAN_STATUS_MOCKER,
    SINGLE_FAN_MOCKER, THERMAL_STATUS_MOCKER,
};
pub use platform::platform_of;
pub use policy::{disable_thermal_policy, ThermalPolicyFile};
pub use registry::{MockerConstructor, MockerRegistry};
