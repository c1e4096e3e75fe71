//! Mocker factory, CLI checks and policy file handling against a scripted
//! DUT.
//!
//! The mockers here stand in for a vendor package: a fan status mocker
//! that "sets" every fan to a fixed speed and a thermal status mocker that
//! reports a fixed algorithm state.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use sonic_mgmt_common::{Host, ModuleResult, ShowRow};
use sonic_mgmt_test::platform_fixtures::show_platform_fan;
use sonic_mgmt_test::{CallVerifier, MockHost};
use sonic_thermal_mocker::{
    check_cli_output_with_mocker, check_thermal_algorithm_status, disable_thermal_policy,
    FanStatusMocker, Mocker, MockerError, MockerFactory, MockerRegistry, MockerResult,
    ThermalPolicyFile, ThermalStatusMocker, FAN_STATUS_MOCKER, SINGLE_FAN_MOCKER,
    THERMAL_STATUS_MOCKER,
};

const MLNX: &str = "x86_64-mlnx_msn2700-r0";
const SHOW_FAN: &str = "show platform fan";

struct FakeFanMocker {
    dut: Arc<dyn Host>,
    speed: &'static str,
    deinits: Arc<AtomicUsize>,
    fail_deinit: bool,
}

#[async_trait]
impl Mocker for FakeFanMocker {
    async fn mock_data(&self) -> MockerResult<()> {
        self.dut
            .shell(&format!("echo {} > /run/hw-management/thermal/fan1_speed_set", self.speed))
            .await?;
        Ok(())
    }

    async fn check_result(&self, actual: &[ShowRow]) -> MockerResult<bool> {
        Ok(actual
            .iter()
            .all(|row| row.get("speed").map(String::as_str) == Some(self.speed)))
    }

    async fn deinit(&self) -> MockerResult<()> {
        self.deinits.fetch_add(1, Ordering::SeqCst);
        if self.fail_deinit {
            return Err(MockerError::mocker(FAN_STATUS_MOCKER, "cannot restore fan speed"));
        }
        Ok(())
    }

    fn as_fan_status(&self) -> Option<&dyn FanStatusMocker> {
        Some(self)
    }
}

#[async_trait]
impl FanStatusMocker for FakeFanMocker {
    async fn check_all_fan_speed(&self, expected_speed: u8) -> MockerResult<bool> {
        Ok(self.speed == format!("{}%", expected_speed))
    }
}

struct FakeThermalMocker {
    enabled: bool,
}

#[async_trait]
impl Mocker for FakeThermalMocker {
    async fn check_result(&self, _actual: &[ShowRow]) -> MockerResult<bool> {
        Ok(true)
    }

    fn as_thermal_status(&self) -> Option<&dyn ThermalStatusMocker> {
        Some(self)
    }
}

#[async_trait]
impl ThermalStatusMocker for FakeThermalMocker {
    async fn check_thermal_algorithm_status(&self, expected: bool) -> MockerResult<bool> {
        Ok(self.enabled == expected)
    }
}

fn registry(deinits: &Arc<AtomicUsize>, fail_deinit: bool) -> Arc<MockerRegistry> {
    let deinits = Arc::clone(deinits);
    Arc::new(
        MockerRegistry::new()
            .with(FAN_STATUS_MOCKER, move |dut| {
                Arc::new(FakeFanMocker {
                    dut,
                    speed: "60%",
                    deinits: Arc::clone(&deinits),
                    fail_deinit,
                }) as Arc<dyn Mocker>
            })
            .with(THERMAL_STATUS_MOCKER, |_| {
                Arc::new(FakeThermalMocker { enabled: true }) as Arc<dyn Mocker>
            }),
    )
}

fn dut() -> Arc<MockHost> {
    Arc::new(MockHost::new("vlab-01"))
}

#[test]
fn test_unsupported_platform() {
    let factory = MockerFactory::new(registry(&Arc::new(AtomicUsize::new(0)), false));
    let err = factory
        .create(dut(), "x86_64-kvm_x86_64-r0", FAN_STATUS_MOCKER)
        .err()
        .unwrap();
    assert!(matches!(err, MockerError::UnsupportedPlatform(_)));
    assert!(err.is_skip());
}

#[test]
fn test_unregistered_mocker_type() {
    let factory = MockerFactory::new(registry(&Arc::new(AtomicUsize::new(0)), false));
    assert!(factory.create(dut(), MLNX, SINGLE_FAN_MOCKER).unwrap().is_none());
    assert_eq!(factory.active(), 0);
}

/// Mocked fan speed shows up in `show platform fan`.
#[tokio::test(start_paused = true)]
async fn test_cli_output_matches_mock() {
    let dut = dut();
    dut.on_command(
        SHOW_FAN,
        ModuleResult::from_stdout(show_platform_fan(&[
            ("drawer1", "fan1", "60%", "OK"),
            ("drawer2", "fan2", "60%", "OK"),
        ])),
    );
    let factory = MockerFactory::new(registry(&Arc::new(AtomicUsize::new(0)), false));
    let mocker = factory.create(dut.clone(), MLNX, FAN_STATUS_MOCKER).unwrap().unwrap();

    mocker.mock_data().await.unwrap();
    check_cli_output_with_mocker(&*dut, &*mocker, SHOW_FAN, Duration::from_secs(30))
        .await
        .unwrap();

    let fan = mocker.as_fan_status().unwrap();
    assert!(fan.check_all_fan_speed(60).await.unwrap());
    assert!(mocker.as_thermal_status().is_none());
    CallVerifier::new(&dut).assert_command_run("fan1_speed_set").unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cli_output_mismatch_and_empty() {
    let dut = dut();
    dut.on_command(
        SHOW_FAN,
        ModuleResult::from_stdout(show_platform_fan(&[("drawer1", "fan1", "40%", "OK")])),
    )
    .on_command(SHOW_FAN, ModuleResult::from_stdout(""));
    let factory = MockerFactory::new(registry(&Arc::new(AtomicUsize::new(0)), false));
    let mocker = factory.create(dut.clone(), MLNX, FAN_STATUS_MOCKER).unwrap().unwrap();

    let err = check_cli_output_with_mocker(&*dut, &*mocker, SHOW_FAN, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, MockerError::MockMismatch { .. }));

    let err = check_cli_output_with_mocker(&*dut, &*mocker, SHOW_FAN, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, MockerError::EmptyOutput { .. }));
}

/// Every mocker is deinitialized even when one of them fails.
#[tokio::test]
async fn test_teardown_reports_first_failure() {
    let deinits = Arc::new(AtomicUsize::new(0));
    let factory = MockerFactory::new(registry(&deinits, true));
    factory.create(dut(), MLNX, FAN_STATUS_MOCKER).unwrap();
    factory.create(dut(), MLNX, FAN_STATUS_MOCKER).unwrap();
    assert_eq!(factory.active(), 2);

    let err = factory.teardown().await.unwrap_err();
    assert!(matches!(err, MockerError::Mocker { .. }));
    assert_eq!(deinits.load(Ordering::SeqCst), 2);
    assert_eq!(factory.active(), 0);

    // Nothing left to tear down.
    factory.teardown().await.unwrap();
}

#[tokio::test]
async fn test_thermal_algorithm_status() {
    let factory = MockerFactory::new(registry(&Arc::new(AtomicUsize::new(0)), false));
    assert!(check_thermal_algorithm_status(dut(), MLNX, &factory, true).await.unwrap());
    assert!(!check_thermal_algorithm_status(dut(), MLNX, &factory, false).await.unwrap());

    let bare = MockerFactory::new(Arc::new(MockerRegistry::new()));
    assert!(check_thermal_algorithm_status(dut(), MLNX, &bare, false).await.unwrap());
}

fn stat(exists: bool) -> ModuleResult {
    ModuleResult::from_stdout("").with_extra("stat", json!({ "exists": exists }))
}

fn thermalctld_running(dut: &MockHost) {
    dut.on_command("pgrep -f thermalctld", ModuleResult::from_stdout("101\n102"));
}

/// The original policy is moved aside and put back afterwards.
#[tokio::test]
async fn test_policy_file_install_and_restore() {
    let dut = MockHost::new("vlab-01");
    dut.on_args("stat", "thermal_policy.json.bak", stat(true))
        .on_module("stat", stat(true));
    thermalctld_running(&dut);

    let policy = disable_thermal_policy(&dut, MLNX, Path::new("/var/tests/files"))
        .await
        .unwrap();
    assert_eq!(
        policy.path(),
        "/usr/share/sonic/device/x86_64-mlnx_msn2700-r0/thermal_policy.json"
    );

    let copies = dut.calls_of("copy");
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].args["src"], "/var/tests/files/invalid_format_policy.json");
    assert_eq!(copies[0].args["dest"], policy.path());

    policy.restore().await.unwrap();

    let verifier = CallVerifier::new(&dut);
    verifier
        .assert_command_run(
            "mv -f /usr/share/sonic/device/x86_64-mlnx_msn2700-r0/thermal_policy.json \
             /usr/share/sonic/device/x86_64-mlnx_msn2700-r0/thermal_policy.json.bak",
        )
        .unwrap();
    verifier
        .assert_command_run(
            "mv -f /usr/share/sonic/device/x86_64-mlnx_msn2700-r0/thermal_policy.json.bak \
             /usr/share/sonic/device/x86_64-mlnx_msn2700-r0/thermal_policy.json",
        )
        .unwrap();
    let restarts = dut
        .commands()
        .iter()
        .filter(|c| c.contains("supervisorctl restart thermalctld"))
        .count();
    assert_eq!(restarts, 2);
}

/// Without an original policy there is nothing to back up or restore.
#[tokio::test]
async fn test_policy_file_without_original() {
    let dut = MockHost::new("vlab-01");
    dut.on_module("stat", stat(false));
    thermalctld_running(&dut);

    let policy = ThermalPolicyFile::install(&dut, MLNX, Path::new("/tmp/valid_policy.json"))
        .await
        .unwrap();
    policy.restore().await.unwrap();

    let verifier = CallVerifier::new(&dut);
    verifier.assert_command_not_run("mv -f").unwrap();
    let restarts = dut
        .commands()
        .iter()
        .filter(|c| c.contains("supervisorctl restart thermalctld"))
        .count();
    assert_eq!(restarts, 1);
}
