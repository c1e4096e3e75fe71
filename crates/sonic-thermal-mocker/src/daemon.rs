//! Thermal control daemon handling inside the `pmon` container.
//!
//! `thermalctld` runs under supervisord. A healthy daemon shows at least
//! two processes: the main loop and its worker. Platform API calls can
//! spawn more.

use std::fmt;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use sonic_mgmt_common::{wait_until, Host};

use crate::error::{MockerError, MockerResult};

/// Thermal control daemon name.
pub const THERMALCTLD: &str = "thermalctld";

/// Minimum process count of a running `thermalctld`.
pub const MIN_THERMALCTLD_PROCESSES: usize = 2;

const FIND_THERMALCTLD_PID: &str = "docker exec -i pmon bash -c 'pgrep -f thermalctld' | sort";
const RESTART_THERMALCTLD: &str = "docker exec -i pmon bash -c 'supervisorctl restart thermalctld'";
const CONFIG_RELOAD: &str = "config reload -y";

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const STATUS_INTERVAL: Duration = Duration::from_secs(2);

static SUPERVISOR_PID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pid (\d+)").expect("Invalid regex pattern"));

/// Supervisord process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonStatus {
    Running,
    Stopped,
    Starting,
    Stopping,
    Exited,
    Backoff,
    Fatal,
    Unknown(String),
}

impl DaemonStatus {
    pub fn parse(text: &str) -> Self {
        match text {
            "RUNNING" => DaemonStatus::Running,
            "STOPPED" => DaemonStatus::Stopped,
            "STARTING" => DaemonStatus::Starting,
            "STOPPING" => DaemonStatus::Stopping,
            "EXITED" => DaemonStatus::Exited,
            "BACKOFF" => DaemonStatus::Backoff,
            "FATAL" => DaemonStatus::Fatal,
            other => DaemonStatus::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DaemonStatus::Running => "RUNNING",
            DaemonStatus::Stopped => "STOPPED",
            DaemonStatus::Starting => "STARTING",
            DaemonStatus::Stopping => "STOPPING",
            DaemonStatus::Exited => "EXITED",
            DaemonStatus::Backoff => "BACKOFF",
            DaemonStatus::Fatal => "FATAL",
            DaemonStatus::Unknown(s) => s.as_str(),
        };
        f.write_str(text)
    }
}

/// Parses one `supervisorctl status <daemon>` line.
///
/// ```text
/// thermalctld                      RUNNING   pid 101, uptime 0:10:00
/// ```
pub fn parse_supervisor_status(line: &str, daemon: &str) -> Option<(DaemonStatus, Option<u32>)> {
    let line = line.lines().find(|l| l.split_whitespace().next() == Some(daemon))?;
    let status = line.split_whitespace().nth(1)?;
    let pid = SUPERVISOR_PID
        .captures(line)
        .and_then(|caps| caps[1].parse().ok());
    Some((DaemonStatus::parse(status), pid))
}

/// Status and pid of `daemon` in `pmon`.
pub async fn get_pmon_daemon_status<H: Host + ?Sized>(
    dut: &H,
    daemon: &str,
) -> MockerResult<(DaemonStatus, Option<u32>)> {
    let cmd = format!("docker exec pmon supervisorctl status {}", daemon);
    // supervisorctl exits non-zero for anything but RUNNING.
    let result = dut.shell_unchecked(&cmd).await?;
    parse_supervisor_status(result.stdout_text(), daemon).ok_or_else(|| {
        MockerError::command_failed(dut.hostname(), cmd, result.failure_message())
    })
}

pub async fn start_pmon_daemon<H: Host + ?Sized>(dut: &H, daemon: &str) -> MockerResult<()> {
    dut.shell(&format!("docker exec pmon supervisorctl start {}", daemon))
        .await?;
    Ok(())
}

pub async fn stop_pmon_daemon<H: Host + ?Sized>(dut: &H, daemon: &str) -> MockerResult<()> {
    dut.shell(&format!("docker exec pmon supervisorctl stop {}", daemon))
        .await?;
    Ok(())
}

async fn check_thermalctld_processes<H: Host + ?Sized>(dut: &H) -> MockerResult<usize> {
    let result = dut.shell_unchecked(FIND_THERMALCTLD_PID).await?;
    if !result.succeeded() {
        return Err(MockerError::command_failed(
            dut.hostname(),
            FIND_THERMALCTLD_PID,
            result.failure_message(),
        ));
    }
    let found = result.lines().iter().filter(|l| !l.trim().is_empty()).count();
    if found < MIN_THERMALCTLD_PROCESSES {
        return Err(MockerError::TooFewProcesses {
            host: dut.hostname().to_string(),
            daemon: THERMALCTLD.to_string(),
            expected: MIN_THERMALCTLD_PROCESSES,
            found,
        });
    }
    Ok(found)
}

/// Facts about a DUT deciding whether `thermalctld` exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DutFacts {
    /// True on multi-ASIC platforms.
    pub multi_asic: bool,
    /// SONiC release, e.g. `202012`.
    pub sonic_release: Option<String>,
}

/// Releases whose multi-ASIC images ship without `thermalctld`.
const RELEASES_WITHOUT_MULTI_ASIC_THERMALCTLD: &[&str] = &["201911"];

impl DutFacts {
    pub fn new(multi_asic: bool, sonic_release: impl Into<String>) -> Self {
        Self {
            multi_asic,
            sonic_release: Some(sonic_release.into()),
        }
    }

    /// False when the image ships without `thermalctld`.
    pub fn has_thermal_control_daemon(&self) -> bool {
        !(self.multi_asic
            && self
                .sonic_release
                .as_deref()
                .is_some_and(|r| RELEASES_WITHOUT_MULTI_ASIC_THERMALCTLD.contains(&r)))
    }
}

/// Restarts `thermalctld` through supervisord.
///
/// When supervisord cannot restart it, the DUT configuration is reloaded
/// and [`MockerError::DaemonRestartFailed`] is returned.
///
/// [`Host`] carries no facts, so multi-ASIC 201911 images, which have no
/// `thermalctld`, are not detected here and fail the process check. Callers
/// that know the facts use [`restart_thermal_control_daemon_if_present`].
#[instrument(skip(dut), fields(host = dut.hostname()))]
pub async fn restart_thermal_control_daemon<H: Host + ?Sized>(dut: &H) -> MockerResult<()> {
    info!("Restarting thermal control daemon");
    check_thermalctld_processes(dut).await?;

    let result = dut.shell_unchecked(RESTART_THERMALCTLD).await?;
    if result.succeeded() {
        let found = check_thermalctld_processes(dut).await?;
        info!(processes = found, "thermalctld restarted");
        return Ok(());
    }

    error!(reason = %result.failure_message(), "thermalctld restart failed, reloading config");
    dut.shell(CONFIG_RELOAD).await?;
    Err(MockerError::DaemonRestartFailed {
        host: dut.hostname().to_string(),
        daemon: THERMALCTLD.to_string(),
    })
}

/// [`restart_thermal_control_daemon`] unless `facts` say the image has no
/// `thermalctld`. Returns whether a restart was attempted.
#[instrument(skip(dut, facts), fields(host = dut.hostname()))]
pub async fn restart_thermal_control_daemon_if_present<H: Host + ?Sized>(
    dut: &H,
    facts: &DutFacts,
) -> MockerResult<bool> {
    if !facts.has_thermal_control_daemon() {
        info!(release = ?facts.sonic_release, "thermalctld is not present, skipping restart");
        return Ok(false);
    }
    restart_thermal_control_daemon(dut).await?;
    Ok(true)
}

async fn ensure_status<H: Host + ?Sized>(dut: &H, expected: DaemonStatus) -> MockerResult<()> {
    let reached = wait_until(STATUS_TIMEOUT, STATUS_INTERVAL, Duration::ZERO, || {
        let expected = expected.clone();
        async move {
            match get_pmon_daemon_status(dut, THERMALCTLD).await {
                Ok((status, _)) => status == expected,
                Err(e) => {
                    warn!(error = %e, "Failed to read thermalctld status");
                    false
                }
            }
        }
    })
    .await;
    if reached {
        return Ok(());
    }

    let (actual, _) = get_pmon_daemon_status(dut, THERMALCTLD).await?;
    if actual == expected {
        Ok(())
    } else {
        Err(MockerError::UnexpectedDaemonStatus {
            host: dut.hostname().to_string(),
            daemon: THERMALCTLD.to_string(),
            expected,
            actual,
        })
    }
}

/// Starts `thermalctld` unless it already runs.
#[instrument(skip(dut), fields(host = dut.hostname()))]
pub async fn start_thermal_control_daemon<H: Host + ?Sized>(dut: &H) -> MockerResult<()> {
    let (status, _) = get_pmon_daemon_status(dut, THERMALCTLD).await?;
    if status != DaemonStatus::Running {
        start_pmon_daemon(dut, THERMALCTLD).await?;
    }
    ensure_status(dut, DaemonStatus::Running).await?;
    info!("thermalctld started");
    Ok(())
}

/// Stops `thermalctld` if it runs.
#[instrument(skip(dut), fields(host = dut.hostname()))]
pub async fn stop_thermal_control_daemon<H: Host + ?Sized>(dut: &H) -> MockerResult<()> {
    let (status, _) = get_pmon_daemon_status(dut, THERMALCTLD).await?;
    if status == DaemonStatus::Running {
        stop_pmon_daemon(dut, THERMALCTLD).await?;
    }
    ensure_status(dut, DaemonStatus::Stopped).await?;
    info!("thermalctld stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_mgmt_common::ModuleResult;
    use sonic_mgmt_test::platform_fixtures::supervisor_status;
    use sonic_mgmt_test::{CallVerifier, MockHost};

    #[test]
    fn test_parse_supervisor_status() {
        let line = supervisor_status(THERMALCTLD, "RUNNING");
        assert_eq!(
            parse_supervisor_status(&line, THERMALCTLD),
            Some((DaemonStatus::Running, Some(101)))
        );
        assert_eq!(
            parse_supervisor_status("thermalctld   STOPPED   Oct 18 10:00 AM", THERMALCTLD),
            Some((DaemonStatus::Stopped, None))
        );
        assert_eq!(parse_supervisor_status("", THERMALCTLD), None);
        assert_eq!(
            DaemonStatus::parse("WEIRD"),
            DaemonStatus::Unknown("WEIRD".to_string())
        );
        assert_eq!(DaemonStatus::Exited.to_string(), "EXITED");
    }

    fn pids(n: usize) -> ModuleResult {
        let out: Vec<String> = (0..n).map(|i| (100 + i).to_string()).collect();
        ModuleResult::from_stdout(out.join("\n"))
    }

    #[tokio::test]
    async fn test_restart_success() {
        let dut = MockHost::new("vlab-01");
        dut.on_command("pgrep -f thermalctld", pids(3));
        restart_thermal_control_daemon(&dut).await.unwrap();

        let verifier = CallVerifier::new(&dut);
        verifier.assert_command_run("supervisorctl restart thermalctld").unwrap();
        verifier.assert_command_not_run(CONFIG_RELOAD).unwrap();
    }

    #[tokio::test]
    async fn test_restart_too_few_processes() {
        let dut = MockHost::new("vlab-01");
        dut.on_command("pgrep -f thermalctld", pids(1));
        let err = restart_thermal_control_daemon(&dut).await.unwrap_err();
        assert!(matches!(err, MockerError::TooFewProcesses { found: 1, .. }));
        CallVerifier::new(&dut)
            .assert_command_not_run("supervisorctl restart")
            .unwrap();
    }

    #[tokio::test]
    async fn test_restart_failure_reloads_config() {
        let dut = MockHost::new("vlab-01");
        dut.on_command("pgrep -f thermalctld", pids(2))
            .on_command("supervisorctl restart", ModuleResult::failure("ERROR").with_rc(1));
        let err = restart_thermal_control_daemon(&dut).await.unwrap_err();
        assert!(matches!(err, MockerError::DaemonRestartFailed { .. }));
        CallVerifier::new(&dut).assert_command_run(CONFIG_RELOAD).unwrap();
    }

    #[test]
    fn test_dut_facts_thermalctld_presence() {
        assert!(DutFacts::default().has_thermal_control_daemon());
        assert!(DutFacts::new(false, "201911").has_thermal_control_daemon());
        assert!(DutFacts::new(true, "202012").has_thermal_control_daemon());
        assert!(!DutFacts::new(true, "201911").has_thermal_control_daemon());
    }

    #[tokio::test]
    async fn test_restart_skipped_on_multi_asic_201911() {
        let dut = MockHost::new("vlab-08");
        let restarted = restart_thermal_control_daemon_if_present(&dut, &DutFacts::new(true, "201911"))
            .await
            .unwrap();
        assert!(!restarted);
        assert!(dut.calls().is_empty());

        dut.on_command("pgrep -f thermalctld", pids(2));
        let restarted = restart_thermal_control_daemon_if_present(&dut, &DutFacts::new(true, "202012"))
            .await
            .unwrap();
        assert!(restarted);
        CallVerifier::new(&dut)
            .assert_command_run("supervisorctl restart thermalctld")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_daemon() {
        let dut = MockHost::new("vlab-01");
        dut.on_command(
            "supervisorctl status",
            ModuleResult::from_stdout(supervisor_status(THERMALCTLD, "STOPPED")),
        )
        .on_command(
            "supervisorctl status",
            ModuleResult::from_stdout(supervisor_status(THERMALCTLD, "RUNNING")),
        );
        start_thermal_control_daemon(&dut).await.unwrap();
        CallVerifier::new(&dut)
            .assert_command_run("supervisorctl start thermalctld")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_daemon_times_out() {
        let dut = MockHost::new("vlab-01");
        dut.on_command(
            "supervisorctl status",
            ModuleResult::from_stdout(supervisor_status(THERMALCTLD, "RUNNING")),
        );
        let err = stop_thermal_control_daemon(&dut).await.unwrap_err();
        match err {
            MockerError::UnexpectedDaemonStatus { expected, actual, .. } => {
                assert_eq!(expected, DaemonStatus::Stopped);
                assert_eq!(actual, DaemonStatus::Running);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_stop_already_stopped() {
        let dut = MockHost::new("vlab-01");
        dut.on_command(
            "supervisorctl status",
            ModuleResult::from_stdout(supervisor_status(THERMALCTLD, "STOPPED")),
        );
        stop_thermal_control_daemon(&dut).await.unwrap();
        CallVerifier::new(&dut)
            .assert_command_not_run("supervisorctl stop")
            .unwrap();
    }
}
