//! MACsec setup and teardown across the control links of a testbed.
//!
//! A control link joins a DUT port to a port on a neighbor device. Both
//! ends get the same profile; the neighbors alternate key-server priority
//! around the DUT's so that both election outcomes are covered.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use sonic_mgmt_common::{wait_until, Host};

use crate::error::{MacsecError, MacsecResult};
use crate::profile::{
    delete_macsec_profile, disable_macsec_port, enable_macsec_port, set_macsec_profile,
    MacsecProfile,
};

/// How long cleanup waits for MKA sessions to go away.
pub const MKA_CLEAR_TIMEOUT: Duration = Duration::from_secs(30);

const MKA_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Lists MACsec interfaces, one header line per interface.
pub const IP_MACSEC_SHOW: &str = "ip macsec show";

static MACSEC_IFACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+: ").expect("Invalid regex pattern"));

static FRONT_PANEL_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Ethernet(\d+)$").expect("Invalid regex pattern"));

static KERNEL_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^eth\d+$").expect("Invalid regex pattern"));

/// Neighbor end of a control link.
#[derive(Clone)]
pub struct CtrlLink {
    /// Neighbor device.
    pub host: Arc<dyn Host>,
    /// Neighbor port facing the DUT.
    pub port: String,
}

impl CtrlLink {
    pub fn new(host: Arc<dyn Host>, port: impl Into<String>) -> Self {
        Self {
            host,
            port: port.into(),
        }
    }
}

impl fmt::Debug for CtrlLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtrlLink")
            .field("host", &self.host.hostname())
            .field("port", &self.port)
            .finish()
    }
}

/// Control links keyed by DUT port, in link order.
pub type CtrlLinks = Vec<(String, CtrlLink)>;

/// Priority of the `k`-th neighbor given the DUT's priority.
pub fn neighbor_priority(default_priority: u32, k: usize) -> u32 {
    if k % 2 == 0 {
        default_priority.saturating_sub(1)
    } else {
        default_priority.saturating_add(1)
    }
}

/// Installs `profile` as `name` on the DUT and every neighbor and enables
/// it on both ends of each link.
///
/// The DUT keeps `profile.priority`; neighbors get
/// [`neighbor_priority`].
#[instrument(skip(dut, ctrl_links, profile), fields(dut = dut.hostname(), links = ctrl_links.len()))]
pub async fn setup_macsec_configuration<H: Host + ?Sized>(
    dut: &H,
    ctrl_links: &[(String, CtrlLink)],
    name: &str,
    profile: &MacsecProfile,
) -> MacsecResult<()> {
    set_macsec_profile(dut, name, profile).await?;

    for (k, (dut_port, nbr)) in ctrl_links.iter().enumerate() {
        enable_macsec_port(dut, dut_port, name).await?;

        let nbr_profile = profile.with_priority(neighbor_priority(profile.priority, k));
        set_macsec_profile(&*nbr.host, name, &nbr_profile).await?;
        enable_macsec_port(&*nbr.host, &nbr.port, name).await?;
    }

    info!(profile = name, "MACsec configured on all control links");
    Ok(())
}

/// Removes `name` from the DUT and every neighbor, then waits up to
/// `timeout` on each device for its MKA sessions to disappear.
#[instrument(skip(dut, ctrl_links), fields(dut = dut.hostname(), links = ctrl_links.len()))]
pub async fn cleanup_macsec_configuration<H: Host + ?Sized>(
    dut: &H,
    ctrl_links: &[(String, CtrlLink)],
    name: &str,
    timeout: Duration,
) -> MacsecResult<()> {
    let mut seen = BTreeSet::new();
    seen.insert(dut.hostname().to_string());
    let mut neighbors: Vec<&dyn Host> = Vec::new();

    for (dut_port, nbr) in ctrl_links {
        disable_macsec_port(dut, dut_port).await?;
        disable_macsec_port(&*nbr.host, &nbr.port).await?;
        delete_macsec_profile(&*nbr.host, name).await?;
        if seen.insert(nbr.host.hostname().to_string()) {
            neighbors.push(&*nbr.host);
        }
    }
    delete_macsec_profile(dut, name).await?;

    wait_mka_cleared(dut, timeout).await?;
    for nbr in neighbors {
        wait_mka_cleared(nbr, timeout).await?;
    }

    info!(profile = name, "MACsec removed from all control links");
    Ok(())
}

async fn wait_mka_cleared<H: Host + ?Sized>(host: &H, timeout: Duration) -> MacsecResult<()> {
    let cleared = wait_until(timeout, MKA_POLL_INTERVAL, Duration::ZERO, || async move {
        match mka_session_count(host).await {
            Ok(count) => count == 0,
            Err(e) => {
                warn!(host = host.hostname(), error = %e, "Failed to query MKA sessions");
                false
            }
        }
    })
    .await;

    if cleared {
        Ok(())
    } else {
        Err(MacsecError::MkaSessionsNotCleared {
            host: host.hostname().to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

/// Counts MACsec interfaces in `ip macsec show` output.
pub fn count_mka_sessions(output: &str) -> usize {
    output
        .lines()
        .filter(|line| MACSEC_IFACE_LINE.is_match(line))
        .count()
}

/// Number of MACsec interfaces currently up on `host`.
pub async fn mka_session_count<H: Host + ?Sized>(host: &H) -> MacsecResult<usize> {
    let result = host.shell(IP_MACSEC_SHOW).await?;
    let count = count_mka_sessions(result.stdout_text());
    debug!(host = host.hostname(), count, "MKA sessions");
    Ok(count)
}

/// Kernel interface behind a front-panel port of a virtual SONiC neighbor.
///
/// Follows the naming convention of the VS neighbor containers used on
/// control links, where the kernel netdev carries the port number:
/// `EthernetN` maps to `ethN`. This is a name rewrite, not a lookup on the
/// neighbor, so hardware neighbors with a different lane layout are not
/// covered. Names already in kernel form pass through.
pub fn get_eth_ifname(port: &str) -> MacsecResult<String> {
    if KERNEL_PORT.is_match(port) {
        return Ok(port.to_string());
    }
    FRONT_PANEL_PORT
        .captures(port)
        .map(|caps| format!("eth{}", &caps[1]))
        .ok_or_else(|| MacsecError::InvalidPortName(port.to_string()))
}

/// Brings the neighbor end of every control link up.
///
/// Links can be left down by an aborted fault-handling test.
pub async fn startup_all_ctrl_links(ctrl_links: &[(String, CtrlLink)]) -> MacsecResult<()> {
    for (_, nbr) in ctrl_links {
        let ifname = get_eth_ifname(&nbr.port)?;
        debug!(host = nbr.host.hostname(), ifname = %ifname, "Bringing control link up");
        nbr.host.shell(&format!("ifconfig {} up", ifname)).await?;
    }
    Ok(())
}
