//! Temporary replacement of the thermal control policy file.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use sonic_mgmt_common::Host;

use crate::daemon::restart_thermal_control_daemon;
use crate::error::{MockerError, MockerResult};

/// Policy file that makes `thermalctld` disable its policies.
pub const INVALID_POLICY_FILE: &str = "invalid_format_policy.json";

/// Location of the thermal policy of `platform` on the DUT.
pub fn policy_path(platform: &str) -> String {
    format!("/usr/share/sonic/device/{}/thermal_policy.json", platform)
}

/// Location of the backup made by [`ThermalPolicyFile::install`].
pub fn backup_path(platform: &str) -> String {
    format!("{}.bak", policy_path(platform))
}

/// An installed replacement policy file.
///
/// [`ThermalPolicyFile::restore`] puts the original back.
#[derive(Debug)]
pub struct ThermalPolicyFile<'a, H: Host + ?Sized> {
    dut: &'a H,
    path: String,
    backup: String,
}

impl<'a, H: Host + ?Sized> ThermalPolicyFile<'a, H> {
    /// Backs up the DUT policy of `platform`, copies `src` in its place and
    /// restarts `thermalctld`.
    pub async fn install(dut: &'a H, platform: &str, src: &Path) -> MockerResult<Self> {
        let file = Self {
            dut,
            path: policy_path(platform),
            backup: backup_path(platform),
        };

        if dut.path_exists(&file.path).await? {
            dut.command(&format!("mv -f {} {}", file.path, file.backup))
                .await?;
        } else {
            warn!(host = dut.hostname(), path = %file.path, "Thermal policy file not found");
        }

        let src = src.to_str().ok_or_else(|| {
            MockerError::command_failed(dut.hostname(), "copy", format!("non UTF-8 path {:?}", src))
        })?;
        dut.copy(src, &file.path).await?;
        info!(host = dut.hostname(), src, dest = %file.path, "Installed thermal policy");

        restart_thermal_control_daemon(dut).await?;
        Ok(file)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Moves the backup back and restarts `thermalctld`.
    ///
    /// Nothing happens when no backup was made.
    pub async fn restore(self) -> MockerResult<()> {
        if !self.dut.path_exists(&self.backup).await? {
            return Ok(());
        }
        self.dut
            .command(&format!("mv -f {} {}", self.backup, self.path))
            .await?;
        info!(host = self.dut.hostname(), path = %self.path, "Restored thermal policy");
        restart_thermal_control_daemon(self.dut).await
    }
}

/// Installs [`INVALID_POLICY_FILE`] from `files_dir`, which leaves
/// `thermalctld` without a usable policy until restored.
pub async fn disable_thermal_policy<'a, H: Host + ?Sized>(
    dut: &'a H,
    platform: &str,
    files_dir: &Path,
) -> MockerResult<ThermalPolicyFile<'a, H>> {
    let src: PathBuf = files_dir.join(INVALID_POLICY_FILE);
    ThermalPolicyFile::install(dut, platform, &src).await
}
