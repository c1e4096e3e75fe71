//! Connection variables for EOS devices.
//!
//! Modules prefixed `eos_` run over `network_cli` with the EOS CLI
//! credentials. Everything else runs over SSH on the Linux shell and needs
//! the shell credentials.

use std::fmt;

use sonic_mgmt_common::ExtraVars;

use crate::error::{EosHostError, EosResult};

/// Prefix of modules that talk to the EOS CLI.
pub const EOS_MODULE_PREFIX: &str = "eos_";

/// Login credentials of an EOS device.
#[derive(Clone, PartialEq, Eq)]
pub struct EosCredentials {
    pub eos_user: String,
    pub eos_passwd: String,
    pub shell_user: Option<String>,
    pub shell_passwd: Option<String>,
}

impl fmt::Debug for EosCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EosCredentials")
            .field("eos_user", &self.eos_user)
            .field("shell_user", &self.shell_user)
            .finish_non_exhaustive()
    }
}

impl EosCredentials {
    /// EOS CLI credentials only.
    pub fn new(eos_user: impl Into<String>, eos_passwd: impl Into<String>) -> Self {
        Self {
            eos_user: eos_user.into(),
            eos_passwd: eos_passwd.into(),
            shell_user: None,
            shell_passwd: None,
        }
    }

    /// Adds Linux shell credentials.
    pub fn with_shell(mut self, user: impl Into<String>, passwd: impl Into<String>) -> Self {
        self.shell_user = Some(user.into());
        self.shell_passwd = Some(passwd.into());
        self
    }

    /// Variables for `eos_*` modules.
    pub fn eos_cli_vars(&self) -> ExtraVars {
        connection_vars("network_cli", "eos", &self.eos_user, &self.eos_passwd, "enable")
    }

    /// Variables for Linux shell modules.
    pub fn shell_vars(&self, hostname: &str) -> EosResult<ExtraVars> {
        match (&self.shell_user, &self.shell_passwd) {
            (Some(user), Some(passwd)) if !user.is_empty() && !passwd.is_empty() => {
                Ok(connection_vars("ssh", "linux", user, passwd, "sudo"))
            }
            _ => Err(EosHostError::MissingShellCredentials {
                host: hostname.to_string(),
            }),
        }
    }

    /// Variables for running `module` on `hostname`.
    pub fn vars_for(&self, module: &str, hostname: &str) -> EosResult<ExtraVars> {
        if module.starts_with(EOS_MODULE_PREFIX) {
            Ok(self.eos_cli_vars())
        } else {
            self.shell_vars(hostname)
        }
    }
}

fn connection_vars(connection: &str, os: &str, user: &str, passwd: &str, become_method: &str) -> ExtraVars {
    [
        ("ansible_connection", connection),
        ("ansible_network_os", os),
        ("ansible_user", user),
        ("ansible_password", passwd),
        ("ansible_ssh_user", user),
        ("ansible_ssh_pass", passwd),
        ("ansible_become_method", become_method),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
