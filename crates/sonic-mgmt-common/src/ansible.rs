//! Host implementation backed by Ansible ad-hoc commands.
//!
//! Each module call runs `ansible <host> -m <module> -a <args>` with the
//! `json` stdout callback, and the per-host task result is decoded into a
//! [`ModuleResult`].

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::AnsibleConfig;
use crate::error::{MgmtError, MgmtResult};
use crate::host::{ExtraVars, Host, ModuleInvocation, ModuleResult};
use crate::shell::{self, singlequote};

/// Environment that switches ansible to machine-readable output.
const JSON_CALLBACK_ENV: [(&str, &str); 2] = [
    ("ANSIBLE_LOAD_CALLBACK_PLUGINS", "1"),
    ("ANSIBLE_STDOUT_CALLBACK", "json"),
];

/// A host in an Ansible inventory.
#[derive(Debug, Clone)]
pub struct AnsibleHost {
    hostname: String,
    ansible_cmd: String,
    inventory: Option<PathBuf>,
    extra_vars: ExtraVars,
    timeout: Duration,
}

impl AnsibleHost {
    /// Creates a host using ansible defaults.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::from_config(hostname, &AnsibleConfig::default())
    }

    /// Creates a host from the `[ansible]` configuration section.
    pub fn from_config(hostname: impl Into<String>, config: &AnsibleConfig) -> Self {
        Self {
            hostname: hostname.into(),
            ansible_cmd: config.ansible_cmd.clone(),
            inventory: config.inventory.clone(),
            extra_vars: ExtraVars::new(),
            timeout: Duration::from_secs(config.module_timeout_secs),
        }
    }

    /// Sets the inventory file.
    pub fn with_inventory(mut self, inventory: impl Into<PathBuf>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    /// Sets variables applied to every module call on this host.
    pub fn with_extra_vars(mut self, vars: ExtraVars) -> Self {
        self.extra_vars = vars;
        self
    }

    /// Builds the ad-hoc command line for an invocation.
    pub fn build_command(&self, invocation: &ModuleInvocation) -> MgmtResult<String> {
        let args = match &invocation.args {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => serde_json::to_string(other)?,
        };

        let mut vars = self.extra_vars.clone();
        vars.extend(
            invocation
                .extra_vars
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let mut cmd = format!("{} {}", self.ansible_cmd, singlequote(&self.hostname));
        if let Some(inventory) = &self.inventory {
            cmd.push_str(&format!(" -i {}", singlequote(&inventory.display().to_string())));
        }
        cmd.push_str(&format!(" -m {}", singlequote(&invocation.module)));
        if !args.is_empty() {
            cmd.push_str(&format!(" -a {}", singlequote(&args)));
        }
        if !vars.is_empty() {
            cmd.push_str(&format!(" -e {}", singlequote(&serde_json::to_string(&vars)?)));
        }
        Ok(cmd)
    }
}

/// Extracts this host's task result from `json` callback output.
pub fn parse_adhoc_output(hostname: &str, module: &str, output: &str) -> MgmtResult<ModuleResult> {
    let doc: Value = serde_json::from_str(output)?;
    let host_result = doc
        .pointer("/plays/0/tasks/0/hosts")
        .and_then(|hosts| hosts.get(hostname))
        .ok_or_else(|| {
            MgmtError::unexpected_output(hostname, module, "no task result for host")
        })?;

    let mut result: ModuleResult = serde_json::from_value(host_result.clone())?;
    if result.extra.get("unreachable").and_then(Value::as_bool) == Some(true) {
        result.failed = true;
    }
    Ok(result)
}

#[async_trait]
impl Host for AnsibleHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    #[instrument(skip(self, invocation), fields(host = %self.hostname, module = %invocation.module))]
    async fn run(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult> {
        let cmd = self.build_command(&invocation)?;

        let exec = shell::exec_with_env(&cmd, &JSON_CALLBACK_ENV);
        let output = tokio::time::timeout(self.timeout, exec)
            .await
            .map_err(|_| MgmtError::Timeout {
                what: format!("{} on {}", invocation.module, self.hostname),
                timeout_secs: self.timeout.as_secs(),
            })??;

        match parse_adhoc_output(&self.hostname, &invocation.module, &output.stdout) {
            Ok(result) => {
                debug!(
                    failed = result.failed,
                    changed = result.changed,
                    "Module completed"
                );
                Ok(result)
            }
            // Ansible exits non-zero without JSON when it cannot start at all.
            Err(_) if !output.success() => Err(MgmtError::ShellCommandFailed {
                command: cmd,
                exit_code: output.exit_code,
                output: output.combined_output(),
            }),
            Err(e) => Err(e),
        }
    }
}
