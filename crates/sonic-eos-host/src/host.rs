//! EOS device wrapper.
//!
//! [`EosHost`] decorates any [`Host`] with the connection variables EOS
//! needs and exposes the interface, BGP and port-speed operations the
//! tests use on Arista neighbors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use sonic_mgmt_common::shell::{singlequote, ANSIBLE_PLAYBOOK_CMD};
use sonic_mgmt_common::{Host, LocalHost, MgmtError, MgmtResult, ModuleInvocation, ModuleResult};

use crate::connection::EosCredentials;
use crate::error::{EosHostError, EosResult};

/// An Arista EOS device reached through `H`.
pub struct EosHost<H: Host> {
    pub(crate) host: H,
    credentials: EosCredentials,
    local: Arc<dyn Host>,
    playbook_cmd: String,
}

impl<H: Host> fmt::Debug for EosHost<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<EosHost {}>", self.host.hostname())
    }
}

impl<H: Host> EosHost<H> {
    /// Wraps `host` with the given credentials.
    pub fn new(host: H, credentials: EosCredentials) -> Self {
        Self {
            host,
            credentials,
            local: Arc::new(LocalHost::new()),
            playbook_cmd: ANSIBLE_PLAYBOOK_CMD.to_string(),
        }
    }

    /// Host used for [`EosHost::exec_template`] (the test server).
    pub fn with_local(mut self, local: impl Host + 'static) -> Self {
        self.local = Arc::new(local);
        self
    }

    /// Overrides the `ansible-playbook` binary.
    pub fn with_playbook_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.playbook_cmd = cmd.into();
        self
    }

    pub fn inner(&self) -> &H {
        &self.host
    }

    pub fn credentials(&self) -> &EosCredentials {
        &self.credentials
    }

    /// Runs a module with the connection variables for its kind. The result
    /// is returned as is, failed or not.
    pub async fn run_module(&self, invocation: ModuleInvocation) -> EosResult<ModuleResult> {
        let vars = self
            .credentials
            .vars_for(&invocation.module, self.host.hostname())?;
        Ok(self.host.run(invocation.with_extra_vars(&vars)).await?)
    }

    /// Like [`EosHost::run_module`], but a failed module is an error.
    pub async fn run_module_checked(&self, invocation: ModuleInvocation) -> EosResult<ModuleResult> {
        let module = invocation.module.clone();
        let result = self.run_module(invocation).await?;
        self.ensure_succeeded(&module, result)
    }

    /// `eos_config` without failure checking.
    pub async fn eos_config_raw(&self, lines: Vec<String>, parents: Vec<String>) -> EosResult<ModuleResult> {
        let mut args = json!({ "lines": lines });
        if !parents.is_empty() {
            args["parents"] = json!(parents);
        }
        self.run_module(ModuleInvocation::new("eos_config", args)).await
    }

    /// Applies configuration lines under optional parent sections.
    pub async fn eos_config(&self, lines: Vec<String>, parents: Vec<String>) -> EosResult<ModuleResult> {
        let result = self.eos_config_raw(lines, parents).await?;
        self.ensure_succeeded("eos_config", result)
    }

    /// `eos_command` without failure checking. Each command is either a
    /// plain string or a `{"command", "output"}` object.
    pub async fn eos_command_raw(&self, commands: Vec<Value>) -> EosResult<ModuleResult> {
        self.run_module(ModuleInvocation::new("eos_command", json!({ "commands": commands })))
            .await
    }

    /// Runs EOS CLI commands.
    pub async fn eos_command(&self, commands: Vec<Value>) -> EosResult<ModuleResult> {
        let result = self.eos_command_raw(commands).await?;
        self.ensure_succeeded("eos_command", result)
    }

    /// Runs a single text command and returns its output.
    pub(crate) async fn show_text(&self, command: &str) -> EosResult<String> {
        let result = self.eos_command(vec![json!(command)]).await?;
        result
            .output_text(0)
            .map(str::to_string)
            .ok_or_else(|| EosHostError::unexpected_output(self.host.hostname(), command, "no text output"))
    }

    /// Runs a single command with JSON output.
    pub(crate) async fn show_json(&self, command: &str) -> EosResult<ModuleResult> {
        self.eos_command_raw(vec![json!({ "command": command, "output": "json" })])
            .await
    }

    fn ensure_succeeded(&self, module: &str, result: ModuleResult) -> EosResult<ModuleResult> {
        if result.succeeded() {
            Ok(result)
        } else {
            Err(MgmtError::module_failed(self.host.hostname(), module, result.failure_message()).into())
        }
    }

    /// Shuts an interface (or a comma-separated interface list) down.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn shutdown(&self, interface: &str) -> EosResult<ModuleResult> {
        let out = self
            .eos_config(vec!["shutdown".to_string()], vec![format!("interface {}", interface)])
            .await?;
        info!("Shut interface [{}]", interface);
        Ok(out)
    }

    pub async fn shutdown_multiple(&self, interfaces: &[&str]) -> EosResult<ModuleResult> {
        self.shutdown(&interfaces.join(",")).await
    }

    /// Brings an interface (or a comma-separated interface list) up.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn no_shutdown(&self, interface: &str) -> EosResult<ModuleResult> {
        let out = self
            .eos_config(vec!["no shutdown".to_string()], vec![format!("interface {}", interface)])
            .await?;
        info!("No shut interface [{}]", interface);
        Ok(out)
    }

    pub async fn no_shutdown_multiple(&self, interfaces: &[&str]) -> EosResult<ModuleResult> {
        self.no_shutdown(&interfaces.join(",")).await
    }

    /// Returns true if any line of the `show interface` output contains
    /// `Up`. The match is case sensitive, so `is up` alone does not count.
    pub async fn check_intf_link_state(&self, interface: &str) -> EosResult<bool> {
        let command = format!("show interface {}", interface);
        let result = self.eos_command(vec![json!(command)]).await?;
        if result.output(0).is_none() {
            return Err(EosHostError::unexpected_output(self.host.hostname(), &command, "no output"));
        }
        Ok(result.output_lines(0).iter().any(|line| line.contains("Up")))
    }

    /// Sets the LACP rate of an interface.
    ///
    /// Newer EOS releases replaced `lacp rate` with `lacp timer`; the second
    /// form is tried when the first fails or changes nothing.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn set_interface_lacp_rate_mode(&self, interface: &str, mode: &str) -> EosResult<ModuleResult> {
        let parents = vec![format!("interface {}", interface)];
        let out = self
            .eos_config_raw(vec![format!("lacp rate {}", mode)], parents.clone())
            .await?;
        if !out.failed && out.changed {
            info!("Set interface [{}] lacp rate to [{}]", interface, mode);
            return Ok(out);
        }

        let out = self
            .eos_config_raw(vec![format!("lacp timer {}", mode)], parents)
            .await?;
        if !out.changed {
            warn!("Unable to set interface [{}] lacp timer to [{}]", interface, mode);
            return Err(EosHostError::LacpRateNotSet {
                interface: interface.to_string(),
                mode: mode.to_string(),
            });
        }
        info!("Set interface [{}] lacp timer to [{}]", interface, mode);
        Ok(out)
    }

    /// Runs a playbook against this device from the test server.
    ///
    /// `extra_vars` is passed as JSON on the command line.
    #[instrument(skip(self, extra_vars), fields(host = %self.host.hostname()))]
    pub async fn exec_template(
        &self,
        ansible_root: &str,
        playbook: &str,
        inventory: &str,
        extra_vars: &Value,
    ) -> EosResult<ModuleResult> {
        let cmd = format!(
            "cd {}; {} {} -i {} -l {} --extra-vars {} -vvvvv",
            ansible_root,
            self.playbook_cmd,
            playbook,
            inventory,
            self.host.hostname(),
            singlequote(&extra_vars.to_string())
        );
        let res = self.local.shell_unchecked(&cmd).await?;
        if res.rc != Some(0) {
            return Err(EosHostError::TemplateFailed {
                playbook: playbook.to_string(),
                output: res.stdout_text().to_string(),
            });
        }
        Ok(res)
    }
}

#[async_trait]
impl<H: Host> Host for EosHost<H> {
    fn hostname(&self) -> &str {
        self.host.hostname()
    }

    async fn run(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult> {
        Ok(self.run_module(invocation).await?)
    }
}
