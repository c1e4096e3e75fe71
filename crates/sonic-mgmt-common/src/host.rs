//! Host abstraction: run a named module with arguments on a device.
//!
//! Every device helper in the workspace (EOS neighbors, MACsec setup,
//! thermal mockers) talks to its device through [`Host`]. A module
//! invocation mirrors an Ansible task: a module name (`command`, `shell`,
//! `eos_config`, `eos_command`, `stat`, `copy`, ...), its arguments, and
//! connection variables. The result carries at least `stdout`,
//! `stdout_lines`, `failed` and `changed`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{MgmtError, MgmtResult};
use crate::show::{parse_show_table, ShowRow};

/// Connection variables passed alongside a module invocation.
pub type ExtraVars = BTreeMap<String, String>;

/// A single module call against a host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleInvocation {
    /// Module name, e.g. `command` or `eos_config`.
    pub module: String,
    /// Module arguments. A JSON string is a free-form argument.
    pub args: Value,
    /// Connection variables for this call.
    pub extra_vars: ExtraVars,
}

impl ModuleInvocation {
    /// Creates an invocation with structured arguments.
    pub fn new(module: impl Into<String>, args: Value) -> Self {
        Self {
            module: module.into(),
            args,
            extra_vars: ExtraVars::new(),
        }
    }

    /// `command` module with a free-form command line.
    pub fn command(cmd: impl Into<String>) -> Self {
        Self::new("command", Value::String(cmd.into()))
    }

    /// `shell` module with a free-form command line.
    pub fn shell(cmd: impl Into<String>) -> Self {
        Self::new("shell", Value::String(cmd.into()))
    }

    /// Adds connection variables, overriding existing keys.
    pub fn with_extra_vars(mut self, vars: &ExtraVars) -> Self {
        self.extra_vars
            .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Returns the free-form argument, if the arguments are a plain string.
    pub fn free_form(&self) -> Option<&str> {
        self.args.as_str()
    }
}

/// Structured output of a module call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    /// A string for `command`/`shell`; a list of per-command outputs for
    /// `eos_command`.
    #[serde(default)]
    pub stdout: Value,
    /// Output split into lines (list of strings, or list of lists).
    #[serde(default)]
    pub stdout_lines: Value,
    /// Standard error, when the module reports it.
    #[serde(default)]
    pub stderr: String,
    /// Exit code, when the module reports it.
    #[serde(default)]
    pub rc: Option<i32>,
    /// True if the module failed.
    #[serde(default)]
    pub failed: bool,
    /// True if the module changed device state.
    #[serde(default)]
    pub changed: bool,
    /// Failure or informational message.
    #[serde(default)]
    pub msg: Option<String>,
    /// Any other module-specific keys (`stat`, `diff`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleResult {
    /// Builds a successful result from plain text output.
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        let lines: Vec<Value> = stdout.lines().map(|l| json!(l)).collect();
        Self {
            stdout: Value::String(stdout),
            stdout_lines: Value::Array(lines),
            rc: Some(0),
            ..Default::default()
        }
    }

    /// Builds a successful `eos_command`-style result from per-command outputs.
    pub fn from_outputs(outputs: Vec<Value>) -> Self {
        let lines = outputs
            .iter()
            .map(|o| match o {
                Value::String(s) => Value::Array(s.lines().map(|l| json!(l)).collect()),
                other => other.clone(),
            })
            .collect();
        Self {
            stdout: Value::Array(outputs),
            stdout_lines: Value::Array(lines),
            ..Default::default()
        }
    }

    /// Builds a failed result with a message.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: Some(msg.into()),
            ..Default::default()
        }
    }

    /// Builds a result reporting a configuration change.
    pub fn changed() -> Self {
        Self {
            changed: true,
            ..Default::default()
        }
    }

    /// Sets the exit code.
    pub fn with_rc(mut self, rc: i32) -> Self {
        self.rc = Some(rc);
        self
    }

    /// Adds a module-specific key.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True if the module did not fail and exited with 0 (when it reports rc).
    pub fn succeeded(&self) -> bool {
        !self.failed && self.rc.map_or(true, |rc| rc == 0)
    }

    /// Returns `stdout` when it is plain text, or an empty string.
    pub fn stdout_text(&self) -> &str {
        self.stdout.as_str().unwrap_or("")
    }

    /// Returns the output of the `idx`-th command of a multi-command module.
    pub fn output(&self, idx: usize) -> Option<&Value> {
        self.stdout.as_array().and_then(|outs| outs.get(idx))
    }

    /// Returns the `idx`-th command output when it is text.
    pub fn output_text(&self, idx: usize) -> Option<&str> {
        self.output(idx).and_then(Value::as_str)
    }

    /// Returns `stdout_lines` when it is a flat list of strings.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout_lines
            .as_array()
            .map(|lines| lines.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the lines of the `idx`-th command of a multi-command module.
    pub fn output_lines(&self, idx: usize) -> Vec<&str> {
        self.stdout_lines
            .as_array()
            .and_then(|outs| outs.get(idx))
            .and_then(Value::as_array)
            .map(|lines| lines.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Best available failure description.
    pub fn failure_message(&self) -> String {
        if let Some(msg) = &self.msg {
            return msg.clone();
        }
        if !self.stderr.is_empty() {
            return self.stderr.clone();
        }
        match self.rc {
            Some(rc) => format!("exit code {}", rc),
            None => "module reported failure".to_string(),
        }
    }
}

/// A device that can run modules.
///
/// Implementations only provide [`Host::run`]; the remaining methods are
/// conveniences for the modules every helper needs.
#[async_trait]
pub trait Host: Send + Sync {
    /// Inventory name of the host.
    fn hostname(&self) -> &str;

    /// Runs a module and returns its raw result, failed or not.
    async fn run(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult>;

    /// Runs a module and turns a reported failure into an error.
    async fn run_checked(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult> {
        let module = invocation.module.clone();
        let result = self.run(invocation).await?;
        if result.succeeded() {
            Ok(result)
        } else {
            Err(MgmtError::module_failed(
                self.hostname(),
                module,
                result.failure_message(),
            ))
        }
    }

    /// Runs `cmd` with the `command` module; failure is an error.
    async fn command(&self, cmd: &str) -> MgmtResult<ModuleResult> {
        self.run_checked(ModuleInvocation::command(cmd)).await
    }

    /// Runs `cmd` with the `shell` module; failure is an error.
    async fn shell(&self, cmd: &str) -> MgmtResult<ModuleResult> {
        self.run_checked(ModuleInvocation::shell(cmd)).await
    }

    /// Runs `cmd` with the `shell` module and returns the result as is.
    async fn shell_unchecked(&self, cmd: &str) -> MgmtResult<ModuleResult> {
        self.run(ModuleInvocation::shell(cmd)).await
    }

    /// Returns true if `path` exists on the host.
    async fn path_exists(&self, path: &str) -> MgmtResult<bool> {
        let result = self
            .run_checked(ModuleInvocation::new("stat", json!({ "path": path })))
            .await?;
        result
            .extra
            .get("stat")
            .and_then(|stat| stat.get("exists"))
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                MgmtError::unexpected_output(self.hostname(), "stat", "missing stat.exists")
            })
    }

    /// Copies a file from the test server to the host.
    async fn copy(&self, src: &str, dest: &str) -> MgmtResult<ModuleResult> {
        self.run_checked(ModuleInvocation::new(
            "copy",
            json!({ "src": src, "dest": dest }),
        ))
        .await
    }

    /// Runs a `show` command and parses its tabular output.
    async fn show_and_parse(&self, cmd: &str) -> MgmtResult<Vec<ShowRow>> {
        let result = self.shell(cmd).await?;
        Ok(parse_show_table(result.stdout_text()))
    }
}

#[async_trait]
impl<H: Host + ?Sized> Host for Arc<H> {
    fn hostname(&self) -> &str {
        (**self).hostname()
    }

    async fn run(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult> {
        (**self).run(invocation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invocation_free_form() {
        let inv = ModuleInvocation::command("show version");
        assert_eq!(inv.module, "command");
        assert_eq!(inv.free_form(), Some("show version"));

        let inv = ModuleInvocation::new("stat", json!({"path": "/tmp"}));
        assert_eq!(inv.free_form(), None);
    }

    #[test]
    fn test_invocation_extra_vars_override() {
        let mut vars = ExtraVars::new();
        vars.insert("ansible_user".to_string(), "admin".to_string());
        let inv = ModuleInvocation::shell("ls").with_extra_vars(&vars);
        assert_eq!(inv.extra_vars.get("ansible_user").map(String::as_str), Some("admin"));
    }

    #[test]
    fn test_result_from_stdout() {
        let result = ModuleResult::from_stdout("line1\nline2");
        assert!(result.succeeded());
        assert_eq!(result.stdout_text(), "line1\nline2");
        assert_eq!(result.lines(), vec!["line1", "line2"]);
    }

    #[test]
    fn test_result_from_outputs() {
        let result = ModuleResult::from_outputs(vec![
            json!("Ethernet1 is up, line protocol is up (connected)\nHardware is Ethernet"),
            json!({"vrfs": {}}),
        ]);
        assert_eq!(
            result.output_lines(0),
            vec![
                "Ethernet1 is up, line protocol is up (connected)",
                "Hardware is Ethernet"
            ]
        );
        assert_eq!(result.output(1), Some(&json!({"vrfs": {}})));
        assert_eq!(result.output_text(1), None);
    }

    #[test]
    fn test_result_failure_message() {
        assert_eq!(ModuleResult::failure("boom").failure_message(), "boom");
        let result = ModuleResult::from_stdout("").with_rc(2);
        assert!(!result.succeeded());
        assert_eq!(result.failure_message(), "exit code 2");
    }

    #[test]
    fn test_result_deserialize_with_extra() {
        let raw = r#"{"changed": false, "stat": {"exists": true}, "failed": false}"#;
        let result: ModuleResult = serde_json::from_str(raw).unwrap();
        assert!(!result.failed);
        assert_eq!(result.extra["stat"]["exists"], json!(true));
        assert_eq!(result.stdout, Value::Null);
    }
}
