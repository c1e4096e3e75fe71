//! Local shell execution for test-management helpers.
//!
//! Commands that run on the test server itself (ansible, ansible-playbook)
//! and the [`LocalHost`](crate::LocalHost) implementation go through this
//! module. Arguments are quoted with [`shellquote`] for double-quote
//! contexts or [`singlequote`] for `sonic-db-cli` style single quotes.
//!
//! # Example
//!
//! ```ignore
//! use sonic_mgmt_common::shell::{self, ANSIBLE_PLAYBOOK_CMD, shellquote};
//!
//! let cmd = format!("{} {} -i {}", ANSIBLE_PLAYBOOK_CMD,
//!     shellquote("fanout.yml"), shellquote("lab"));
//! let result = shell::exec(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MgmtError, MgmtResult};

/// The `ansible` ad-hoc runner.
pub const ANSIBLE_CMD: &str = "ansible";

/// The `ansible-playbook` runner.
pub const ANSIBLE_PLAYBOOK_CMD: &str = "ansible-playbook";

/// SONiC database CLI, present on every DUT.
pub const SONIC_DB_CLI: &str = "sonic-db-cli";

/// Path to the `docker` binary on the DUT.
pub const DOCKER_CMD: &str = "docker";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for use inside shell double quotes.
///
/// Escapes `$`, `` ` ``, `"`, `\` and newline.
///
/// # Example
///
/// ```
/// use sonic_mgmt_common::shell::shellquote;
///
/// assert_eq!(shellquote("simple"), "\"simple\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Quotes a string in single quotes.
///
/// An embedded `'` is closed, escaped and reopened (`'\''`).
///
/// ```
/// use sonic_mgmt_common::shell::singlequote;
///
/// assert_eq!(singlequote("PORT|Ethernet0"), "'PORT|Ethernet0'");
/// assert_eq!(singlequote("it's"), "'it'\\''s'");
/// ```
pub fn singlequote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Result of a shell command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The trimmed stdout output.
    pub stdout: String,
    /// The trimmed stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a shell command through `/bin/sh -c`.
///
/// A non-zero exit is not an error here; only a spawn failure is.
pub async fn exec(cmd: &str) -> MgmtResult<ExecResult> {
    exec_with_env(cmd, &[]).await
}

/// Executes a shell command with extra environment variables.
pub async fn exec_with_env(cmd: &str, env: &[(&str, &str)]) -> MgmtResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .envs(env.iter().copied())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| MgmtError::ShellExec {
            command: cmd.to_string(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    let result = ExecResult {
        exit_code,
        stdout,
        stderr,
    };

    if result.success() {
        tracing::trace!(command = %cmd, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes a shell command and returns an error on non-zero exit.
pub async fn exec_or_throw(cmd: &str) -> MgmtResult<String> {
    let result = exec(cmd).await?;
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(MgmtError::ShellCommandFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}
