//! Error types for host and CONFIG_DB operations.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for host operations.
pub type MgmtResult<T> = Result<T, MgmtError>;

/// Errors that can occur while driving a remote or local host.
#[derive(Debug, Error)]
pub enum MgmtError {
    /// Failed to spawn a shell command.
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// A module ran on the host but reported failure.
    #[error("Module '{module}' failed on {host}: {message}")]
    ModuleFailed {
        /// The host the module ran on.
        host: String,
        /// The module name (e.g. "command", "eos_config").
        module: String,
        /// Message reported by the module.
        message: String,
    },

    /// The host implementation cannot run this module.
    #[error("Module '{module}' is not supported by host {host}")]
    UnsupportedModule {
        /// The host name.
        host: String,
        /// The module name.
        module: String,
    },

    /// Module output could not be interpreted.
    #[error("Unexpected output from '{module}' on {host}: {message}")]
    UnexpectedOutput {
        /// The host name.
        host: String,
        /// The module name.
        module: String,
        /// What was wrong with the output.
        message: String,
    },

    /// Condition did not become true in time.
    #[error("Timed out after {timeout_secs}s waiting for {what}")]
    Timeout {
        /// What was being waited for.
        what: String,
        /// Timeout in seconds.
        timeout_secs: u64,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl MgmtError {
    /// Creates a module failure error.
    pub fn module_failed(
        host: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ModuleFailed {
            host: host.into(),
            module: module.into(),
            message: message.into(),
        }
    }

    /// Creates an unexpected output error.
    pub fn unexpected_output(
        host: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnexpectedOutput {
            host: host.into(),
            module: module.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MgmtError::ShellCommandFailed { .. }
                | MgmtError::ModuleFailed { .. }
                | MgmtError::Timeout { .. }
        )
    }
}
