//! Error types for thermal mocking and thermal-control daemon handling.

use thiserror::Error;

use sonic_mgmt_common::MgmtError;

use crate::daemon::DaemonStatus;

/// Result type alias for mocker operations.
pub type MockerResult<T> = Result<T, MockerError>;

/// Errors raised by mockers, the mocker factory and daemon helpers.
#[derive(Debug, Error)]
pub enum MockerError {
    #[error(transparent)]
    Host(#[from] MgmtError),

    /// No mocker implementation exists for this platform.
    #[error("No mocker defined for platform {0}")]
    UnsupportedPlatform(String),

    /// Platform string could not be read from the DUT.
    #[error("Cannot determine platform of {host}")]
    UnknownPlatform { host: String },

    /// A `show` command produced no table rows.
    #[error("Run and parse output of command '{command}' failed")]
    EmptyOutput { command: String },

    /// CLI output does not reflect the mocked data.
    #[error("Mock data and command \"{command}\" output are mismatched")]
    MockMismatch { command: String },

    /// A mocker could not apply or undo its data.
    #[error("Mocker {mocker} failed: {message}")]
    Mocker { mocker: String, message: String },

    #[error("Command '{command}' failed on {host}: {message}")]
    CommandFailed {
        host: String,
        command: String,
        message: String,
    },

    #[error("Expected at least {expected} {daemon} processes on {host}, found {found}")]
    TooFewProcesses {
        host: String,
        daemon: String,
        expected: usize,
        found: usize,
    },

    /// Restart failed; the DUT configuration was reloaded.
    #[error("Wait {daemon} restart failed on {host}")]
    DaemonRestartFailed { host: String, daemon: String },

    #[error("{daemon} on {host} is {actual}, expected {expected}")]
    UnexpectedDaemonStatus {
        host: String,
        daemon: String,
        expected: DaemonStatus,
        actual: DaemonStatus,
    },
}

impl MockerError {
    /// Creates a mocker failure for vendor implementations.
    pub fn mocker(mocker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mocker {
            mocker: mocker.into(),
            message: message.into(),
        }
    }

    pub fn command_failed(
        host: impl Into<String>,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            host: host.into(),
            command: command.into(),
            message: message.into(),
        }
    }

    /// Returns true if the test can sensibly be skipped rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, MockerError::UnsupportedPlatform(_))
    }
}
