//! Error types for EOS device operations.

use thiserror::Error;

use sonic_mgmt_common::MgmtError;

/// Result type alias for EOS operations.
pub type EosResult<T> = Result<T, EosHostError>;

/// Errors raised by [`crate::EosHost`].
#[derive(Debug, Error)]
pub enum EosHostError {
    /// The underlying host failed to run a module.
    #[error(transparent)]
    Host(#[from] MgmtError),

    /// A Linux-shell module was requested without shell credentials.
    #[error("Please specify shell_user and shell_passwd for {host}")]
    MissingShellCredentials {
        /// Device hostname.
        host: String,
    },

    /// Neither `lacp rate` nor `lacp timer` changed the interface.
    #[error("Unable to set interface [{interface}] lacp timer to [{mode}]")]
    LacpRateNotSet {
        /// Interface name.
        interface: String,
        /// Requested mode (`fast` / `normal`).
        mode: String,
    },

    /// A CLI command reported failure.
    #[error("Command '{command}' failed on {host}: {message}")]
    CommandFailed {
        host: String,
        command: String,
        message: String,
    },

    /// CLI output did not contain what was expected.
    #[error("Unexpected output of '{command}' on {host}: {message}")]
    UnexpectedOutput {
        host: String,
        command: String,
        message: String,
    },

    /// The prefix is not a valid IPv4 or IPv6 network.
    #[error("Invalid prefix '{0}'")]
    InvalidPrefix(String),

    /// `ansible-playbook` exited with a non-zero code.
    #[error("Unable to execute template {playbook}\n{output}")]
    TemplateFailed {
        /// Playbook path.
        playbook: String,
        /// Playbook output.
        output: String,
    },
}

impl EosHostError {
    /// Creates an unexpected output error.
    pub fn unexpected_output(
        host: impl Into<String>,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnexpectedOutput {
            host: host.into(),
            command: command.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Host(e) => e.is_retryable(),
            Self::CommandFailed { .. } => true,
            _ => false,
        }
    }
}

impl From<EosHostError> for MgmtError {
    fn from(err: EosHostError) -> Self {
        match err {
            EosHostError::Host(e) => e,
            EosHostError::MissingShellCredentials { host } => MgmtError::invalid_config(
                "shell_user",
                format!("Please specify shell_user and shell_passwd for {}", host),
            ),
            other => MgmtError::unexpected_output("eos", "eos", other.to_string()),
        }
    }
}
