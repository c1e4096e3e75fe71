//! Error types for MACsec configuration.

use thiserror::Error;

use sonic_mgmt_common::MgmtError;

/// Result type alias for MACsec helpers.
pub type MacsecResult<T> = Result<T, MacsecError>;

/// Errors raised while configuring MACsec on DUT and neighbors.
#[derive(Debug, Error)]
pub enum MacsecError {
    /// The underlying host operation failed.
    #[error(transparent)]
    Host(#[from] MgmtError),

    /// MKA sessions were still up after the profile was removed.
    #[error("MKA sessions on {host} not cleared after {timeout_secs}s")]
    MkaSessionsNotCleared {
        /// Device still reporting sessions.
        host: String,
        /// How long we waited.
        timeout_secs: u64,
    },

    /// Port name has no kernel interface counterpart.
    #[error("Cannot map port '{0}' to a kernel interface")]
    InvalidPortName(String),

    /// Profile values rejected before reaching CONFIG_DB.
    #[error("Invalid MACsec profile '{profile}': {message}")]
    InvalidProfile {
        /// Profile name.
        profile: String,
        /// What is wrong with it.
        message: String,
    },
}

impl MacsecError {
    pub fn invalid_profile(profile: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProfile {
            profile: profile.into(),
            message: message.into(),
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MacsecError::Host(e) => e.is_retryable(),
            MacsecError::MkaSessionsNotCleared { .. } => true,
            MacsecError::InvalidPortName(_) | MacsecError::InvalidProfile { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MacsecError::MkaSessionsNotCleared {
            host: "vlab-01".to_string(),
            timeout_secs: 30,
        };
        assert_eq!(err.to_string(), "MKA sessions on vlab-01 not cleared after 30s");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_host_error_passthrough() {
        let err: MacsecError = MgmtError::module_failed("vlab-01", "command", "rc 1").into();
        assert_eq!(err.to_string(), "Module 'command' failed on vlab-01: rc 1");
        assert!(err.is_retryable());
        assert!(!MacsecError::InvalidPortName("x".to_string()).is_retryable());
    }
}
