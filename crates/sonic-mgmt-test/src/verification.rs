//! Verification helpers for recorded host calls
//!
//! Provides assertion helpers over the calls a [`MockHost`] has seen

use serde_json::Value;
use thiserror::Error;

use crate::MockHost;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected a command containing '{needle}' on {host}; saw {seen:?}")]
    CommandNotRun {
        host: String,
        needle: String,
        seen: Vec<String>,
    },

    #[error("Command containing '{needle}' was run on {host}")]
    UnexpectedCommand { host: String, needle: String },

    #[error("Expected {expected} '{module}' calls on {host}, found {actual}")]
    CallCountMismatch {
        host: String,
        module: String,
        expected: usize,
        actual: usize,
    },

    #[error("'{module}' call {index} on {host} has no lines {expected:?}")]
    ConfigLinesMismatch {
        host: String,
        module: String,
        index: usize,
        expected: Vec<String>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Assertions over the calls recorded by a [`MockHost`]
pub struct CallVerifier<'a> {
    host: &'a MockHost,
}

impl<'a> CallVerifier<'a> {
    /// Create a verifier for a mock host
    pub fn new(host: &'a MockHost) -> Self {
        Self { host }
    }

    /// Verify that some command line contains `needle`
    pub fn assert_command_run(&self, needle: &str) -> VerifyResult<()> {
        let seen = self.host.commands();
        if seen.iter().any(|c| c.contains(needle)) {
            Ok(())
        } else {
            Err(VerificationError::CommandNotRun {
                host: sonic_mgmt_common::Host::hostname(self.host).to_string(),
                needle: needle.to_string(),
                seen,
            })
        }
    }

    /// Verify that no command line contains `needle`
    pub fn assert_command_not_run(&self, needle: &str) -> VerifyResult<()> {
        if self.host.commands().iter().any(|c| c.contains(needle)) {
            Err(VerificationError::UnexpectedCommand {
                host: sonic_mgmt_common::Host::hostname(self.host).to_string(),
                needle: needle.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Verify the number of calls of a module
    pub fn assert_call_count(&self, module: &str, expected: usize) -> VerifyResult<()> {
        let actual = self.host.calls_of(module).len();
        if actual == expected {
            Ok(())
        } else {
            Err(VerificationError::CallCountMismatch {
                host: sonic_mgmt_common::Host::hostname(self.host).to_string(),
                module: module.to_string(),
                expected,
                actual,
            })
        }
    }

    /// Verify the `lines` argument of the `index`-th call of `module`
    pub fn assert_config_lines(&self, module: &str, index: usize, expected: &[&str]) -> VerifyResult<()> {
        let calls = self.host.calls_of(module);
        let lines: Option<Vec<String>> = calls
            .get(index)
            .and_then(|c| c.args.get("lines"))
            .and_then(Value::as_array)
            .map(|l| l.iter().filter_map(Value::as_str).map(str::to_string).collect());

        match lines {
            Some(lines) if lines == expected => Ok(()),
            _ => Err(VerificationError::ConfigLinesMismatch {
                host: sonic_mgmt_common::Host::hostname(self.host).to_string(),
                module: module.to_string(),
                index,
                expected: expected.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}
