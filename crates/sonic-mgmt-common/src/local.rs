//! Host implementation for the test server itself.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MgmtError, MgmtResult};
use crate::host::{Host, ModuleInvocation, ModuleResult};
use crate::shell;

/// Runs `command` and `shell` modules on the local machine.
///
/// Other modules are rejected with [`MgmtError::UnsupportedModule`].
#[derive(Debug, Clone)]
pub struct LocalHost {
    hostname: String,
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHost {
    /// Creates a host named `localhost`.
    pub fn new() -> Self {
        Self {
            hostname: "localhost".to_string(),
        }
    }
}

#[async_trait]
impl Host for LocalHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn run(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult> {
        let cmd = match (invocation.module.as_str(), invocation.free_form()) {
            ("command" | "shell", Some(cmd)) => cmd.to_string(),
            _ => {
                return Err(MgmtError::UnsupportedModule {
                    host: self.hostname.clone(),
                    module: invocation.module.clone(),
                })
            }
        };

        debug!(module = %invocation.module, command = %cmd, "Running local module");
        let result = shell::exec(&cmd).await?;
        let mut out = ModuleResult::from_stdout(result.stdout.clone());
        out.rc = Some(result.exit_code);
        out.stderr = result.stderr.clone();
        out.failed = !result.success();
        if out.failed {
            out.msg = Some(format!("non-zero return code {}", result.exit_code));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_local_shell() {
        let host = LocalHost::new();
        let result = host.shell("printf 'a\\nb'").await.unwrap();
        assert_eq!(result.lines(), vec!["a", "b"]);
        assert_eq!(result.rc, Some(0));
    }

    #[tokio::test]
    async fn test_local_failure_is_error() {
        let host = LocalHost::new();
        let raw = host.shell_unchecked("exit 4").await.unwrap();
        assert!(raw.failed);
        assert_eq!(raw.rc, Some(4));

        assert!(matches!(
            host.shell("exit 4").await,
            Err(MgmtError::ModuleFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_rejects_other_modules() {
        let host = LocalHost::new();
        let err = host
            .run(ModuleInvocation::new("eos_config", json!({"lines": ["shutdown"]})))
            .await
            .unwrap_err();
        assert!(matches!(err, MgmtError::UnsupportedModule { .. }));
    }
}
