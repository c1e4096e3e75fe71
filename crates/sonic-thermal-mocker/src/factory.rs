//! Per-test mocker factory.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use sonic_mgmt_common::Host;

use crate::error::{MockerError, MockerResult};
use crate::mocker::Mocker;
use crate::registry::MockerRegistry;

/// Platform substrings with mocker support.
pub const SUPPORTED_PLATFORMS: &[&str] = &["mlnx"];

/// Returns true if mockers exist for `platform`.
pub fn supports_platform(platform: &str) -> bool {
    SUPPORTED_PLATFORMS.iter().any(|p| platform.contains(p))
}

/// Creates mockers for one test and tears them all down afterwards.
pub struct MockerFactory {
    registry: Arc<MockerRegistry>,
    created: Mutex<Vec<(String, Arc<dyn Mocker>)>>,
}

impl MockerFactory {
    pub fn new(registry: Arc<MockerRegistry>) -> Self {
        Self {
            registry,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &MockerRegistry {
        &self.registry
    }

    /// Creates a mocker of type `name` for `dut`.
    ///
    /// Returns `Ok(None)` when no such type is registered and
    /// [`MockerError::UnsupportedPlatform`] when `platform` has no mockers
    /// at all.
    pub fn create(
        &self,
        dut: Arc<dyn Host>,
        platform: &str,
        name: &str,
    ) -> MockerResult<Option<Arc<dyn Mocker>>> {
        if !supports_platform(platform) {
            return Err(MockerError::UnsupportedPlatform(platform.to_string()));
        }

        let Some(constructor) = self.registry.get(name) else {
            info!(mocker = name, platform, "Mocker type not registered");
            return Ok(None);
        };

        let mocker = constructor(dut);
        self.created.lock().push((name.to_string(), Arc::clone(&mocker)));
        Ok(Some(mocker))
    }

    /// Number of mockers awaiting teardown.
    pub fn active(&self) -> usize {
        self.created.lock().len()
    }

    /// Deinitializes every created mocker, in creation order.
    ///
    /// All mockers are deinitialized even when one fails; the first
    /// failure is returned.
    pub async fn teardown(&self) -> MockerResult<()> {
        let mockers = std::mem::take(&mut *self.created.lock());
        let mut first_error = None;

        for (name, mocker) in mockers {
            if let Err(e) = mocker.deinit().await {
                warn!(mocker = %name, error = %e, "Failed to recover from mock");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
