//! Registry of mocker constructors.
//!
//! Each platform support package registers its concrete mockers under the
//! well-known type names. The registry is a plain value built at startup
//! and handed to a [`crate::MockerFactory`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use sonic_mgmt_common::Host;

use crate::mocker::Mocker;

/// Builds a mocker bound to a DUT.
pub type MockerConstructor = Arc<dyn Fn(Arc<dyn Host>) -> Arc<dyn Mocker> + Send + Sync>;

/// Mocker type name to constructor.
#[derive(Default, Clone)]
pub struct MockerRegistry {
    constructors: BTreeMap<String, MockerConstructor>,
}

impl MockerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    ///
    /// Returns true if an entry was replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> bool
    where
        F: Fn(Arc<dyn Host>) -> Arc<dyn Mocker> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(mocker = %name, "Registering mocker type");
        self.constructors
            .insert(name, Arc::new(constructor))
            .is_some()
    }

    /// Builder form of [`MockerRegistry::register`].
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(Arc<dyn Host>) -> Arc<dyn Mocker> + Send + Sync + 'static,
    {
        self.register(name, constructor);
        self
    }

    pub fn get(&self, name: &str) -> Option<MockerConstructor> {
        self.constructors.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for MockerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MockerResult;
    use crate::mocker::{FAN_STATUS_MOCKER, THERMAL_STATUS_MOCKER};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sonic_mgmt_common::ShowRow;
    use sonic_mgmt_test::MockHost;

    struct Noop(u8);

    #[async_trait]
    impl Mocker for Noop {
        async fn check_result(&self, _actual: &[ShowRow]) -> MockerResult<bool> {
            Ok(self.0 > 0)
        }
    }

    #[test]
    fn test_register_and_names() {
        let mut registry = MockerRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.register(THERMAL_STATUS_MOCKER, |_| Arc::new(Noop(0)) as Arc<dyn Mocker>));
        assert!(!registry.register(FAN_STATUS_MOCKER, |_| Arc::new(Noop(0)) as Arc<dyn Mocker>));
        assert_eq!(registry.names(), vec![FAN_STATUS_MOCKER, THERMAL_STATUS_MOCKER]);
        assert!(registry.contains(FAN_STATUS_MOCKER));
        assert!(registry.get("SingleFanMocker").is_none());
    }

    #[tokio::test]
    async fn test_reregister_replaces() {
        let mut registry = MockerRegistry::new().with(FAN_STATUS_MOCKER, |_| Arc::new(Noop(0)) as Arc<dyn Mocker>);
        assert!(registry.register(FAN_STATUS_MOCKER, |_| Arc::new(Noop(1)) as Arc<dyn Mocker>));
        assert_eq!(registry.len(), 1);

        let dut: Arc<dyn Host> = Arc::new(MockHost::new("vlab-01"));
        let ctor = registry.get(FAN_STATUS_MOCKER).unwrap();
        assert!(ctor(dut).check_result(&[]).await.unwrap());
    }
}
