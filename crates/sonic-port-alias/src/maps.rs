//! Map types produced by alias resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Front-panel alias (`Ethernet3/1`, `etp12`, ...) to canonical port name.
pub type PortAliasMap = BTreeMap<String, String>;

/// ASIC-local port name to canonical port name.
pub type PortAsicMap = BTreeMap<String, String>;

/// Canonical port name to configured port index.
pub type PortIndexMap = BTreeMap<String, u32>;

/// Canonical port name to global physical index.
pub type PortIndexAssignment = BTreeMap<String, u32>;

/// Formats a canonical port name.
pub fn ethernet(lane: u32) -> String {
    format!("Ethernet{}", lane)
}

/// The three maps produced for one SKU / namespace.
///
/// Always returned together; `asic` and `index` are empty unless the port
/// table supplied the corresponding attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAliasMaps {
    /// Alias to canonical name.
    pub alias: PortAliasMap,
    /// ASIC-local name to canonical name.
    pub asic: PortAsicMap,
    /// Canonical name to index.
    pub index: PortIndexMap,
}

impl PortAliasMaps {
    /// Maps holding only an alias table.
    pub fn from_aliases(alias: PortAliasMap) -> Self {
        Self {
            alias,
            ..Default::default()
        }
    }

    /// Canonical name for an alias.
    pub fn name_for_alias(&self, alias: &str) -> Option<&str> {
        self.alias.get(alias).map(String::as_str)
    }

    /// Reverse lookup: the alias of a canonical name.
    pub fn alias_for_name(&self, name: &str) -> Option<&str> {
        self.alias
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(a, _)| a.as_str())
    }

    /// Consumes the maps into the `(alias, asic, index)` triple.
    pub fn into_parts(self) -> (PortAliasMap, PortAsicMap, PortIndexMap) {
        (self.alias, self.asic, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let mut alias = PortAliasMap::new();
        alias.insert("etp1".to_string(), ethernet(0));
        alias.insert("etp2".to_string(), ethernet(4));
        let maps = PortAliasMaps::from_aliases(alias);

        assert_eq!(maps.name_for_alias("etp2"), Some("Ethernet4"));
        assert_eq!(maps.alias_for_name("Ethernet0"), Some("etp1"));
        assert_eq!(maps.alias_for_name("Ethernet8"), None);

        let (alias, asic, index) = maps.into_parts();
        assert_eq!(alias.len(), 2);
        assert!(asic.is_empty());
        assert!(index.is_empty());
    }
}
