//! Port alias resolution.
//!
//! The resolver first asks its [`PortTableSource`] for the namespace's
//! `PORT` table. When the source reports the table as unavailable, or no
//! source is configured, the alias table comes from the SKU catalog.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{PortAliasError, PortAliasResult, PortTableError};
use crate::maps::PortAliasMaps;
use crate::port_table::{PortTable, PortTableSource};
use crate::sku::{uses_port_config_index, SkuRegistry};

/// Resolves the alias, ASIC-name and index maps of a SKU.
pub struct PortAliasResolver {
    registry: Arc<SkuRegistry>,
    source: Option<Box<dyn PortTableSource>>,
}

impl Default for PortAliasResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PortAliasResolver {
    /// Resolver using only the built-in SKU catalog.
    pub fn new() -> Self {
        Self {
            registry: SkuRegistry::catalog(),
            source: None,
        }
    }

    /// Consults `source` before the catalog.
    pub fn with_source(mut self, source: impl PortTableSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Replaces the SKU catalog.
    pub fn with_registry(mut self, registry: Arc<SkuRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &SkuRegistry {
        &self.registry
    }

    /// Resolves the maps of `hwsku` in namespace `asic_name`.
    ///
    /// Unknown SKUs get the default map. Errors only come from a port-table
    /// source that was reached but failed.
    #[instrument(skip(self))]
    pub fn resolve(&self, hwsku: &str, asic_name: Option<&str>) -> PortAliasResult<PortAliasMaps> {
        if let Some(source) = &self.source {
            match source.port_table(asic_name) {
                Ok(table) => {
                    debug!(ports = table.len(), "Resolving from port table");
                    return maps_from_port_table(hwsku, &table);
                }
                Err(PortTableError::Unavailable(reason)) => {
                    info!(reason = %reason, "Port table unavailable, using SKU catalog");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(PortAliasMaps::from_aliases(self.registry.generate(hwsku)))
    }
}

/// Builds the three maps from a `PORT` table.
///
/// Index entries are only produced for SKUs that take their index from the
/// port table.
pub fn maps_from_port_table(hwsku: &str, table: &PortTable) -> PortAliasResult<PortAliasMaps> {
    let with_index = uses_port_config_index(hwsku);
    let mut maps = PortAliasMaps::default();

    for (port, record) in table {
        if let Some(alias) = &record.alias {
            maps.alias.insert(alias.clone(), port.clone());
        }
        if let Some(asic_name) = &record.asic_port_name {
            maps.asic.insert(asic_name.clone(), port.clone());
        }
        if let (true, Some(index)) = (with_index, &record.index) {
            let value = index
                .trim()
                .parse::<u32>()
                .map_err(|_| PortAliasError::InvalidPortIndex {
                    port: port.clone(),
                    value: index.clone(),
                })?;
            maps.index.insert(port.clone(), value);
        }
    }

    Ok(maps)
}

/// Resolves `hwsku` against the built-in catalog only.
pub fn resolve_static(hwsku: &str) -> PortAliasMaps {
    PortAliasMaps::from_aliases(SkuRegistry::catalog().generate(hwsku))
}
