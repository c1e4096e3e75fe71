//! Front-panel port alias resolution for SONiC hardware SKUs.
//!
//! Test tooling addresses ports by the names printed on the switch
//! (`Ethernet3/1`, `etp12`, `fortyGigE0/8`) while SONiC itself uses
//! canonical `Ethernet<N>` names. This crate maps between the two:
//!
//! - [`PortAliasResolver`]: alias, ASIC-name and index maps for a SKU,
//!   taken from the CONFIG_DB `PORT` table when one is available and from
//!   the built-in [`SkuRegistry`] otherwise
//! - [`index_ports`]: global physical index assignment on multi-ASIC
//!   systems
//! - [`PortTableSource`] implementations: `config_db.json` files, CONFIG_DB
//!   over Redis, and in-memory tables
//!
//! # Example
//!
//! ```ignore
//! use sonic_port_alias::{ConfigDbJsonSource, PortAliasResolver};
//!
//! let resolver = PortAliasResolver::new().with_source(ConfigDbJsonSource::new("/etc/sonic"));
//! let maps = resolver.resolve("Arista-7060CX-32S-C32", None)?;
//! assert_eq!(maps.name_for_alias("Ethernet2/1"), Some("Ethernet4"));
//! ```

pub mod error;
pub mod index;
pub mod maps;
pub mod port_table;
pub mod redis_source;
pub mod resolver;
pub mod rules;
pub mod sku;

pub use error::{PortAliasError, PortAliasResult, PortTableError};
pub use index::{index_ports, index_ports_for, is_backplane, AsicId, BACKPLANE_MARKER};
pub use maps::{PortAliasMap, PortAliasMaps, PortAsicMap, PortIndexAssignment, PortIndexMap};
pub use port_table::{ConfigDbJsonSource, PortRecord, PortTable, PortTableSource, StaticPortTable};
pub use redis_source::RedisPortTableSource;
pub use resolver::{maps_from_port_table, resolve_static, PortAliasResolver};
pub use sku::{
    is_known_sku, registered_skus, uses_port_config_index, SkuRegistry,
    HWSKU_WITH_PORT_INDEX_FROM_PORT_CONFIG,
};
