//! Hardware SKU to alias-generator registry.
//!
//! The built-in catalog is assembled once, on first use, in declaration
//! order. Registering an identifier that is already present keeps the
//! earlier rule.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::maps::PortAliasMap;
use crate::rules;

/// Pure generator producing the alias table of one SKU.
pub type AliasRule = fn() -> PortAliasMap;

/// SKUs whose port index is taken from the port table.
pub const HWSKU_WITH_PORT_INDEX_FROM_PORT_CONFIG: &[&str] = &["8800-LC-48H-O", "88-LC0-36FH-MO"];

static CATALOG: Lazy<Arc<SkuRegistry>> = Lazy::new(|| Arc::new(SkuRegistry::builtin()));

/// Ordered SKU registry.
#[derive(Debug, Clone, Default)]
pub struct SkuRegistry {
    order: Vec<String>,
    rules: HashMap<String, AliasRule>,
}

impl SkuRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared built-in catalog.
    pub fn catalog() -> Arc<SkuRegistry> {
        Arc::clone(&CATALOG)
    }

    /// Registers a rule. Returns `false` and keeps the existing rule when
    /// `sku` is already registered.
    pub fn register(&mut self, sku: &str, rule: AliasRule) -> bool {
        if self.rules.contains_key(sku) {
            debug!(sku = %sku, "Duplicate SKU declaration ignored");
            return false;
        }
        self.order.push(sku.to_string());
        self.rules.insert(sku.to_string(), rule);
        true
    }

    /// Registers one rule for several SKUs.
    pub fn register_all(&mut self, skus: &[&str], rule: AliasRule) {
        for sku in skus {
            self.register(sku, rule);
        }
    }

    /// Rule for `sku`, if registered.
    pub fn get(&self, sku: &str) -> Option<AliasRule> {
        self.rules.get(sku).copied()
    }

    /// Whether `sku` has a registered rule.
    pub fn contains(&self, sku: &str) -> bool {
        self.rules.contains_key(sku)
    }

    /// Registered SKUs in declaration order.
    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Alias table for `sku`, falling back to [`rules::default_map`].
    pub fn generate(&self, sku: &str) -> PortAliasMap {
        match self.get(sku) {
            Some(rule) => rule(),
            None => {
                debug!(sku = %sku, "No alias rule for SKU, using default map");
                rules::default_map()
            }
        }
    }

    /// Builds the built-in catalog.
    pub fn builtin() -> Self {
        let mut reg = Self::new();

        reg.register("Force10-S6000", rules::force10_s6000);
        reg.register("Force10-S6100", rules::force10_s6100);
        reg.register("Force10-Z9100", rules::force10_z9100);
        reg.register("DellEMC-Z9332f-M-O16C64", rules::dellemc_z9332f_m_o16c64);
        reg.register("DellEMC-Z9332f-O32", rules::dellemc_z9332f_o32);
        reg.register("Arista-7050-QX32", rules::arista_7050_qx32);
        reg.register("Arista-7050-QX-32S", rules::arista_7050_qx_32s);
        reg.register("Arista-7280CR3-C40", rules::arista_7280cr3_c40);
        reg.register_all(
            &["Arista-7260CX3-C64", "Arista-7170-64C", "Arista-7260CX3-Q64"],
            rules::uniform_64,
        );
        reg.register_all(
            &[
                "Arista-7060CX-32S-C32",
                "Arista-7060CX-32S-Q32",
                "Arista-7060CX-32S-C32-T1",
                "Arista-7170-32CD-C32",
                "Arista-7050CX3-32S-C32",
            ],
            rules::uniform_32,
        );
        reg.register("Mellanox-SN2700-D40C8S8", rules::mellanox_sn2700_d40c8s8);
        reg.register("Mellanox-SN2700-D48C8", rules::mellanox_sn2700_d48c8);
        reg.register_all(&["Mellanox-SN2700", "ACS-MSN2700"], rules::etp_32);
        reg.register("Arista-7060CX-32S-D48C8", rules::arista_7060cx_32s_d48c8);
        reg.register("Arista-7260CX3-D108C8", rules::arista_7260cx3_d108c8);
        reg.register_all(
            &["Arista-7800R3-48CQ-LC", "Arista-7800R3K-48CQ-LC"],
            rules::arista_7800r3_48cq_lc,
        );
        reg.register("INGRASYS-S9100-C32", rules::uniform_32);
        reg.register_all(
            &["INGRASYS-S9100-C32", "INGRASYS-S9130-32X", "INGRASYS-S8810-32Q"],
            rules::uniform_32,
        );
        reg.register("INGRASYS-S8900-54XC", rules::ingrasys_s8900_54xc);
        reg.register("INGRASYS-S8900-64XC", rules::ingrasys_s8900_64xc);
        reg.register("Accton-AS7712-32X", rules::accton_as7712_32x);
        reg.register("Celestica-DX010-C32", rules::etp_32);
        reg.register("Seastone-DX010", rules::seastone_dx010);
        reg.register_all(
            &["Celestica-E1031-T48S4", "Nokia-7215", "Nokia-M0-7215"],
            rules::etp_52_serial,
        );
        reg.register("et6448m", rules::et6448m);
        reg.register("Nokia-IXR7250E-36x400G", rules::identity_36);
        reg.register("Nokia-IXR7250E-SUP-10", rules::supervisor);
        reg.register("newport", rules::newport);
        reg.register("32x100Gb", rules::identity_32);
        reg.register("36x100Gb", rules::identity_36);
        reg.register("64x100Gb", rules::identity_64);
        reg.register_all(&["8800-LC-48H-O", "88-LC0-36FH-MO"], rules::identity_48);
        reg.register("msft_multi_asic_vs", rules::msft_multi_asic_vs);
        reg.register("msft_four_asic_vs", rules::msft_four_asic_vs);
        reg.register_all(&["B6510-48VS8CQ", "RA-B6510-48V8C"], rules::b6510_48vs8cq);
        reg.register("RA-B6910-64C", rules::ra_b6910_64c);

        reg
    }
}

/// Built-in SKUs in declaration order.
pub fn registered_skus() -> Vec<String> {
    SkuRegistry::catalog().skus().map(str::to_string).collect()
}

/// Whether the built-in catalog has a rule for `hwsku`.
pub fn is_known_sku(hwsku: &str) -> bool {
    SkuRegistry::catalog().contains(hwsku)
}

/// Whether `hwsku` takes its port index from the port table.
pub fn uses_port_config_index(hwsku: &str) -> bool {
    HWSKU_WITH_PORT_INDEX_FROM_PORT_CONFIG.contains(&hwsku)
}
