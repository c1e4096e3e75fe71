//! Resolution from `config_db.json` files
//!
//! Writes multi-ASIC linecard configurations to a temporary directory and
//! resolves them the way the test harness does on a chassis.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::tempdir;

use sonic_mgmt_test::fixtures::port_table_fixtures;
use sonic_port_alias::{
    index_ports_for, ConfigDbJsonSource, PortAliasError, PortAliasResolver, PortTableError,
};

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

#[test]
fn test_linecard_namespaces() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "config_db0.json", &port_table_fixtures::linecard_namespace(0, 0, 4));
    write_json(dir.path(), "config_db1.json", &port_table_fixtures::linecard_namespace(1, 4, 4));

    let resolver = PortAliasResolver::new().with_source(ConfigDbJsonSource::new(dir.path()));

    let asic0 = resolver.resolve("8800-LC-48H-O", Some("asic0")).unwrap();
    assert_eq!(asic0.alias.len(), 4);
    assert_eq!(asic0.name_for_alias("Ethernet1/1"), Some("Ethernet0"));
    assert_eq!(asic0.asic.get("Eth3-ASIC0").map(String::as_str), Some("Ethernet24"));
    assert_eq!(asic0.index.get("Ethernet24"), Some(&4));

    let asic1 = resolver.resolve("8800-LC-48H-O", Some("asic1")).unwrap();
    assert_eq!(asic1.name_for_alias("Ethernet1/5"), Some("Ethernet32"));
    assert_eq!(asic1.asic.get("Eth0-ASIC1").map(String::as_str), Some("Ethernet32"));
    assert_eq!(asic1.index.get("Ethernet32"), Some(&5));
}

#[test]
fn test_index_only_for_allow_listed_skus() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "config_db.json", &port_table_fixtures::linecard_namespace(0, 0, 2));

    let maps = PortAliasResolver::new()
        .with_source(ConfigDbJsonSource::new(dir.path()))
        .resolve("Arista-7800R3-48CQ-LC", None)
        .unwrap();
    assert_eq!(maps.alias.len(), 2);
    assert_eq!(maps.asic.len(), 2);
    assert!(maps.index.is_empty());
}

#[test]
fn test_missing_attributes() {
    let dir = tempdir().unwrap();
    let doc = port_table_fixtures::config_db(&[
        ("Ethernet0", port_table_fixtures::port_entry(Some("etp1"), None, None)),
        ("Ethernet4", port_table_fixtures::port_entry(None, Some("Eth1"), Some("2"))),
    ]);
    write_json(dir.path(), "config_db.json", &doc);

    let maps = PortAliasResolver::new()
        .with_source(ConfigDbJsonSource::new(dir.path()))
        .resolve("88-LC0-36FH-MO", None)
        .unwrap();
    assert_eq!(maps.alias.len(), 1);
    assert_eq!(maps.asic.get("Eth1").map(String::as_str), Some("Ethernet4"));
    assert_eq!(maps.index.len(), 1);
    assert_eq!(maps.index.get("Ethernet4"), Some(&2));
}

#[test]
fn test_missing_file_falls_back_to_catalog() {
    let dir = tempdir().unwrap();
    let maps = PortAliasResolver::new()
        .with_source(ConfigDbJsonSource::new(dir.path()))
        .resolve("Arista-7060CX-32S-C32", Some("asic2"))
        .unwrap();
    assert_eq!(maps.alias.len(), 32);
    assert_eq!(maps.name_for_alias("Ethernet2/1"), Some("Ethernet4"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config_db.json"), "{\"PORT\": [").unwrap();
    let err = PortAliasResolver::new()
        .with_source(ConfigDbJsonSource::new(dir.path()))
        .resolve("Force10-S6000", None)
        .unwrap_err();
    assert!(matches!(err, PortAliasError::PortTable(PortTableError::Parse { .. })));
}

#[test]
fn test_index_assignment_for_resolved_ports() {
    let dir = tempdir().unwrap();
    let mut doc = port_table_fixtures::linecard_namespace(1, 0, 2);
    doc["PORT"]["Ethernet-BP0"] = port_table_fixtures::port_entry(Some("Ethernet-BP0"), None, None);
    write_json(dir.path(), "config_db1.json", &doc);

    let maps = PortAliasResolver::new()
        .with_source(ConfigDbJsonSource::new(dir.path()))
        .resolve("msft_multi_asic_vs", Some("asic1"))
        .unwrap();
    let mut ports: Vec<&String> = maps.alias.values().collect();
    ports.sort();

    let assignment = index_ports_for(Some("1"), &ports).unwrap();
    assert_eq!(assignment.get("Ethernet0"), Some(&2));
    assert_eq!(assignment.get("Ethernet8"), Some(&3));
    assert_eq!(assignment.get("Ethernet-BP0"), Some(&2));

    // The namespace name is not an ASIC identifier.
    assert!(matches!(
        index_ports_for(Some("asic1"), &ports),
        Err(PortAliasError::InvalidAsicId(id)) if id == "asic1"
    ));
}
