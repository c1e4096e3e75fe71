//! Test fixtures for common device outputs
//!
//! Provides canned outputs for EOS neighbors, CONFIG_DB port tables and
//! SONiC platform `show` commands.

use serde_json::{json, Map, Value};

/// EOS `eos_command` JSON outputs
pub mod eos_fixtures {
    use super::*;

    /// BGP summary with the given `(peer, state, description)` triples
    pub fn bgp_summary(peers: &[(&str, &str, Option<&str>)]) -> Value {
        let mut table = Map::new();
        for (ip, state, desc) in peers {
            let mut peer = Map::new();
            peer.insert("peerState".to_string(), json!(state));
            if let Some(desc) = desc {
                peer.insert("description".to_string(), json!(desc));
            }
            table.insert(ip.to_string(), Value::Object(peer));
        }
        json!({ "vrfs": { "default": { "peers": table } } })
    }

    /// BGP summary printed while the Rib agent is shut down
    pub fn bgp_inactive() -> Value {
        json!({ "vrfs": {}, "warnings": ["BGP inactive"] })
    }

    /// `show interfaces <intf> status` JSON
    pub fn interface_status(interface: &str, autoneg: bool) -> Value {
        json!({
            "interfaceStatuses": {
                interface: {
                    "autoNegotiateActive": autoneg,
                    "linkStatus": "connected"
                }
            }
        })
    }

    /// `show interfaces <intf> transceiver properties` text
    pub fn transceiver_properties(interface: &str, speed: &str) -> String {
        format!(
            "Name: Et{}\nAdministrative Speed: auto\nOperational Speed: {}\n\
             Operational Duplex: full\n",
            interface.trim_start_matches("Ethernet"),
            speed
        )
    }

    /// `show interfaces <intf> capabilities` text
    pub fn capabilities(interface: &str, speeds: &str) -> String {
        format!(
            "{}\n  Model: DCS-7060CX-32S\n  Type: 100GBASE-CR4\n  Speed/Duplex: {}\n",
            interface, speeds
        )
    }
}

/// CONFIG_DB `PORT` table fixtures
pub mod port_table_fixtures {
    use super::*;

    /// A `PORT` table entry with optional attributes
    pub fn port_entry(alias: Option<&str>, asic_port_name: Option<&str>, index: Option<&str>) -> Value {
        let mut entry = Map::new();
        entry.insert("lanes".to_string(), json!("0,1,2,3"));
        if let Some(alias) = alias {
            entry.insert("alias".to_string(), json!(alias));
        }
        if let Some(asic) = asic_port_name {
            entry.insert("asic_port_name".to_string(), json!(asic));
        }
        if let Some(index) = index {
            entry.insert("index".to_string(), json!(index));
        }
        Value::Object(entry)
    }

    /// A `config_db.json` document containing only the `PORT` table
    pub fn config_db(ports: &[(&str, Value)]) -> Value {
        let table: Map<String, Value> = ports
            .iter()
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect();
        json!({ "PORT": table })
    }

    /// A multi-ASIC linecard namespace: `count` ports starting at `first`
    /// with `Ethernet1/<n>` aliases, `Eth<n>-ASIC<asic>` ASIC names and
    /// 1-based indices
    pub fn linecard_namespace(asic: u32, first: u32, count: u32) -> Value {
        let ports: Vec<(String, Value)> = (0..count)
            .map(|i| {
                let n = first + i;
                (
                    format!("Ethernet{}", n * 8),
                    port_entry(
                        Some(&format!("Ethernet1/{}", n + 1)),
                        Some(&format!("Eth{}-ASIC{}", i, asic)),
                        Some(&(n + 1).to_string()),
                    ),
                )
            })
            .collect();
        let borrowed: Vec<(&str, Value)> =
            ports.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        config_db(&borrowed)
    }
}

/// Platform `show` command outputs
pub mod platform_fixtures {
    /// `show platform fan` output for the given `(drawer, fan, speed, status)` rows
    pub fn show_platform_fan(rows: &[(&str, &str, &str, &str)]) -> String {
        let mut out = String::from(
            "  Drawer    LED    FAN    Speed    Direction    Presence    Status\n\
             --------  -----  -----  -------  -----------  ----------  --------\n",
        );
        for (drawer, fan, speed, status) in rows {
            out.push_str(&format!(
                "{:>8}  {:>5}  {:>5}  {:>7}  {:>11}  {:>10}  {:>8}\n",
                drawer, "green", fan, speed, "intake", "Present", status
            ));
        }
        out
    }

    /// `supervisorctl status thermalctld` output
    pub fn supervisor_status(daemon: &str, status: &str) -> String {
        format!("{}                      {}   pid 101, uptime 0:10:00", daemon, status)
    }
}
