//! Test-management configuration file.
//!
//! Loads settings from a TOML file. Default location:
//! `/etc/sonic/sonic-mgmt.toml`. A missing file yields defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MgmtError, MgmtResult};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/sonic-mgmt.toml";

/// Ansible settings for remote module execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsibleConfig {
    /// Ad-hoc runner binary.
    #[serde(default = "default_ansible_cmd")]
    pub ansible_cmd: String,

    /// Playbook runner binary.
    #[serde(default = "default_playbook_cmd")]
    pub playbook_cmd: String,

    /// Inventory file or directory.
    #[serde(default)]
    pub inventory: Option<PathBuf>,

    /// Module timeout in seconds.
    #[serde(default = "default_module_timeout")]
    pub module_timeout_secs: u64,
}

/// CONFIG_DB access settings for port-table lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Redis host
    #[serde(default = "default_redis_host")]
    pub redis_host: String,

    /// Redis port for the default namespace
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,

    /// Redis database number for CONFIG_DB
    #[serde(default = "default_config_db_number")]
    pub config_db_number: u32,

    /// Directory holding `config_db.json` / `config_db<N>.json`
    #[serde(default = "default_config_db_dir")]
    pub config_db_dir: PathBuf,

    /// Redis port per ASIC namespace (e.g. `asic0 = 6380`)
    #[serde(default)]
    pub namespace_ports: BTreeMap<String, u16>,
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MgmtConfig {
    /// Ansible configuration
    #[serde(default)]
    pub ansible: AnsibleConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

fn default_ansible_cmd() -> String {
    crate::shell::ANSIBLE_CMD.to_string()
}

fn default_playbook_cmd() -> String {
    crate::shell::ANSIBLE_PLAYBOOK_CMD.to_string()
}

fn default_module_timeout() -> u64 {
    120
}

fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_config_db_number() -> u32 {
    4
}

fn default_config_db_dir() -> PathBuf {
    PathBuf::from("/etc/sonic")
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        Self {
            ansible_cmd: default_ansible_cmd(),
            playbook_cmd: default_playbook_cmd(),
            inventory: None,
            module_timeout_secs: default_module_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            config_db_number: default_config_db_number(),
            config_db_dir: default_config_db_dir(),
            namespace_ports: BTreeMap::new(),
        }
    }
}

impl DatabaseConfig {
    /// Redis port for a namespace; `None` selects the default namespace.
    pub fn port_for(&self, namespace: Option<&str>) -> Option<u16> {
        match namespace {
            None => Some(self.redis_port),
            Some(ns) => self.namespace_ports.get(ns).copied(),
        }
    }
}

impl MgmtConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> MgmtResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                MgmtError::invalid_config(path.display().to_string(), e.to_string())
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(MgmtError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> MgmtResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Validate configuration
    pub fn validate(&self) -> MgmtResult<()> {
        if self.database.redis_port == 0 {
            return Err(MgmtError::invalid_config("redis_port", "must be > 0"));
        }
        if let Some((ns, _)) = self.database.namespace_ports.iter().find(|(_, p)| **p == 0) {
            return Err(MgmtError::invalid_config(
                format!("namespace_ports.{}", ns),
                "must be > 0",
            ));
        }
        if self.ansible.ansible_cmd.trim().is_empty() {
            return Err(MgmtError::invalid_config("ansible_cmd", "must not be empty"));
        }
        if self.ansible.module_timeout_secs == 0 {
            return Err(MgmtError::invalid_config(
                "module_timeout_secs",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MgmtConfig::default();
        assert_eq!(config.database.redis_host, "127.0.0.1");
        assert_eq!(config.database.redis_port, 6379);
        assert_eq!(config.database.config_db_number, 4);
        assert_eq!(config.database.config_db_dir, PathBuf::from("/etc/sonic"));
        assert_eq!(config.ansible.ansible_cmd, "ansible");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[ansible]
inventory = "/data/inventory/lab"

[database]
redis_port = 6380

[database.namespace_ports]
asic0 = 6381
asic1 = 6382
"#;
        let config: MgmtConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.ansible.inventory,
            Some(PathBuf::from("/data/inventory/lab"))
        );
        assert_eq!(config.database.port_for(None), Some(6380));
        assert_eq!(config.database.port_for(Some("asic1")), Some(6382));
        assert_eq!(config.database.port_for(Some("asic7")), None);
        // Unspecified values should use defaults
        assert_eq!(config.ansible.playbook_cmd, "ansible-playbook");
    }

    #[test]
    fn test_validate_invalid_ports() {
        let mut config = MgmtConfig::default();
        config.database.redis_port = 0;
        assert!(config.validate().is_err());

        let mut config = MgmtConfig::default();
        config.database.namespace_ports.insert("asic0".to_string(), 0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("namespace_ports.asic0"));
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = MgmtConfig::load_or_default("/nonexistent/sonic-mgmt.toml").unwrap();
        assert_eq!(config, MgmtConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nconfig_db_dir = \"/tmp/cfg\"").unwrap();
        let config = MgmtConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.database.config_db_dir, PathBuf::from("/tmp/cfg"));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database\nredis_port = ").unwrap();
        assert!(matches!(
            MgmtConfig::load_or_default(file.path()),
            Err(MgmtError::InvalidConfig { .. })
        ));
    }
}
