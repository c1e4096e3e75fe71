//! Port-table sources.
//!
//! A [`PortTableSource`] yields the CONFIG_DB `PORT` table of a namespace.
//! Returning [`PortTableError::Unavailable`] tells the resolver to fall back
//! to the static SKU catalog.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::PortTableError;

/// The attributes of one `PORT` table entry the resolver consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// Front-panel alias.
    #[serde(default, deserialize_with = "string_or_number")]
    pub alias: Option<String>,
    /// ASIC-local port name.
    #[serde(default, deserialize_with = "string_or_number")]
    pub asic_port_name: Option<String>,
    /// Physical index, kept as text until the resolver needs it.
    #[serde(default, deserialize_with = "string_or_number")]
    pub index: Option<String>,
}

impl PortRecord {
    /// Builds a record from raw hash fields.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            alias: fields.get("alias").cloned(),
            asic_port_name: fields.get("asic_port_name").cloned(),
            index: fields.get("index").cloned(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_asic_port_name(mut self, name: impl Into<String>) -> Self {
        self.asic_port_name = Some(name.into());
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }
}

/// Canonical port name to record.
pub type PortTable = BTreeMap<String, PortRecord>;

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Provider of per-namespace port tables.
pub trait PortTableSource: Send + Sync {
    /// Port table of `namespace` (`None` for the default namespace).
    fn port_table(&self, namespace: Option<&str>) -> Result<PortTable, PortTableError>;
}

/// Parses `asic<N>` into `N`. `None` and the empty string are the default
/// namespace.
pub fn namespace_asic(namespace: Option<&str>) -> Result<Option<u32>, PortTableError> {
    match namespace {
        None | Some("") => Ok(None),
        Some(ns) => ns
            .strip_prefix("asic")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse::<u32>().ok())
            .map(Some)
            .ok_or_else(|| PortTableError::InvalidNamespace(ns.to_string())),
    }
}

/// In-memory port tables keyed by namespace.
#[derive(Debug, Clone, Default)]
pub struct StaticPortTable {
    tables: HashMap<Option<String>, PortTable>,
}

impl StaticPortTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the table for `namespace` (`None` for the default namespace).
    pub fn with_namespace(mut self, namespace: Option<&str>, table: PortTable) -> Self {
        self.tables.insert(namespace.map(str::to_string), table);
        self
    }

    /// Adds the default-namespace table.
    pub fn with_default(self, table: PortTable) -> Self {
        self.with_namespace(None, table)
    }
}

impl PortTableSource for StaticPortTable {
    fn port_table(&self, namespace: Option<&str>) -> Result<PortTable, PortTableError> {
        let key = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        self.tables
            .get(&key)
            .cloned()
            .ok_or_else(|| PortTableError::unavailable(format!("no table for namespace {:?}", key)))
    }
}

#[derive(Deserialize)]
struct ConfigDbDocument {
    #[serde(rename = "PORT", default)]
    port: PortTable,
}

/// Reads `PORT` from `config_db.json` / `config_db<N>.json` files.
#[derive(Debug, Clone)]
pub struct ConfigDbJsonSource {
    dir: PathBuf,
}

impl ConfigDbJsonSource {
    /// Source reading files from `dir` (normally `/etc/sonic`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the configuration of `namespace`.
    pub fn file_for(&self, namespace: Option<&str>) -> Result<PathBuf, PortTableError> {
        let name = match namespace_asic(namespace)? {
            None => "config_db.json".to_string(),
            Some(n) => format!("config_db{}.json", n),
        };
        Ok(self.dir.join(name))
    }
}

impl PortTableSource for ConfigDbJsonSource {
    fn port_table(&self, namespace: Option<&str>) -> Result<PortTable, PortTableError> {
        let path = self.file_for(namespace)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config_db file");
                return Err(PortTableError::unavailable(format!(
                    "{} not found",
                    path.display()
                )));
            }
            Err(source) => return Err(PortTableError::Io { path, source }),
        };

        let doc: ConfigDbDocument = serde_json::from_str(&content)
            .map_err(|source| PortTableError::Parse { path: path.clone(), source })?;
        debug!(path = %path.display(), ports = doc.port.len(), "Loaded PORT table");
        Ok(doc.port)
    }
}
