//! CONFIG_DB-backed port table.
//!
//! Reads the `PORT|*` hashes of CONFIG_DB. Each namespace has its own Redis
//! endpoint, taken from [`DatabaseConfig::namespace_ports`]. A database that
//! cannot be reached is reported as unavailable so the resolver falls back
//! to the SKU catalog.

use std::collections::HashMap;
use std::time::Duration;

use redis::{Commands, RedisError};
use tracing::{debug, instrument};

use sonic_mgmt_common::DatabaseConfig;

use crate::error::PortTableError;
use crate::port_table::{PortRecord, PortTable, PortTableSource};

/// CONFIG_DB table separator.
const TABLE_SEPARATOR: char = '|';

/// CONFIG_DB table name.
const PORT_TABLE: &str = "PORT";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Port table read from CONFIG_DB over Redis.
#[derive(Debug, Clone)]
pub struct RedisPortTableSource {
    config: DatabaseConfig,
    connect_timeout: Duration,
}

impl RedisPortTableSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Connection URL for `namespace`, or `None` when no endpoint is
    /// configured for it.
    pub fn url_for(&self, namespace: Option<&str>) -> Option<String> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.config.port_for(namespace).map(|port| {
            format!(
                "redis://{}:{}/{}",
                self.config.redis_host, port, self.config.config_db_number
            )
        })
    }
}

/// Connection-level failures mean the database is not there at all.
fn classify(err: RedisError) -> PortTableError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_io_error() {
        PortTableError::unavailable(err.to_string())
    } else {
        PortTableError::Redis(err)
    }
}

impl PortTableSource for RedisPortTableSource {
    #[instrument(skip(self))]
    fn port_table(&self, namespace: Option<&str>) -> Result<PortTable, PortTableError> {
        let url = self.url_for(namespace).ok_or_else(|| {
            PortTableError::unavailable(format!("no CONFIG_DB endpoint for namespace {:?}", namespace))
        })?;

        let client = redis::Client::open(url.as_str())?;
        let mut conn = client
            .get_connection_with_timeout(self.connect_timeout)
            .map_err(classify)?;

        let pattern = format!("{}{}*", PORT_TABLE, TABLE_SEPARATOR);
        let keys: Vec<String> = conn.keys(&pattern)?;

        let mut table = PortTable::new();
        for key in keys {
            let Some((_, port)) = key.split_once(TABLE_SEPARATOR) else {
                continue;
            };
            let fields: HashMap<String, String> = conn.hgetall(&key)?;
            table.insert(port.to_string(), PortRecord::from_fields(&fields));
        }

        debug!(url = %url, ports = table.len(), "Loaded PORT table from CONFIG_DB");
        Ok(table)
    }
}
