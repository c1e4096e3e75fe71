//! Error types for alias resolution and port-table access.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for alias resolution.
pub type PortAliasResult<T> = Result<T, PortAliasError>;

/// Errors raised by the resolver and the index assignment.
#[derive(Debug, Error)]
pub enum PortAliasError {
    /// ASIC identifier is not numeric.
    #[error("Invalid ASIC identifier '{0}'")]
    InvalidAsicId(String),

    /// Global indices of this ASIC do not fit the index space.
    #[error("Index overflow for ASIC {asic_id} with {ports} ports")]
    IndexOverflow {
        /// Numeric ASIC identifier.
        asic_id: u32,
        /// Number of ports being indexed.
        ports: usize,
    },

    /// A port table record carries an index that is not an unsigned integer.
    #[error("Invalid index '{value}' for port {port}")]
    InvalidPortIndex {
        /// Canonical port name.
        port: String,
        /// Raw index value.
        value: String,
    },

    /// The port-table source failed after it was reached.
    #[error(transparent)]
    PortTable(#[from] PortTableError),
}

/// Errors raised by a [`crate::PortTableSource`].
#[derive(Debug, Error)]
pub enum PortTableError {
    /// The source cannot be consulted at all; resolution falls back to the
    /// static SKU catalog.
    #[error("Port table unavailable: {0}")]
    Unavailable(String),

    /// The namespace name is not `asic<N>`.
    #[error("Invalid namespace '{0}'")]
    InvalidNamespace(String),

    /// The port table could not be decoded.
    #[error("Failed to parse port table from {path}: {source}")]
    Parse {
        /// File or key the table was read from.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Reading the table failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// CONFIG_DB returned an error after the connection was established.
    #[error("CONFIG_DB error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl PortTableError {
    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Returns true if resolution should fall back to the SKU catalog.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
