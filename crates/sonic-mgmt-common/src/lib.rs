//! Common infrastructure for SONiC test-management helpers.
//!
//! This crate provides what every device helper in the workspace needs:
//!
//! - [`Host`]: run a named module with arguments on a device and get
//!   structured output (`stdout`, `stdout_lines`, `failed`, `changed`)
//! - [`LocalHost`] and [`AnsibleHost`]: the two concrete hosts
//! - [`config_db`]: CONFIG_DB set/delete through `sonic-db-cli`
//! - [`shell`]: local command execution with proper quoting
//! - [`show`]: parser for SONiC `show` tables
//! - [`wait_until`]: condition polling
//! - [`MgmtConfig`]: TOML configuration
//!
//! # Example
//!
//! ```ignore
//! use sonic_mgmt_common::{AnsibleHost, Host, MgmtConfig};
//!
//! let config = MgmtConfig::load()?;
//! let dut = AnsibleHost::from_config("vlab-01", &config.ansible);
//! let rows = dut.show_and_parse("show platform fan").await?;
//! ```

pub mod ansible;
pub mod config;
pub mod config_db;
pub mod error;
pub mod host;
pub mod local;
pub mod shell;
pub mod show;
pub mod utilities;

// Re-export commonly used items at crate root
pub use ansible::AnsibleHost;
pub use config::{AnsibleConfig, DatabaseConfig, MgmtConfig};
pub use config_db::{parse_hgetall, ConfigDb, ConfigDbKey, SonicDbCli};
pub use error::{MgmtError, MgmtResult};
pub use host::{ExtraVars, Host, ModuleInvocation, ModuleResult};
pub use local::LocalHost;
pub use show::{parse_show_table, ShowRow};
pub use utilities::wait_until;
