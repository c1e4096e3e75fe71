//! Arista EOS neighbor helpers.
//!
//! [`EosHost`] wraps any [`sonic_mgmt_common::Host`] and adds:
//!
//! - per-module connection variables (EOS CLI for `eos_*` modules, Linux
//!   shell otherwise)
//! - interface shut/no-shut, link state and LACP rate
//! - BGP agent control, neighbor no-shut and session state checks
//! - port speed and auto-negotiation
//! - fanout playbook execution from the test server
//!
//! # Example
//!
//! ```ignore
//! use sonic_eos_host::{EosCredentials, EosHost};
//! use sonic_mgmt_common::AnsibleHost;
//!
//! let nbr = EosHost::new(AnsibleHost::new("ARISTA01T1"), EosCredentials::new("admin", "pw"));
//! nbr.shutdown("Ethernet1").await?;
//! assert!(!nbr.check_intf_link_state("Ethernet1").await?);
//! ```

pub mod bgp;
pub mod connection;
pub mod error;
pub mod host;
pub mod prefix;
pub mod speed;

pub use bgp::{is_bgp_inactive, SessionTally};
pub use connection::{EosCredentials, EOS_MODULE_PREFIX};
pub use error::{EosHostError, EosResult};
pub use host::EosHost;
pub use prefix::IpPrefix;
pub use speed::{eos_speed_keyword, parse_operational_speed, parse_supported_speeds};
