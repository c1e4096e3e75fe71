//! MACsec configuration helpers for SONiC testbeds.
//!
//! Profiles and port bindings are written to CONFIG_DB through
//! `sonic-db-cli` on any [`sonic_mgmt_common::Host`]:
//!
//! - [`set_macsec_profile`] / [`delete_macsec_profile`]
//! - [`enable_macsec_port`] / [`disable_macsec_port`]
//! - [`setup_macsec_configuration`] / [`cleanup_macsec_configuration`]
//!   across all control links of a testbed

pub mod error;
pub mod links;
pub mod profile;

pub use error::{MacsecError, MacsecResult};
pub use links::{
    cleanup_macsec_configuration, count_mka_sessions, get_eth_ifname, mka_session_count,
    neighbor_priority, setup_macsec_configuration, startup_all_ctrl_links, CtrlLink, CtrlLinks,
    MKA_CLEAR_TIMEOUT,
};
pub use profile::{
    delete_macsec_profile, disable_macsec_port, enable_macsec_port, set_macsec_profile,
    CipherSuite, MacsecPolicy, MacsecProfile,
};
