//! Test infrastructure for SONiC test-management helpers
//!
//! Provides:
//! - A scripted [`MockHost`] that records every module call
//! - Canned EOS, port-table and thermal outputs
//! - Assertion helpers over recorded calls

pub mod fixtures;
mod mock_host;
mod verification;

pub use fixtures::*;
pub use mock_host::{Matcher, MockHost};
pub use verification::*;
