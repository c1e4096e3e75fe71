//! Global physical index assignment for multi-ASIC systems.

use std::fmt;
use std::str::FromStr;

use crate::error::{PortAliasError, PortAliasResult};
use crate::maps::PortIndexAssignment;

/// Substring marking backplane (back-end) ports.
pub const BACKPLANE_MARKER: &str = "BP";

/// Numeric ASIC identifier.
///
/// Parses from plain decimal text such as `"1"`. Namespace names such as
/// `"asic1"` go through [`AsicId::from_namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AsicId(u32);

impl AsicId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Parses an ASIC namespace name, `asic<N>`.
    pub fn from_namespace(namespace: &str) -> PortAliasResult<Self> {
        namespace
            .trim()
            .strip_prefix("asic")
            .ok_or_else(|| PortAliasError::InvalidAsicId(namespace.to_string()))
            .and_then(|digits| parse_digits(digits, namespace))
    }
}

fn parse_digits(digits: &str, original: &str) -> PortAliasResult<AsicId> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortAliasError::InvalidAsicId(original.to_string()));
    }
    digits
        .parse::<u32>()
        .map(AsicId)
        .map_err(|_| PortAliasError::InvalidAsicId(original.to_string()))
}

impl From<u32> for AsicId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for AsicId {
    type Err = PortAliasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_digits(s.trim(), s)
    }
}

impl fmt::Display for AsicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true for backplane port names.
pub fn is_backplane(port: &str) -> bool {
    port.contains(BACKPLANE_MARKER)
}

/// Assigns global indices to the ports of one ASIC.
///
/// Front-panel ports get consecutive indices starting at
/// `asic_id * <front-panel count>`. Backplane ports are numbered from the
/// same offset. Input order is kept; the caller sorts.
///
/// Fails with [`PortAliasError::IndexOverflow`] when an index would not
/// fit in `u32`.
pub fn index_ports<S: AsRef<str>>(
    asic_id: Option<AsicId>,
    sorted_port_names: &[S],
) -> PortAliasResult<PortIndexAssignment> {
    let (back_end, front_end): (Vec<&str>, Vec<&str>) = sorted_port_names
        .iter()
        .map(AsRef::as_ref)
        .partition(|p| is_backplane(p));

    let id = asic_id.map_or(0, AsicId::get);
    let overflow = || PortAliasError::IndexOverflow {
        asic_id: id,
        ports: sorted_port_names.len(),
    };

    let front_count = u32::try_from(front_end.len()).map_err(|_| overflow())?;
    let back_count = u32::try_from(back_end.len()).map_err(|_| overflow())?;
    let offset = id.checked_mul(front_count).ok_or_else(overflow)?;
    if let Some(last) = front_count.max(back_count).checked_sub(1) {
        offset.checked_add(last).ok_or_else(overflow)?;
    }

    let mut assignment = PortIndexAssignment::new();
    for (k, port) in (0..front_count).zip(front_end) {
        assignment.insert(port.to_string(), offset + k);
    }
    for (k, port) in (0..back_count).zip(back_end) {
        assignment.insert(port.to_string(), offset + k);
    }
    Ok(assignment)
}

/// [`index_ports`] taking the ASIC identifier as text.
///
/// `None` and the empty string select offset 0; anything else must be a
/// decimal [`AsicId`].
pub fn index_ports_for<S: AsRef<str>>(
    asic_id: Option<&str>,
    sorted_port_names: &[S],
) -> PortAliasResult<PortIndexAssignment> {
    let asic_id = match asic_id {
        None | Some("") => None,
        Some(text) => Some(text.parse::<AsicId>()?),
    };
    index_ports(asic_id, sorted_port_names)
}
