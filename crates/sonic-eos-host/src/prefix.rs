//! IP network prefixes as accepted by `show ip bgp <prefix>`.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::EosHostError;

/// An IPv4 or IPv6 network. Host bits must be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpPrefix {
    addr: IpAddr,
    len: u8,
}

impl IpPrefix {
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }
}

fn host_bits_clear(addr: IpAddr, len: u8) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            len >= 32 || bits & (u32::MAX >> len) == 0
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            len >= 128 || bits & (u128::MAX >> len) == 0
        }
    }
}

impl FromStr for IpPrefix {
    type Err = EosHostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EosHostError::InvalidPrefix(s.to_string());
        let (addr, len) = match s.trim().split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s.trim(), None),
        };

        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        let len = match len {
            Some(len) => len.parse::<u8>().map_err(|_| invalid())?,
            None => max,
        };
        if len > max || !host_bits_clear(addr, len) {
            return Err(invalid());
        }
        Ok(Self { addr, len })
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}
