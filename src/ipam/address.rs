use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid cidr `{0}`")]
    Cidr(String),
    #[error("invalid address `{0}`")]
    Address(String),
}

/// An IPv4 network in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Net {
    network: u32,
    mask: u32,
}

impl Ipv4Net {
    pub fn parse(cidr: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::Cidr(cidr.to_owned());
        let (addr, prefix) = cidr.trim().split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u32 = prefix.parse().map_err(|_| invalid())?;
        if prefix > 32 {
            return Err(invalid());
        }
        let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
        Ok(Self {
            network: u32::from(addr) & mask,
            mask,
        })
    }

    /// Offset of `addr` from the network address, if the network contains it.
    pub fn offset_of(&self, addr: Ipv4Addr) -> Option<u64> {
        let addr = u32::from(addr);
        (addr & self.mask == self.network).then(|| u64::from(addr - self.network))
    }
}

/// Parses an interface address as recorded on an endpoint, either bare (`10.0.0.5`) or
/// with a prefix length (`10.0.0.5/24`).
///
/// Returns `None` for empty and IPv6 addresses, which never come from an IPv4 pool.
pub fn parse_interface_address(address: &str) -> Result<Option<Ipv4Addr>, ParseError> {
    let address = address.trim();
    if address.is_empty() {
        return Ok(None);
    }
    let bare = address.split_once('/').map_or(address, |(ip, _)| ip);
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => Ok(Some(ip)),
        Ok(IpAddr::V6(_)) => Ok(None),
        Err(_) => Err(ParseError::Address(address.to_owned())),
    }
}
