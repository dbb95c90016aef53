/* src/classifier.rs */

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{GeoIpError, Result};

/// Blocks that are never publicly routable, in the order they are tested.
pub const PRIVATE_CIDRS: [&str; 5] = [
    "127.0.0.0/8",    // loopback
    "10.0.0.0/8",     // RFC1918
    "172.16.0.0/12",  // RFC1918
    "192.168.0.0/16", // RFC1918
    "169.254.0.0/16", // RFC3927 link-local
];

/// The parsed private range table.
///
/// Build it once at startup and share it behind an `Arc`; it is never
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct PrivateRanges {
    networks: Vec<IpNet>,
}

impl PrivateRanges {
    /// Parse the built-in CIDR table.
    pub fn new() -> Result<Self> {
        Self::from_cidrs(&PRIVATE_CIDRS)
    }

    fn from_cidrs(cidrs: &[&str]) -> Result<Self> {
        let networks = cidrs
            .iter()
            .map(|cidr| {
                cidr.parse::<IpNet>()
                    .map_err(|e| GeoIpError::InvalidRangeTable(format!("{cidr}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { networks })
    }

    /// Check whether `ip` falls inside any private range.
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are checked as the IPv4
    /// address they carry.
    pub fn is_private(&self, ip: &IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.networks.iter().any(|network| network.contains(&ip))
    }

    /// The parsed networks, in test order.
    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }
}
