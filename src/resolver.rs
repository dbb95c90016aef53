/* src/resolver.rs */

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::classifier::PrivateRanges;
use crate::error::{GeoIpError, Result};
use crate::geolocation::{self, Geolocation, GeolocationService};

/// Header consulted for the proxied client address.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Works out the address a request came from.
///
/// `X-Forwarded-For` candidates are trusted as given. The socket peer is
/// trusted only when it is publicly routable; a private peer is replaced by
/// the address the lookup service sees us coming from.
#[derive(Clone)]
pub struct ClientAddressResolver {
    ranges: Arc<PrivateRanges>,
    service: Arc<dyn GeolocationService>,
}

impl std::fmt::Debug for ClientAddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAddressResolver")
            .field("ranges", &self.ranges)
            .finish_non_exhaustive()
    }
}

impl ClientAddressResolver {
    /// Create a resolver sharing the given range table and lookup service.
    pub fn new(ranges: Arc<PrivateRanges>, service: Arc<dyn GeolocationService>) -> Self {
        Self { ranges, service }
    }

    /// Resolve the client address.
    ///
    /// `forwarded_for` is the raw `X-Forwarded-For` value (empty if absent),
    /// `remote_addr` the socket peer in `host:port` form.
    ///
    /// The result is a parsed `IpAddr`, so its textual form is canonical:
    /// `2001:DB8::1` in the header comes back as `2001:db8::1`.
    pub async fn resolve(&self, forwarded_for: &str, remote_addr: &str) -> Result<IpAddr> {
        if let Some(ip) = first_forwarded(forwarded_for) {
            return Ok(ip);
        }
        debug!(forwarded_for, "no usable forwarded address, using remote address");

        let host = split_host(remote_addr)
            .ok_or_else(|| GeoIpError::MalformedRemoteAddress(remote_addr.to_string()))?;
        let ip = host
            .parse::<IpAddr>()
            .map_err(|_| GeoIpError::NoValidAddress)?;

        if !self.ranges.is_private(&ip) {
            return Ok(ip);
        }

        info!(%ip, "remote address is private, asking lookup service for external address");
        geolocation::current_public_address(self.service.as_ref())
            .await
            .map_err(|e| GeoIpError::ExternalLookupFailed(Box::new(e)))
    }

    /// Fetch location data for an already resolved address.
    pub async fn locate(&self, ip: IpAddr) -> Result<Geolocation> {
        geolocation::lookup(self.service.as_ref(), ip).await
    }

    pub fn ranges(&self) -> &PrivateRanges {
        &self.ranges
    }
}

/// First candidate in a comma separated header that parses as an address.
///
/// Candidates are parsed exactly as split, so `" 5.6.7.8"` is not an address.
fn first_forwarded(value: &str) -> Option<IpAddr> {
    value
        .split(',')
        .find_map(|candidate| candidate.parse::<IpAddr>().ok())
}

/// Host part of `host:port` or `[host]:port`.
fn split_host(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        tail.strip_prefix(':')?;
        return Some(host);
    }

    let (host, _port) = addr.rsplit_once(':')?;
    // Unbracketed hosts may not contain further colons.
    if host.contains(':') {
        return None;
    }
    Some(host)
}
