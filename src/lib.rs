/* src/lib.rs */
//! # ipgeo
//!
//! Reports a client's public IP address and coarse geolocation by consulting
//! an ipinfo-compatible lookup service.
//!
//! ## Features
//!
//! - Client address from the first parseable `X-Forwarded-For` entry
//! - Fallback to the socket peer, replaced by the externally observed
//!   address when the peer sits in a private range
//! - Country, region, city, postal code and timezone lookup
//! - Optional Axum middleware, extractor and `GET /ip` server via the `axum`
//!   feature (enabled by default)
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ipgeo::{ClientAddressResolver, HttpGeolocationService, PrivateRanges};
//!
//! # async fn run() -> ipgeo::Result<()> {
//! let service = HttpGeolocationService::new("http://ipinfo.io", Duration::from_secs(5))?;
//! let resolver = ClientAddressResolver::new(Arc::new(PrivateRanges::new()?), Arc::new(service));
//!
//! let ip = resolver.resolve("203.0.113.7, 10.0.0.2", "10.0.0.2:51234").await?;
//! assert_eq!(ip, "203.0.113.7".parse::<std::net::IpAddr>().unwrap());
//!
//! let location = resolver.locate(ip).await?;
//! println!("{location}");
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod report;
pub mod resolver;

#[cfg(feature = "axum")]
pub mod middleware;
#[cfg(feature = "axum")]
pub mod server;

pub use classifier::{PRIVATE_CIDRS, PrivateRanges};
pub use config::Config;
pub use error::{GeoIpError, Result};
pub use geolocation::{
    DEFAULT_SERVICE_URL, Geolocation, GeolocationService, HttpGeolocationService,
    current_public_address, lookup,
};
pub use report::Report;
pub use resolver::{ClientAddressResolver, FORWARDED_FOR_HEADER};

#[cfg(feature = "axum")]
pub use middleware::{ClientIpLayer, ClientIpService, ResolvedIp};
#[cfg(feature = "axum")]
pub use server::{app, router, serve};

/// Re-export commonly used types
pub use std::net::IpAddr;
