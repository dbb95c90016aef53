/* src/config.rs */

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

use crate::geolocation::DEFAULT_SERVICE_URL;

/// Runtime settings for the `/ip` server.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,
    /// Base URL of the ipinfo-compatible lookup service.
    pub service_url: String,
    /// Upper bound on each outbound lookup.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `IPGEO_BIND_ADDR`, `IPGEO_SERVICE_URL` and
    /// `IPGEO_TIMEOUT_SECS`, after loading a `.env` file if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = lookup("IPGEO_BIND_ADDR") {
            config.bind_addr = bind
                .parse()
                .with_context(|| format!("IPGEO_BIND_ADDR is not a socket address: {bind}"))?;
        }
        if let Some(url) = lookup("IPGEO_SERVICE_URL") {
            config.service_url = url;
        }
        if let Some(secs) = lookup("IPGEO_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("IPGEO_TIMEOUT_SECS is not a number: {secs}"))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the listen address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the lookup service base URL.
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Set the outbound timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
