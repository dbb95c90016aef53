/* src/geolocation.rs */

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{GeoIpError, Result};

/// Location data returned by the lookup service.
///
/// Missing and `null` fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geolocation {
    #[serde(deserialize_with = "null_as_empty")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub region: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub postal: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub timezone: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for Geolocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Country: {}\nState(region): {}\nCity: {}\nZip: {}\nTime Zone: {}",
            self.country, self.region, self.city, self.postal, self.timezone
        )
    }
}

/// A source of geolocation records.
///
/// `target = None` asks the service about the caller itself.
#[async_trait]
pub trait GeolocationService: Send + Sync {
    async fn fetch(&self, target: Option<IpAddr>) -> Result<Geolocation>;
}

/// Ask the service which public address it sees us coming from.
pub async fn current_public_address(service: &dyn GeolocationService) -> Result<IpAddr> {
    let record = service.fetch(None).await?;
    record.ip.trim().parse::<IpAddr>().map_err(|_| {
        GeoIpError::ExternalServiceBadResponse(format!("unparseable ip field {:?}", record.ip))
    })
}

/// Look up location data for `ip`.
///
/// The returned record's `ip` is whatever the service reports and is not
/// compared with the input.
pub async fn lookup(service: &dyn GeolocationService, ip: IpAddr) -> Result<Geolocation> {
    service.fetch(Some(ip)).await
}

/// Default lookup endpoint.
pub const DEFAULT_SERVICE_URL: &str = "http://ipinfo.io";

/// Path ipinfo-compatible services answer "who am I" on.
const SELF_PATH: &str = "json";

/// `GeolocationService` backed by an ipinfo-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGeolocationService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeolocationService {
    /// Create a service talking to `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, target: Option<IpAddr>) -> String {
        match target {
            Some(ip) => format!("{}/{}", self.base_url, ip),
            None => format!("{}/{}", self.base_url, SELF_PATH),
        }
    }
}

#[async_trait]
impl GeolocationService for HttpGeolocationService {
    async fn fetch(&self, target: Option<IpAddr>) -> Result<Geolocation> {
        let url = self.url_for(target);
        debug!(%url, "querying geolocation service");

        let response = self.client.get(&url).send().await?;

        // The body decides; an error status with a JSON body still decodes.
        debug!(status = %response.status(), "geolocation service answered");

        let body = response.bytes().await?;

        Ok(serde_json::from_slice::<Geolocation>(&body)?)
    }
}
