/* src/error.rs */

use thiserror::Error;

/// Result type alias for operations that may fail with `GeoIpError`.
pub type Result<T> = std::result::Result<T, GeoIpError>;

/// Errors that can occur while resolving or locating a client address.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoIpError {
    /// Neither the forwarding header nor the remote address held a parseable IP.
    #[error("a valid IP address was not found")]
    NoValidAddress,

    /// The remote address is not in `host:port` form.
    #[error("malformed remote address: {0}")]
    MalformedRemoteAddress(String),

    /// The peer was private and asking the lookup service for our public address failed.
    #[error("failed to acquire external IP address: {0}")]
    ExternalLookupFailed(Box<GeoIpError>),

    /// Transport-level failure talking to the geolocation service.
    #[error("geolocation service unreachable: {0}")]
    ExternalServiceUnreachable(String),

    /// The geolocation service answered with something we could not decode.
    #[error("geolocation service returned a bad response: {0}")]
    ExternalServiceBadResponse(String),

    /// One of the built-in private CIDR literals failed to parse.
    #[error("invalid private range table: {0}")]
    InvalidRangeTable(String),
}

impl From<reqwest::Error> for GeoIpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::ExternalServiceBadResponse(e.to_string())
        } else {
            Self::ExternalServiceUnreachable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GeoIpError {
    fn from(e: serde_json::Error) -> Self {
        Self::ExternalServiceBadResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_failure_keeps_cause() {
        let err = GeoIpError::ExternalLookupFailed(Box::new(
            GeoIpError::ExternalServiceUnreachable("connection refused".to_string()),
        ));
        assert_eq!(
            err.to_string(),
            "failed to acquire external IP address: geolocation service unreachable: connection refused"
        );
    }

    #[test]
    fn test_json_error_is_bad_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: GeoIpError = json_err.into();
        assert!(matches!(err, GeoIpError::ExternalServiceBadResponse(_)));
    }
}
