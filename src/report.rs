/* src/report.rs */

use std::fmt;
use std::net::IpAddr;

use crate::error::GeoIpError;
use crate::geolocation::Geolocation;

/// Outcome of one `/ip` request, rendered as the plain-text response body.
///
/// Addresses are written in canonical `IpAddr` form rather than echoing the
/// header text, so IPv6 is lower-cased and compressed.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// The client address could not be determined.
    Unresolved(GeoIpError),
    /// Address resolved, location lookup failed.
    Unlocated { ip: IpAddr, error: GeoIpError },
    /// Address and location both known.
    Located { ip: IpAddr, location: Geolocation },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Unresolved(error) => write!(f, "{error}"),
            Report::Unlocated { ip, error } => write!(
                f,
                "Current IP Address: {ip}\nError while attempting to get location data: {error}"
            ),
            Report::Located { ip, location } => {
                write!(f, "Current IP Address: {ip}\n{location}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_is_bare_message() {
        let report = Report::Unresolved(GeoIpError::NoValidAddress);
        assert_eq!(report.to_string(), "a valid IP address was not found");
    }

    #[test]
    fn test_unlocated() {
        let report = Report::Unlocated {
            ip: "8.8.8.8".parse().unwrap(),
            error: GeoIpError::ExternalServiceUnreachable("connection refused".to_string()),
        };
        assert_eq!(
            report.to_string(),
            "Current IP Address: 8.8.8.8\nError while attempting to get location data: geolocation service unreachable: connection refused"
        );
    }

    #[test]
    fn test_located() {
        let report = Report::Located {
            ip: "8.8.8.8".parse().unwrap(),
            location: Geolocation {
                country: "US".to_string(),
                ..Default::default()
            },
        };
        assert_eq!(
            report.to_string(),
            "Current IP Address: 8.8.8.8\nCountry: US\nState(region): \nCity: \nZip: \nTime Zone: "
        );
    }
}
