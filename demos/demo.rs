/* demos/demo.rs */

use async_trait::async_trait;
use ipgeo::{
    ClientAddressResolver, Geolocation, GeolocationService, IpAddr, PrivateRanges, Report,
};
use std::sync::Arc;

/// Canned answers so the demo runs offline.
struct OfflineService;

#[async_trait]
impl GeolocationService for OfflineService {
    async fn fetch(&self, target: Option<IpAddr>) -> ipgeo::Result<Geolocation> {
        let ip = target.map_or_else(|| "198.51.100.23".to_string(), |ip| ip.to_string());
        Ok(Geolocation {
            ip,
            country: "NL".to_string(),
            region: "North Holland".to_string(),
            city: "Amsterdam".to_string(),
            postal: "1012".to_string(),
            timezone: "Europe/Amsterdam".to_string(),
        })
    }
}

#[tokio::main]
async fn main() {
    println!("=== ipgeo resolution examples ===\n");

    let ranges = Arc::new(PrivateRanges::new().expect("built-in ranges parse"));
    let resolver = ClientAddressResolver::new(ranges, Arc::new(OfflineService));

    let scenarios = [
        ("Proxy header", "203.0.113.1", "10.0.0.5:40000"),
        ("Proxy chain with junk", "unknown,203.0.113.2,10.0.0.1", "10.0.0.5:40000"),
        ("Padded proxy chain", "unknown, 203.0.113.2", "10.0.0.5:40000"),
        ("Public peer", "", "8.8.8.8:443"),
        ("Private peer", "", "192.168.1.5:54321"),
        ("Malformed peer", "", "not-an-address"),
        ("Hostname peer", "", "localhost:8080"),
    ];

    for (title, forwarded_for, remote_addr) in scenarios {
        println!("{title}");
        println!("  X-Forwarded-For: {forwarded_for:?}");
        println!("  remote address:  {remote_addr:?}");

        let report = match resolver.resolve(forwarded_for, remote_addr).await {
            Err(error) => Report::Unresolved(error),
            Ok(ip) => match resolver.locate(ip).await {
                Ok(location) => Report::Located { ip, location },
                Err(error) => Report::Unlocated { ip, error },
            },
        };

        for line in report.to_string().lines() {
            println!("  | {line}");
        }
        println!();
    }

    println!("=== All examples completed! ===");
}
