/* tests/http_service.rs */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use ipgeo::{
    ClientAddressResolver, GeoIpError, GeolocationService, HttpGeolocationService, PrivateRanges,
    current_public_address, lookup,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> HttpGeolocationService {
    HttpGeolocationService::new(server.uri(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn lookup_decodes_full_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "8.8.8.8",
            "hostname": "dns.google",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "postal": "94043",
            "timezone": "America/Los_Angeles"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let geo = lookup(&service_for(&server), "8.8.8.8".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(geo.ip, "8.8.8.8");
    assert_eq!(geo.country, "US");
    assert_eq!(geo.region, "California");
    assert_eq!(geo.city, "Mountain View");
    assert_eq!(geo.postal, "94043");
    assert_eq!(geo.timezone, "America/Los_Angeles");
}

#[tokio::test]
async fn lookup_tolerates_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"country":"US"}"#))
        .mount(&server)
        .await;

    let geo = lookup(&service_for(&server), "1.1.1.1".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(geo.country, "US");
    assert_eq!(geo.ip, "");
    assert_eq!(geo.city, "");
    assert_eq!(geo.timezone, "");
}

#[tokio::test]
async fn non_json_body_is_bad_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let err = service_for(&server).fetch(None).await.unwrap_err();
    assert!(matches!(err, GeoIpError::ExternalServiceBadResponse(_)), "{err:?}");
}

#[tokio::test]
async fn schema_mismatch_is_bad_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"country": 42}"#))
        .mount(&server)
        .await;

    let err = lookup(&service_for(&server), "1.1.1.1".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GeoIpError::ExternalServiceBadResponse(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_service() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let service =
        HttpGeolocationService::new(format!("http://127.0.0.1:{port}"), Duration::from_secs(2))
            .unwrap();

    let err = lookup(&service, "8.8.8.8".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GeoIpError::ExternalServiceUnreachable(_)), "{err:?}");
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ip":"8.8.8.8"}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let service = HttpGeolocationService::new(server.uri(), Duration::from_millis(200)).unwrap();
    let err = service.fetch(None).await.unwrap_err();
    assert!(matches!(err, GeoIpError::ExternalServiceUnreachable(_)), "{err:?}");
}

#[tokio::test]
async fn self_lookup_hits_json_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"ip":"198.51.100.23","country":"NL"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ip = current_public_address(&service_for(&server)).await.unwrap();
    assert_eq!(ip, "198.51.100.23".parse::<IpAddr>().unwrap());
}

#[tokio::test]
async fn private_peer_resolves_through_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ip":"198.51.100.23"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = ClientAddressResolver::new(
        Arc::new(PrivateRanges::new().unwrap()),
        Arc::new(service_for(&server)),
    );

    let ip = resolver.resolve("", "10.1.2.3:40000").await.unwrap();
    assert_eq!(ip, "198.51.100.23".parse::<IpAddr>().unwrap());
}
