/* src/middleware.rs */

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{HeaderMap, StatusCode, request::Parts},
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    net::{IpAddr, SocketAddr},
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::error::Result;
use crate::resolver::{ClientAddressResolver, FORWARDED_FOR_HEADER};

/// Extension holding the outcome of client address resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIp(pub Result<IpAddr>);

impl ResolvedIp {
    /// Get the resolution result.
    pub fn result(&self) -> &Result<IpAddr> {
        &self.0
    }

    pub fn into_inner(self) -> Result<IpAddr> {
        self.0
    }
}

/// Layer that resolves the client address of each request it wraps.
///
/// Install it with `route_layer` so unmatched requests never reach the
/// lookup service.
///
/// The address is taken from `X-Forwarded-For` or the connection peer (which
/// requires serving with `into_make_service_with_connect_info::<SocketAddr>()`)
/// and stored as a [`ResolvedIp`] request extension.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use axum::{Router, routing::get};
/// use ipgeo::{ClientAddressResolver, ClientIpLayer, HttpGeolocationService, PrivateRanges, ResolvedIp};
///
/// async fn handler(ResolvedIp(ip): ResolvedIp) -> String {
///     match ip {
///         Ok(ip) => ip.to_string(),
///         Err(e) => e.to_string(),
///     }
/// }
///
/// let service = HttpGeolocationService::new("http://ipinfo.io", Duration::from_secs(5)).unwrap();
/// let resolver = ClientAddressResolver::new(Arc::new(PrivateRanges::new().unwrap()), Arc::new(service));
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .route_layer(ClientIpLayer::new(resolver));
/// ```
#[derive(Debug, Clone)]
pub struct ClientIpLayer {
    resolver: ClientAddressResolver,
}

impl ClientIpLayer {
    /// Create a layer resolving through `resolver`.
    pub fn new(resolver: ClientAddressResolver) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

/// Service that resolves client addresses.
#[derive(Debug, Clone)]
pub struct ClientIpService<S> {
    inner: S,
    resolver: ClientAddressResolver,
}

impl<S> Service<Request> for ClientIpService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let forwarded_for = forwarded_for(req.headers());
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| connect_info.0.to_string())
            .unwrap_or_default();

        // The service that was polled ready handles this request.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = self.resolver.clone();

        Box::pin(async move {
            let resolved = resolver.resolve(&forwarded_for, &remote_addr).await;
            req.extensions_mut().insert(ResolvedIp(resolved));
            inner.call(req).await
        })
    }
}

/// First `X-Forwarded-For` value, or empty when absent or not valid text.
fn forwarded_for(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl<S> FromRequestParts<S> for ResolvedIp
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts.extensions.get::<ResolvedIp>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "ClientIpLayer is not installed",
        ))
    }
}
