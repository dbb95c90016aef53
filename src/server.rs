/* src/server.rs */

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, extract::State, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::classifier::PrivateRanges;
use crate::config::Config;
use crate::geolocation::{GeolocationService, HttpGeolocationService};
use crate::middleware::{ClientIpLayer, ResolvedIp};
use crate::report::Report;
use crate::resolver::ClientAddressResolver;

/// Build the application router around a ready resolver.
pub fn router(resolver: ClientAddressResolver) -> Router {
    Router::new()
        .route("/ip", get(report_ip))
        .route_layer(ClientIpLayer::new(resolver.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(resolver)
}

/// Build the router from a range table and lookup service.
pub fn app(ranges: Arc<PrivateRanges>, service: Arc<dyn GeolocationService>) -> Router {
    router(ClientAddressResolver::new(ranges, service))
}

/// `GET /ip`. Always answers 200; failures are described in the body.
async fn report_ip(
    State(resolver): State<ClientAddressResolver>,
    ResolvedIp(resolved): ResolvedIp,
) -> String {
    let report = match resolved {
        Err(error) => {
            warn!(%error, "could not resolve client address");
            Report::Unresolved(error)
        }
        Ok(ip) => match resolver.locate(ip).await {
            Ok(location) => Report::Located { ip, location },
            Err(error) => {
                warn!(%ip, %error, "location lookup failed");
                Report::Unlocated { ip, error }
            }
        },
    };

    report.to_string()
}

/// Bind `config.bind_addr` and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let ranges = Arc::new(PrivateRanges::new().context("built-in private range table")?);
    let service = HttpGeolocationService::new(config.service_url.clone(), config.timeout)
        .context("failed to build HTTP client")?;

    let app = app(ranges, Arc::new(service));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(
        addr = %listener.local_addr()?,
        service_url = %config.service_url,
        "listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
