//! Serving gated pages.

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::deprecated;
use crate::error::ConfigError;
use crate::gate::Gate;
use crate::http::{GateLayer, GateState};
use crate::session::SessionProvider;
use crate::table::{RoutePolicy, RouteTable};

/// Put `pages` behind the gate and add the deprecated endpoints.
///
/// Deprecated endpoints are merged after the gate layer, so they answer
/// without a session lookup.
pub fn router<P, R>(pages: Router, state: GateState<P, R>) -> Router
where
    P: SessionProvider + 'static,
    R: RoutePolicy + 'static,
{
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    pages
        .layer(GateLayer::new(state))
        .merge(deprecated::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Errors that stop the server from starting or running.
#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving failed.
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve `pages` behind the gate until Ctrl+C or SIGTERM.
pub async fn start_server<P>(config: Config, provider: P, pages: Router) -> Result<(), ServeError>
where
    P: SessionProvider + 'static,
{
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();

    info!("Loading routing configuration...");
    let routing = config.routing()?;
    let gate = Gate::new(provider, RouteTable::new(routing.table));
    let state = GateState::new(gate, routing.layout, &config.session_cookie);

    let app = router(pages, state);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
