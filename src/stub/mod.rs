//! Stub QR management server
//!
//! In-memory implementation of the QR management HTTP contract, built with
//! Axum, for exercising the client and scripts without the real backend.
//!
//! # Endpoints
//!
//! ## QR codes (API key required)
//! - `POST /api/v1/public/qr` - Create
//! - `GET /api/v1/public/qr?page=&limit=&searchTerm=` - List
//! - `GET /api/v1/public/qr/:id` - Get
//! - `PATCH /api/v1/public/qr/:id` - Update
//! - `DELETE /api/v1/public/qr/:id` - Delete
//! - `GET /api/v1/public/qr/:id/analytics` - Analytics
//!
//! ## API keys (API key required)
//! - `POST /api/v1/api-keys`, `GET /api/v1/api-keys`
//! - `GET|PATCH|DELETE /api/v1/api-keys/:id`
//!
//! ## Public
//! - `GET /q/:short_code` - Resolve a scan
//! - `GET /health` - Liveness
//!
//! # Example
//!
//! ```rust,ignore
//! use qrpanel::config::StubConfig;
//! use qrpanel::stub::{serve, StubState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     serve(StubState::new(StubConfig::default())).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod validate;

pub use error::{StubError, StubResult};
pub use state::StubState;

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the stub router with all routes and middleware
pub fn build_router(state: StubState) -> Router {
    let shared_state = Arc::new(state);

    let api_routes = Router::new()
        // QR routes
        .route(
            "/public/qr",
            get(routes::qr::list_qr).post(routes::qr::create_qr),
        )
        .route(
            "/public/qr/:id",
            get(routes::qr::get_qr)
                .patch(routes::qr::update_qr)
                .delete(routes::qr::delete_qr),
        )
        .route("/public/qr/:id/analytics", get(routes::qr::qr_analytics))
        // API key routes
        .route(
            "/api-keys",
            get(routes::api_keys::list_keys).post(routes::api_keys::create_key),
        )
        .route(
            "/api-keys/:id",
            get(routes::api_keys::get_key)
                .patch(routes::api_keys::update_key)
                .delete(routes::api_keys::revoke_key),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            auth::require_api_key,
        ));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/q/:short_code", get(routes::scan::resolve_scan))
        .route("/health", get(routes::health::health))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

async fn route_not_found() -> StubError {
    StubError::NotFound("Route not found".to_string())
}

/// Start the stub server on the configured address
pub async fn serve(state: StubState) -> Result<(), StubError> {
    let addr = state.config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("QR stub server listening on {}", addr);
    tracing::info!("Accepting {} configured API key(s)", state.config.api_keys.len());

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StubError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("QR stub server shut down gracefully");
    Ok(())
}

/// Serve on `addr` in a background task and return the bound address
///
/// Binding to port 0 picks a free port. Short URLs use the bound address
/// unless a public URL is configured.
pub async fn spawn(
    mut state: StubState,
    addr: &str,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    if state.config.public_url.is_none() {
        state
            .store
            .get_mut()
            .set_public_url(format!("http://{}", local));
    }

    let router = build_router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Stub server stopped: {}", e);
        }
    });

    Ok((local, handle))
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
