//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, gatekeeper layers)
//! - Bind server to listener with graceful shutdown
//!
//! # Middleware order (outermost first)
//! ```text
//! request ID → trace → timeout → security gate → role router → handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::apikeys::handlers as key_handlers;
use crate::apikeys::KeyStore;
use crate::auth::routes::role_router_middleware;
use crate::auth::{Principal, RouteTable};
use crate::config::GateConfig;
use crate::security::security_middleware;
use crate::store::KvStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    /// Counter / block store. `None` means the security layer fails open.
    pub kv: Option<Arc<dyn KvStore>>,
    pub keys: Arc<dyn KeyStore>,
    pub routes: Arc<RouteTable>,
}

/// HTTP server for the gatekeeper.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Assemble the server from config and the injected stores.
    pub fn new(
        config: GateConfig,
        kv: Option<Arc<dyn KvStore>>,
        keys: Arc<dyn KeyStore>,
    ) -> Self {
        let config = Arc::new(config);
        let routes = Arc::new(RouteTable::from_config(&config.roles));
        let state = AppState {
            config,
            kv,
            keys,
            routes,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/validate", post(key_handlers::validate_key))
            .route(
                "/api/keys",
                post(key_handlers::create_key).get(key_handlers::list_keys),
            )
            .route(
                "/api/keys/{id}",
                patch(key_handlers::rename_key).delete(key_handlers::delete_key),
            )
            .fallback(page_handler)
            .with_state(state.clone())
            .layer(middleware::from_fn_with_state(
                state.clone(),
                role_router_middleware,
            ))
            .layer(middleware::from_fn_with_state(state, security_middleware))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                REQUEST_TIMEOUT,
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Placeholder for the platform's page handlers: everything the gatekeeper
/// lets through lands here with its resolved principal.
async fn page_handler(request: Request<Body>) -> Json<serde_json::Value> {
    let principal = request.extensions().get::<Principal>();
    Json(serde_json::json!({
        "path": request.uri().path(),
        "principal": principal,
    }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
