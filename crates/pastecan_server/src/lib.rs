//! HTTP server wiring for pastecan (router, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for the paste endpoints.
pub mod handlers;
/// HTML rendering for the highlight view.
pub mod render;
/// Periodic expiry sweep task.
pub mod sweep;

pub use pastecan_core::{
    classify, config, db, envelope, lifecycle, models, AppError, AuthMode, Config, Database,
    PasteService, DEFAULT_PORT,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

/// Headroom added to the transport body limit for multipart framing; the
/// decoded `c` field itself is held to `max_content_size` exactly.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PasteService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `db`: Open database handle.
    ///
    /// # Returns
    /// A new [`AppState`].
    pub fn new(config: Config, db: Database) -> Self {
        let config = Arc::new(config);
        let service = Arc::new(PasteService::new(Arc::new(db), config.clone()));
        Self { service, config }
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState) -> Router {
    let max_body = state.config.max_content_size + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/",
            get(handlers::paste::usage).post(handlers::paste::create_paste),
        )
        .route("/u", post(handlers::paste::create_url_paste))
        .route(
            "/:key",
            get(handlers::paste::read_paste)
                .post(handlers::paste::create_paste_labeled)
                .put(handlers::paste::update_paste)
                .delete(handlers::paste::delete_paste),
        )
        .route("/:key/:lang", get(handlers::paste::read_paste_highlighted))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(max_body))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
}

/// Resolve the listener address from the `BIND` env override.
///
/// # Returns
/// The requested socket address, falling back to loopback on the configured
/// port when `BIND` is missing or malformed.
pub fn resolve_bind_address(config: &Config) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    }
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Returns
/// `Ok(())` when the server exits cleanly.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
