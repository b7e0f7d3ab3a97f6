//! Local directory sharing over HTTP.
//!
//! This crate exposes a single directory tree for browsing, downloading and uploading.
//! It can be used as a standalone binary or the router can be embedded in another application.

pub mod audit;
pub mod browser;
pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod logging;
pub mod resolver;
pub mod routes;
pub mod transfer;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ShareError;
pub use resolver::SharedRoot;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Directory tree exposed by the server
    pub root: SharedRoot,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState with the given shared root and default config.
    pub fn new(root: SharedRoot) -> Self {
        Self {
            root,
            config: Arc::new(Config::default()),
        }
    }

    /// Create a new AppState with the given shared root and config.
    pub fn with_config(root: SharedRoot, config: Config) -> Self {
        Self {
            root,
            config: Arc::new(config),
        }
    }
}

/// Build the full application: route table, CORS, request tracing and state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::share_routes())
        // Upload size is enforced while streaming to disk.
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
