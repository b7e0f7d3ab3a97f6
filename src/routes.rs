use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create the sharing routes.
///
/// Static routes take precedence over the catch-all, so top-level entries named
/// `index` or `upload` are only reachable through their parent listing.
pub fn share_routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/index", get(handlers::index))
        // Upload into a directory
        .route("/upload", post(handlers::upload_file))
        // Browse and download
        .route("/", get(handlers::list_root))
        .route("/{*subpath}", get(handlers::browse_path))
}
