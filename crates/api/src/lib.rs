//! HTTP surface for the order sheets: sheet documents and views, cell
//! edits, the stage board, printable documents and image blobs.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Embedded images travel inside JSON cell edits.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::sheets::router())
        .merge(routes::images::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Router::new()
        .route("/health/liveness", get(liveness))
        .merge(api)
}

async fn liveness() -> &'static str {
    "ok"
}
