//! Route definitions

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{commands, help},
    middleware::logging::logging_middleware,
    state::AppState,
};

/// All routes; unknown paths fall back to the usage message
pub fn all_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(help::help_message))
        .route("/{name}", get(commands::execute_plain))
        .route("/json/{name}", get(commands::execute_json))
        .fallback(help::help_message)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
