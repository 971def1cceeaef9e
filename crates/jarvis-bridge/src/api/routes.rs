//! API route definitions.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let cors_enabled = state.settings.cors;

    let router = Router::new()
        .route("/status", get(handlers::status))
        .route("/print", post(handlers::print_file))
        // Legacy synchronous command endpoint
        .route("/command", post(handlers::legacy_command))
        // Phone -> host control
        .route("/api/run", post(handlers::run_command))
        .route("/api/open", post(handlers::open_app))
        .route("/api/shutdown", post(handlers::power))
        .route(
            "/api/smart/home",
            get(handlers::smart_home_state).post(handlers::smart_home_control),
        )
        // Host -> phone mailbox
        .route(
            "/api/notifications",
            get(handlers::take_notifications).post(handlers::send_notification),
        )
        .route("/mobile", get(handlers::mobile_page))
        .with_state(state);

    let router = if cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.layer(trace_layer)
}
