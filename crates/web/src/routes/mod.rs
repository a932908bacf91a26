//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Page shell ("Loading..."), fetches /directory
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (GraphQL API reachable)
//!
//! # Directory (full page, or the fragment for HTMX requests)
//! GET  /directory              - Fresh view: load users and companies
//! POST /users                  - Create user
//! POST /users/{id}/edit        - Enter edit mode for a row
//! POST /users/{id}             - Save the row being edited
//! POST /users/{id}/delete      - Delete user
//! POST /edit/cancel            - Leave edit mode
//!
//! GET  /static/*               - Stylesheet
//! ```

pub mod directory;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the directory routes router.
pub fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(directory::shell))
        .route("/directory", get(directory::show))
        .route("/users", post(directory::create))
        .route("/users/{id}", post(directory::save))
        .route("/users/{id}/edit", post(directory::edit))
        .route("/users/{id}/delete", post(directory::delete))
        .route("/edit/cancel", post(directory::cancel))
}

/// Build the complete application router, minus the Sentry layers.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(directory_routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the GraphQL API does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.client().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "GraphQL API not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
