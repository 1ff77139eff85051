use axum::{http::StatusCode, response::IntoResponse, routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::shared_state::State;

#[derive(Serialize)]
struct HealthResponse {
    /// If the store answers a ping
    database: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(Extension(ref state): Extension<State>) -> impl IntoResponse {
    let database = state.engine.healthy().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            healthy: database,
            database,
        }),
    )
}

pub fn configure() -> Router {
    Router::new().route("/health", get(health))
}
