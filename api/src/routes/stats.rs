use axum::{
    extract::{rejection::QueryRejection, Query},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};

use super::users::UserIdParam;
use crate::{error::Result, shared_state::State};

async fn general(Extension(ref state): Extension<State>) -> Result<impl IntoResponse> {
    let stats = state.engine.general_stats().await?;
    Ok(Json(stats))
}

async fn user(
    Extension(ref state): Extension<State>,
    query: Result<Query<UserIdParam>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(UserIdParam { user_id }) = query?;
    let stats = state.engine.user_stats(&user_id).await?;
    Ok(Json(stats))
}

pub fn configure() -> Router {
    Router::new()
        .route("/", get(general))
        .route("/user", get(user))
}
