use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use pr_reviewers_db::object_id::UserId;
use pr_reviewers_engine::deactivation::SetUserActive;
use serde::Deserialize;

use crate::{error::Result, shared_state::State};

#[derive(Debug, Deserialize)]
pub(super) struct UserIdParam {
    pub user_id: UserId,
}

async fn set_is_active(
    Extension(ref state): Extension<State>,
    body: Result<Json<SetUserActive>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = body?;
    let result = state.engine.set_user_active(req).await?;
    Ok(Json(result))
}

async fn get_review(
    Extension(ref state): Extension<State>,
    query: Result<Query<UserIdParam>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(UserIdParam { user_id }) = query?;
    let reviews = state.engine.user_reviews(&user_id).await?;
    Ok(Json(reviews))
}

pub fn configure() -> Router {
    Router::new()
        .route("/setIsActive", post(set_is_active))
        .route("/getReview", get(get_review))
}
