use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, routing::post,
    Extension, Json, Router,
};
use pr_reviewers_db::object_id::PullRequestId;
use pr_reviewers_engine::{lifecycle::CreatePullRequest, reassign::ReassignReviewer};
use serde::Deserialize;
use serde_json::json;

use crate::{error::Result, shared_state::State};

#[derive(Debug, Deserialize)]
struct MergeRequest {
    pull_request_id: PullRequestId,
}

async fn create(
    Extension(ref state): Extension<State>,
    body: Result<Json<CreatePullRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = body?;
    let pr = state.engine.create_pull_request(req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "pr": pr }))))
}

async fn merge(
    Extension(ref state): Extension<State>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(MergeRequest { pull_request_id }) = body?;
    let pr = state.engine.merge_pull_request(&pull_request_id).await?;
    Ok(Json(json!({ "pr": pr })))
}

async fn reassign(
    Extension(ref state): Extension<State>,
    body: Result<Json<ReassignReviewer>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = body?;
    let result = state.engine.reassign_reviewer(req).await?;
    Ok(Json(result))
}

pub fn configure() -> Router {
    Router::new()
        .route("/create", post(create))
        .route("/merge", post(merge))
        .route("/reassign", post(reassign))
}
