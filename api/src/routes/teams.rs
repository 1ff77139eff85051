use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use pr_reviewers_db::object_id::TeamName;
use pr_reviewers_engine::teams::TeamWithMembers;
use serde::Deserialize;
use serde_json::json;

use crate::{error::Result, shared_state::State};

#[derive(Debug, Deserialize)]
struct TeamNameParam {
    team_name: TeamName,
}

async fn add_team(
    Extension(ref state): Extension<State>,
    body: Result<Json<TeamWithMembers>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(team) = body?;
    let team = state.engine.add_team(team).await?;
    Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

async fn get_team(
    Extension(ref state): Extension<State>,
    query: Result<Query<TeamNameParam>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(TeamNameParam { team_name }) = query?;
    let team = state.engine.get_team(&team_name).await?;
    Ok(Json(team))
}

async fn deactivate_team(
    Extension(ref state): Extension<State>,
    body: Result<Json<TeamNameParam>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(TeamNameParam { team_name }) = body?;
    let result = state.engine.deactivate_team(&team_name).await?;
    Ok(Json(result))
}

pub fn configure() -> Router {
    Router::new()
        .route("/add", post(add_team))
        .route("/get", get(get_team))
        .route("/deactivate", post(deactivate_team))
}
