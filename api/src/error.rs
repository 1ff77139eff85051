use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pr_reviewers_engine::ErrorKind;
use thiserror::Error;
use tracing::{event, Level};

use pr_reviewers_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] pr_reviewers_engine::Error),

    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),
}

impl Error {
    fn error_code(&self) -> &'static str {
        match self {
            Error::Engine(e) => e.code(),
            Error::JsonBody(_) | Error::Query(_) => "INVALID_REQUEST",
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        let status = match self {
            Error::Engine(e) => match (e.kind(), e) {
                (_, pr_reviewers_engine::Error::TeamExists(_)) => StatusCode::BAD_REQUEST,
                (ErrorKind::Validation, _) => StatusCode::UNPROCESSABLE_ENTITY,
                (ErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
                (ErrorKind::Conflict, _) => StatusCode::CONFLICT,
                (ErrorKind::Internal, _) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::JsonBody(e) => e.status(),
            Error::Query(e) => e.status(),
        };

        let data = if status.is_server_error() {
            event!(Level::ERROR, error = ?self, "Request failed");
            ErrorResponseData::internal(self.error_code())
        } else {
            let message = match self {
                Error::Engine(e) => e.public_message(),
                e => e.to_string(),
            };
            ErrorResponseData::new(self.error_code(), message)
        };

        (status, data)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        (code, Json(json)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pr_reviewers_db::object_id::{PullRequestId, TeamName};
    use pr_reviewers_engine::Error as EngineError;

    use super::*;

    fn status_of(e: EngineError) -> StatusCode {
        Error::from(e).response_tuple().0
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            status_of(EngineError::InvalidName("pull_request_name")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(EngineError::NotFound("user")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(EngineError::PullRequestExists(PullRequestId::new("p1"))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngineError::TeamExists(TeamName::new("core"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EngineError::Store(pr_reviewers_db::Error::InteractAborted)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_are_generic() {
        let (_, data) = Error::from(EngineError::Store(pr_reviewers_db::Error::Migration(
            "relation does not exist".to_string(),
        )))
        .response_tuple();
        assert_eq!(data.code(), "INTERNAL_ERROR");
        assert_eq!(data.message(), "internal error");
    }
}
