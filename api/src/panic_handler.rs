use std::any::Any;

use axum::{
    body::BoxBody,
    http::{Response, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{event, Level};

pub fn handle_panic(production: bool, err: Box<dyn Any + Send + 'static>) -> Response<BoxBody> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    event!(Level::ERROR, %details, "Request handler panicked");

    let message = if production {
        "internal error".to_string()
    } else {
        details
    };

    let body = serde_json::json!({
        "error": {
            "code": "INTERNAL_ERROR",
            "message": message,
        }
    });

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
