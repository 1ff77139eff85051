use serde::Serialize;
use std::borrow::Cow;
use tracing::{event, Level};

/// The body of every error response: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponseData {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    code: Cow<'static, str>,
    message: Cow<'static, str>,
}

impl ErrorResponseData {
    /// An error the caller can act on, such as a missing or conflicting resource.
    pub fn new(
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        let ret = Self::build(code, message);
        event!(Level::WARN, code=%ret.error.code, message=%ret.error.message);
        ret
    }

    /// A server-side failure. Only the generic message is sent.
    pub fn internal(code: impl Into<Cow<'static, str>>) -> ErrorResponseData {
        let ret = Self::build(code, "internal error");
        event!(Level::ERROR, code=%ret.error.code, message=%ret.error.message);
        ret
    }

    fn build(
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        ErrorResponseData {
            error: ErrorDetails {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn code(&self) -> &str {
        &self.error.code
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }
}
