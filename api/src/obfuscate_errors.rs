use axum::{
    body::{Body, BoxBody},
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde_json::json;
use tower::{Layer, Service};

/// Replaces the body of any 5xx response with the generic internal error envelope, so that
/// nothing from a failure that slipped past the error mapping reaches the caller.
#[derive(Debug, Clone)]
pub struct ObfuscateErrorLayer {
    enabled: bool,
}

impl ObfuscateErrorLayer {
    pub fn new(enabled: bool) -> ObfuscateErrorLayer {
        ObfuscateErrorLayer { enabled }
    }
}

impl<S> Layer<S> for ObfuscateErrorLayer {
    type Service = ObfuscateError<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObfuscateError {
            inner,
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObfuscateError<S> {
    inner: S,
    enabled: bool,
}

impl<S> Service<Request<Body>> for ObfuscateError<S>
where
    S: Service<Request<Body>> + Send + 'static,
    S::Future: Send + 'static,
    S::Response: IntoResponse + Send + 'static,
{
    type Response = Response<BoxBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let enabled = self.enabled;
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await?.into_response();
            let status = res.status();
            if !enabled || !status.is_server_error() {
                return Ok(res);
            }

            let body = json!({
                "error": {
                    "code": "INTERNAL_ERROR",
                    "message": "internal error",
                }
            });

            let mut new_res = (status, Json(body)).into_response();
            // Keep the request id and similar headers, but not the old body's framing.
            for (name, value) in res.headers() {
                if name != axum::http::header::CONTENT_TYPE
                    && name != axum::http::header::CONTENT_LENGTH
                {
                    new_res.headers_mut().insert(name.clone(), value.clone());
                }
            }

            Ok(new_res)
        })
    }
}
