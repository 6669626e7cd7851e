use std::fmt::Display;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;
use tracing::error;

static EXPOSE_INTERNAL_DETAIL: AtomicBool = AtomicBool::new(false);

// when enabled, internal errors carry their cause in the response detail
pub fn expose_internal_detail(enabled: bool) {
    EXPOSE_INTERNAL_DETAIL.store(enabled, Ordering::Relaxed);
}

pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unprocessable(String),
    TooManyRequests { message: String, retry_after: u64 },
    ServiceUnavailable(String),
    ServerError(String),
    InternalError(anyhow::Error),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub detail: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message,
            detail: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new("Bad request", message))).into_response()
            }
            HttpError::Unprocessable(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new("Unprocessable entity", message)),
            )
                .into_response(),
            HttpError::TooManyRequests { message, retry_after } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse::new("Rate limit exceeded", message)),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            HttpError::ServiceUnavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Service unavailable", message)),
            )
                .into_response(),
            HttpError::ServerError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", message)),
            )
                .into_response(),
            HttpError::InternalError(err) => {
                error!("internal error, error={err:?}");
                let mut body = ErrorResponse::new(
                    "Internal server error",
                    "An unexpected error occurred. Please try again.".to_string(),
                );
                if EXPOSE_INTERNAL_DETAIL.load(Ordering::Relaxed) {
                    body.detail = Some(format!("{err:#}"));
                }
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<E> From<E> for HttpError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalError(err.into())
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self))
    }
}
