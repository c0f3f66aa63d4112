use crate::types::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use viewcounter_core::counter::CounterError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Video not found: {0}")]
    VideoNotFound(u64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Counter error: {0}")]
    Counter(CounterError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CounterError> for ApiError {
    fn from(err: CounterError) -> Self {
        match err {
            CounterError::UnknownVideo(id) => ApiError::VideoNotFound(id),
            CounterError::InvalidPayload(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::Counter(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::VideoNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Counter(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse { error: self.to_string() };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
