use crate::core::RateError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Rate(#[from] RateError),
    #[error("Invalid request body: {0}")]
    BadRequest(#[from] JsonRejection),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Rate(e) => {
                let status = match e {
                    RateError::Validation(_) => StatusCode::BAD_REQUEST,
                    RateError::UpstreamUnavailable(_) | RateError::InvalidUpstreamResponse(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    RateError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, e.kind())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation"),
            ApiError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "upstream_unavailable"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), kind, "Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
            kind,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
