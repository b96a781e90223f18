//! API error types

use crate::core::provider::ProviderError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Body rejected by the JSON extractor; keeps axum's status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimit(detail) => {
                warn!("Provider quota exceeded: {}", detail);
                ApiError::RateLimited(
                    "AI provider quota exceeded: please try again later or rotate your key"
                        .to_string(),
                )
            }
            ProviderError::Authentication(detail) => {
                warn!("Provider rejected the API key: {}", detail);
                ApiError::Forbidden(
                    "AI provider key invalid or reported as leaked. Please rotate the key."
                        .to_string(),
                )
            }
            other => {
                error!("Provider API error: {}", other);
                ApiError::BadGateway(format!("AI provider error: {}", other))
            }
        }
    }
}
