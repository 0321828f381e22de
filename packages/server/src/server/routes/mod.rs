// HTTP routes
pub mod auth;
pub mod health;
pub mod me;

pub use auth::*;
pub use health::*;
pub use me::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domains::auth::AuthError;

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::PhoneTooShort | AuthError::ChallengeExpired => {
                StatusCode::BAD_REQUEST
            }
            AuthError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::PhoneMismatch => StatusCode::FORBIDDEN,
            AuthError::InvalidCode | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::Internal(e) => {
                error!(error = %e, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
