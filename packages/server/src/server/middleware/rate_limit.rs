use std::net::IpAddr;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use tower_governor::{
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
    GovernorError,
};
use tracing::{error, warn};

use crate::server::routes::ErrorBody;

/// Rate-limit key: the client IP address.
///
/// By default the peer address of the connection is used. Forwarding headers
/// (X-Forwarded-For, X-Real-IP, Forwarded) are only honored when explicitly
/// trusted, since any client can set them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientIpKeyExtractor {
    trust_forwarded_for: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(trust_forwarded_for: bool) -> Self {
        Self {
            trust_forwarded_for,
        }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_forwarded_for {
            SmartIpKeyExtractor.extract(req)
        } else {
            PeerIpKeyExtractor.extract(req)
        }
    }
}

/// Render limiter rejections in the API's `{"error": ...}` shape.
pub fn rate_limit_error(error: GovernorError) -> Response<Body> {
    let (status, message, headers) = match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            warn!(wait_time, "Request throttled");
            (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Too many requests, retry in {}s", wait_time),
                headers,
            )
        }
        GovernorError::UnableToExtractKey => {
            error!("Rate limiter could not determine the client address");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            )
        }
        GovernorError::Other { code, msg, headers } => (
            code,
            msg.unwrap_or_else(|| code.canonical_reason().unwrap_or("Error").to_string()),
            headers,
        ),
    };

    let mut response = (status, Json(ErrorBody { error: message })).into_response();
    if let Some(headers) = headers {
        response.headers_mut().extend(headers);
    }
    response
}
