use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

use crate::domains::auth::actions::authenticate;
use crate::kernel::ServerDeps;

/// Authenticated caller information from the session token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub roll: String,
}

/// Session token authentication middleware
///
/// Extracts the token from the Authorization header, verifies it, and adds AuthUser
/// to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    deps: Arc<ServerDeps>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_auth_user(request.headers(), &deps) {
        debug!("Authenticated roll: {}", user.roll);
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Token from the Authorization header, with or without a `Bearer ` prefix
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    // A bare scheme carries no token
    if auth_str.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = match auth_str.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => auth_str,
    };

    (!token.is_empty()).then_some(token)
}

/// Extract and verify the session token from request headers
fn extract_auth_user(headers: &HeaderMap, deps: &ServerDeps) -> Option<AuthUser> {
    let token = extract_bearer(headers)?;

    match authenticate(token, deps) {
        Ok(roll) => Some(AuthUser { roll }),
        Err(e) => {
            debug!("Rejected session token: {}", e);
            None
        }
    }
}
