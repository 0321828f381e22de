use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::errors::AuthError;
use crate::common::Clock;

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 1800;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (roll number)
    pub iat: i64,    // Issued at timestamp
    pub exp: i64,    // Expiration timestamp (informational, age is checked against iat)
    pub iss: String, // Issuer
    pub jti: String, // JWT ID (unique token identifier)
}

/// Token Service - issues and verifies signed session tokens
///
/// Tokens are stateless: validity is the HMAC signature plus
/// `now - iat <= ttl` at verification time.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session token for an authenticated roll number
    pub fn issue(&self, identifier: &str) -> Result<String, AuthError> {
        let now = self.clock.now();

        let claims = Claims {
            sub: identifier.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.into()))
    }

    /// Verify a token and return the roll number it was issued for
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Verify and decode a token
    ///
    /// Malformed, forged and expired tokens all yield `AuthError::TokenInvalid`.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;
        validation.required_spec_claims = ["sub", "iss"].iter().map(|c| c.to_string()).collect();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AuthError::TokenInvalid
            })?;

        let age = self.clock.now().timestamp() - claims.iat;
        if age > self.ttl.num_seconds() {
            debug!(age, "Token rejected: expired");
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims)
    }
}
