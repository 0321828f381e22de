//! Verify OTP action

use tracing::{info, warn};

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::{mask_phone, CorrelationKey};
use crate::domains::auth::otp_store::ConsumeOutcome;
use crate::domains::auth::types::SessionIssued;
use crate::kernel::ServerDeps;

/// Input for verifying an OTP
#[derive(Debug, Clone, Default)]
pub struct ChallengeResponse {
    pub identifier: String,
    pub phone: String,
    pub code: String,
}

/// Exchange a correct OTP for a session token.
///
/// A missing challenge is reported exactly like an expired one.
pub async fn verify_challenge(
    response: ChallengeResponse,
    deps: &ServerDeps,
) -> Result<SessionIssued, AuthError> {
    let identifier = response.identifier.trim();
    let phone = response.phone.trim();
    let code = response.code.trim();
    if identifier.is_empty() || phone.is_empty() || code.is_empty() {
        return Err(AuthError::Validation(
            "roll, mobile and otp are required".to_string(),
        ));
    }

    let key = CorrelationKey::derive(identifier, phone);
    match deps.otp_store.consume(&key, code).await {
        ConsumeOutcome::Success => {
            let token = deps.token_service.issue(identifier)?;
            info!(roll = %identifier, "OTP verified, session issued");
            Ok(SessionIssued { token })
        }
        ConsumeOutcome::WrongCode => {
            info!(roll = %identifier, phone = %mask_phone(phone), "Wrong OTP");
            Err(AuthError::InvalidCode)
        }
        ConsumeOutcome::Expired | ConsumeOutcome::NotFound => Err(AuthError::ChallengeExpired),
        ConsumeOutcome::TooManyAttempts => {
            warn!(
                roll = %identifier,
                phone = %mask_phone(phone),
                "OTP locked after too many attempts"
            );
            Err(AuthError::RateLimited)
        }
    }
}
