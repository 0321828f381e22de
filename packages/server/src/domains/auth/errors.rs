use thiserror::Error;

use crate::domains::records::RecordSourceError;

/// Failures surfaced by the challenge and token flows.
///
/// "Never requested" and "expired" challenges share `ChallengeExpired`, and
/// every token failure is `TokenInvalid`, so callers learn nothing about why a
/// token failed.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("No record found for roll '{0}'")]
    RecordNotFound(String),

    #[error("Mobile number seems too short")]
    PhoneTooShort,

    #[error("Mobile number does not match our records")]
    PhoneMismatch,

    #[error("OTP not requested or expired")]
    ChallengeExpired,

    #[error("Invalid OTP")]
    InvalidCode,

    #[error("Too many failed attempts")]
    RateLimited,

    #[error("Invalid or expired token")]
    TokenInvalid,

    /// The record source is unusable (e.g. no phone column). Not the caller's fault.
    #[error("{0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RecordSourceError> for AuthError {
    fn from(err: RecordSourceError) -> Self {
        match err {
            RecordSourceError::MissingColumn(_) => AuthError::Configuration(err.to_string()),
            other => AuthError::Internal(other.into()),
        }
    }
}
