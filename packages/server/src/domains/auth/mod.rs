//! Auth domain - handles authentication via OTP (roll number + phone)
//!
//! Responsibilities:
//! - Matching a claimed phone number against the roll number's record
//! - Issuing and verifying one-time codes (in-memory, time-boxed, attempt-limited)
//! - Session token issuance and verification

pub mod actions;
pub mod errors;
pub mod jwt;
pub mod matcher;
pub mod models;
pub mod otp_store;
pub mod types;

pub use errors::AuthError;
pub use jwt::{Claims, TokenService, DEFAULT_TOKEN_TTL_SECS};
pub use otp_store::{ConsumeOutcome, OtpStore, DEFAULT_MAX_ATTEMPTS, DEFAULT_OTP_TTL_SECS};
pub use types::{ChallengeIssued, OwnRecord, SessionIssued};
