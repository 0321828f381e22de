//! Auth domain data types
//!
//! Simple, serializable types returned by auth actions.

use serde::{Deserialize, Serialize};

use crate::domains::records::Record;

/// Result of requesting an OTP challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeIssued {
    pub message: String,
    /// Only populated when `DEBUG_OTP` is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

/// Result of a successful OTP verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIssued {
    pub token: String,
}

/// The caller's own record, resolved from a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnRecord {
    pub roll: String,
    pub data: Record,
}
