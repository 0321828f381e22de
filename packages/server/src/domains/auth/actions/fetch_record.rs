//! Fetch the authenticated caller's record

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::types::OwnRecord;
use crate::kernel::ServerDeps;

/// Resolve a session token to the roll number it was issued for.
pub fn authenticate(token: &str, deps: &ServerDeps) -> Result<String, AuthError> {
    deps.token_service.verify(token)
}

/// Load the record for an already authenticated roll number.
pub async fn fetch_record(roll: &str, deps: &ServerDeps) -> Result<OwnRecord, AuthError> {
    let record = deps
        .records
        .find_record(roll)
        .await?
        .ok_or_else(|| AuthError::RecordNotFound(roll.to_string()))?;

    Ok(OwnRecord {
        roll: roll.to_string(),
        data: record,
    })
}
