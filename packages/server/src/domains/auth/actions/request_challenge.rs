//! Request OTP action

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::matcher::phone_matches;
use crate::domains::auth::models::{
    digits_only, format_destination, mask_phone, CorrelationKey, MIN_PHONE_DIGITS,
};
use crate::domains::auth::types::ChallengeIssued;
use crate::kernel::{BaseNotifier, ServerDeps};

/// Input for requesting an OTP
#[derive(Debug, Clone, Default)]
pub struct ChallengeRequest {
    pub identifier: String,
    pub phone: String,
    /// Overrides the default country code for SMS delivery
    pub country_code: Option<String>,
}

/// Issue an OTP challenge for a roll number and phone number.
///
/// The phone number must match (by trailing digits) one of the phone fields
/// of the roll number's record. SMS delivery runs in the background after
/// the challenge is stored; a failed delivery leaves the challenge valid.
pub async fn request_challenge(
    request: ChallengeRequest,
    deps: &ServerDeps,
) -> Result<ChallengeIssued, AuthError> {
    // Production safety check - echoing codes must never be enabled in production
    if deps.debug_otp && !cfg!(debug_assertions) {
        error!("SECURITY WARNING: DEBUG_OTP is true in a release build!");
    }

    let identifier = request.identifier.trim();
    let phone = request.phone.trim();
    if identifier.is_empty() || phone.is_empty() {
        return Err(AuthError::Validation(
            "roll and mobile are required".to_string(),
        ));
    }

    // 1. Find the record
    let record = deps
        .records
        .find_record(identifier)
        .await?
        .ok_or_else(|| AuthError::RecordNotFound(identifier.to_string()))?;

    // 2. The source must expose at least one phone field
    let phone_fields = deps.records.phone_fields(&record);
    if phone_fields.is_empty() {
        error!("Record source has no mobile/phone column");
        return Err(AuthError::Configuration(
            "Could not detect any Mobile/Phone column in record table".to_string(),
        ));
    }

    // 3. Plausibility of the claimed number
    if digits_only(phone).len() < MIN_PHONE_DIGITS {
        return Err(AuthError::PhoneTooShort);
    }

    // 4. The claimed number must belong to the record
    if !phone_matches(&record, phone, &phone_fields) {
        warn!(roll = %identifier, phone = %mask_phone(phone), "Phone does not match record");
        return Err(AuthError::PhoneMismatch);
    }

    // 5. Store the challenge, then deliver
    let key = CorrelationKey::derive(identifier, phone);
    let code = deps.otp_store.create(key).await;

    let country_code = request
        .country_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&deps.default_country_code);
    let destination = format_destination(country_code, phone);
    let body = otp_message(&code, deps.otp_store.ttl().num_seconds());
    dispatch_sms(deps.notifier.clone(), destination, body);

    info!(roll = %identifier, phone = %mask_phone(phone), "OTP challenge issued");

    Ok(ChallengeIssued {
        message: "OTP sent successfully".to_string(),
        dev_code: deps.debug_otp.then_some(code),
    })
}

fn otp_message(code: &str, ttl_seconds: i64) -> String {
    let minutes = ((ttl_seconds + 59) / 60).max(1);
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!(
        "Your OTP for student login is: {}. It will expire in {} {}.",
        code, minutes, unit
    )
}

/// Fire-and-forget delivery; failures are logged and dropped.
fn dispatch_sms(notifier: Arc<dyn BaseNotifier>, destination: String, body: String) {
    tokio::spawn(async move {
        let masked = mask_phone(&destination);
        match notifier.send_sms(&destination, &body).await {
            Ok(()) => info!(to = %masked, "OTP SMS dispatched"),
            Err(e) => warn!(to = %masked, error = %e, "Failed to send OTP SMS"),
        }
    });
}
