use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::Deserialize;

use crate::domains::auth::actions::{
    request_challenge, verify_challenge, ChallengeRequest, ChallengeResponse,
};
use crate::domains::auth::{AuthError, ChallengeIssued, SessionIssued};
use crate::server::app::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestOtpBody {
    #[serde(alias = "identifier")]
    pub roll: String,
    #[serde(alias = "phone")]
    pub mobile: String,
    pub country_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpBody {
    #[serde(alias = "identifier")]
    pub roll: String,
    #[serde(alias = "phone")]
    pub mobile: String,
    #[serde(alias = "code")]
    pub otp: String,
}

/// POST /api/request-otp
pub async fn request_otp_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<RequestOtpBody>, JsonRejection>,
) -> Result<Json<ChallengeIssued>, AuthError> {
    let Json(body) = payload.map_err(reject_body)?;

    let issued = request_challenge(
        ChallengeRequest {
            identifier: body.roll,
            phone: body.mobile,
            country_code: body.country_code,
        },
        &state.deps,
    )
    .await?;

    Ok(Json(issued))
}

/// POST /api/verify-otp
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<VerifyOtpBody>, JsonRejection>,
) -> Result<Json<SessionIssued>, AuthError> {
    let Json(body) = payload.map_err(reject_body)?;

    let session = verify_challenge(
        ChallengeResponse {
            identifier: body.roll,
            phone: body.mobile,
            code: body.otp,
        },
        &state.deps,
    )
    .await?;

    Ok(Json(session))
}

fn reject_body(rejection: JsonRejection) -> AuthError {
    AuthError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}
