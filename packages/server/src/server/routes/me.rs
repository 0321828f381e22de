use axum::{extract::Extension, Json};

use crate::domains::auth::actions::fetch_record;
use crate::domains::auth::{AuthError, OwnRecord};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// GET /api/me
///
/// Requires a session token; returns every field of the caller's own record.
pub async fn me_handler(
    Extension(state): Extension<AppState>,
    auth_user: Option<Extension<AuthUser>>,
) -> Result<Json<OwnRecord>, AuthError> {
    let Extension(user) = auth_user.ok_or(AuthError::TokenInvalid)?;

    let record = fetch_record(&user.roll, &state.deps).await?;
    Ok(Json(record))
}
