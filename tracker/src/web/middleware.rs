//! Request extractors for authentication
//!
//! Session handling lives in front of this service: an upstream auth layer
//! forwards the signed-in user's id in the `x-user-id` header. The cron
//! endpoint is instead protected by a shared secret.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::database::UserRecord;
use crate::web::handlers::common::{api_error, internal_error, ApiError};
use crate::web::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that validates the cron secret from the Authorization header.
///
/// # Example
/// ```ignore
/// async fn check_vehicles(
///     _auth: CronAuth,  // This validates the cron secret
///     State(state): State<AppState>,
/// ) -> Result<Json<CronResponse>, ApiError> {
///     // Handler logic here - caller is already authenticated
/// }
/// ```
pub struct CronAuth;

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = state.config.secrets.cron_secret.as_str();

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));

        match token {
            Some(token) if secret_matches(token, secret) => Ok(CronAuth),
            _ => {
                warn!("Rejected sweep trigger with missing or wrong secret");
                Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
        }
    }
}

/// Constant-time comparison; an unset secret never authenticates
fn secret_matches(token: &str, secret: &str) -> bool {
    !secret.is_empty() && bool::from(token.as_bytes().ct_eq(secret.as_bytes()))
}

/// The signed-in owner, loaded from storage
pub struct CurrentUser(pub UserRecord);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))?;

        match state.database.get_user(user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized")),
            Err(e) => Err(internal_error("Failed to load user", e)),
        }
    }
}
