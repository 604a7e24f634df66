//! Shared-secret admin authentication.
//!
//! Admin operations are guarded by a single static secret carried in a custom
//! header and compared by exact string equality. The contract deliberately
//! stops there: no sessions, no roles, no lockout.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::AppState;

/// Header name for the admin shared secret.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Extractor that rejects a request unless it carries the configured admin
/// secret. Runs before the handler body, so a rejected request performs no
/// upstream calls.
///
/// An unconfigured secret is a deployment defect and fails closed with a
/// config error rather than letting the request through.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_key.as_deref() else {
            return Err(AppError::Config("PHOTOS_ADMIN_KEY is missing.".into()));
        };

        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(provided_key) if provided_key == expected => Ok(RequireAdmin),
            Some(_) => Err(AppError::Unauthorized("Unauthorized".into())),
            None => Err(AppError::Unauthorized("Missing admin key".into())),
        }
    }
}
