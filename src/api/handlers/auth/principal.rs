//! Bearer token extraction and caller resolution.
//!
//! Flow Overview: read `Authorization: Bearer <token>`, verify the token,
//! then load the user named by its subject. Any failure is a 401.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use sqlx::PgPool;
use tracing::debug;

use super::state::AuthState;
use crate::api::{
    error::{ApiError, ApiResult},
    handlers::storage::find_user_by_username,
};

/// Authenticated caller resolved from a bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
}

/// Extract the raw token from an `Authorization` header.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the bearer token into a principal, or fail with 401.
///
/// # Errors
/// Returns `Unauthenticated` for missing/invalid tokens or unknown subjects,
/// `Internal` if the user lookup fails.
pub async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    auth: &AuthState,
) -> ApiResult<Principal> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(ApiError::Unauthenticated);
    };

    let claims = auth.signer().verify(token).map_err(|err| {
        debug!("Rejected bearer token: {err}");
        ApiError::Unauthenticated
    })?;

    match find_user_by_username(pool, &claims.sub).await? {
        Some(user) => Ok(Principal {
            user_id: user.id,
            username: user.username,
        }),
        None => Err(ApiError::Unauthenticated),
    }
}
