//! Profile endpoints.
//!
//! `GET /users/{id}` performs no ownership check unless ownership enforcement
//! is switched on: any authenticated caller can read any profile.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{instrument, warn};

use super::{
    auth::{require_auth, AuthState},
    register::UserOut,
    storage,
};
use crate::api::error::{ApiError, ApiResult, ErrorBody};

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The caller's own profile", body = UserOut),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(headers, pool, auth))]
pub async fn read_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
) -> ApiResult<Json<UserOut>> {
    let principal = require_auth(&headers, &pool, &auth).await?;
    Ok(Json(UserOut {
        id: principal.user_id,
        username: principal.username,
    }))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Any user's profile", body = UserOut),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Not the caller's profile (ownership enforcement only)", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(headers, pool, auth))]
pub async fn read_user(
    Path(user_id): Path<i32>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
) -> ApiResult<Json<UserOut>> {
    let principal = require_auth(&headers, &pool, &auth).await?;

    let Some(user) = storage::find_user(&pool, user_id).await? else {
        return Err(ApiError::NotFound("User not found"));
    };

    if user.id != principal.user_id {
        if auth.config().enforce_ownership() {
            return Err(ApiError::Forbidden);
        }
        warn!(
            caller_id = principal.user_id,
            target_id = user.id,
            "Cross-user profile read"
        );
    }

    Ok(Json(user.into()))
}
