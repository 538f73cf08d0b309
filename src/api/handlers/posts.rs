//! Post CRUD endpoints.
//!
//! Update and delete look a post up by id only. Unless ownership enforcement
//! is switched on, any authenticated caller may modify or remove any post.
//! Reads are public to every authenticated caller in both modes.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::{
    auth::{require_auth, AuthState, Principal},
    storage::{self, PostRecord},
};
use crate::api::error::{ApiError, ApiResult, ErrorBody};

const POST_NOT_FOUND: &str = "Post not found";

#[derive(ToSchema, Deserialize)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostOut {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub owner_id: i32,
}

impl From<PostRecord> for PostOut {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            owner_id: record.owner_id,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DeleteResponse {
    pub ok: bool,
    pub message: String,
}

/// Applies the ownership switch to a mutation of `post`.
fn check_owner(auth: &AuthState, principal: &Principal, post: &PostRecord) -> ApiResult<()> {
    if post.owner_id == principal.user_id {
        return Ok(());
    }
    if auth.config().enforce_ownership() {
        return Err(ApiError::Forbidden);
    }
    warn!(
        caller_id = principal.user_id,
        owner_id = post.owner_id,
        post_id = post.id,
        "Cross-user post mutation"
    );
    Ok(())
}

#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostCreate,
    responses(
        (status = 200, description = "Post created and owned by the caller", body = PostOut),
        (status = 400, description = "Missing payload", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip(headers, pool, auth, payload))]
pub async fn create_post(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
    payload: Option<Json<PostCreate>>,
) -> ApiResult<Json<PostOut>> {
    let principal = require_auth(&headers, &pool, &auth).await?;
    let Some(Json(post)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let record = storage::insert_post(&pool, &post.title, &post.content, principal.user_id).await?;
    info!(post_id = record.id, owner_id = record.owner_id, "Created post");

    Ok(Json(record.into()))
}

#[utoipa::path(
    put,
    path = "/posts/{post_id}",
    params(
        ("post_id" = i32, Path, description = "Post id")
    ),
    request_body = PostCreate,
    responses(
        (status = 200, description = "Post overwritten", body = PostOut),
        (status = 400, description = "Missing payload", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Not the owner (ownership enforcement only)", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip(headers, pool, auth, payload))]
pub async fn update_post(
    Path(post_id): Path<i32>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
    payload: Option<Json<PostCreate>>,
) -> ApiResult<Json<PostOut>> {
    let principal = require_auth(&headers, &pool, &auth).await?;
    let Some(Json(post)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let Some(existing) = storage::find_post(&pool, post_id).await? else {
        return Err(ApiError::NotFound(POST_NOT_FOUND));
    };
    check_owner(&auth, &principal, &existing)?;

    match storage::update_post(&pool, post_id, &post.title, &post.content).await? {
        Some(record) => Ok(Json(record.into())),
        // removed between lookup and update
        None => Err(ApiError::NotFound(POST_NOT_FOUND)),
    }
}

#[utoipa::path(
    delete,
    path = "/posts/{post_id}",
    params(
        ("post_id" = i32, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted", body = DeleteResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Not the owner (ownership enforcement only)", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip(headers, pool, auth))]
pub async fn delete_post(
    Path(post_id): Path<i32>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
) -> ApiResult<Json<DeleteResponse>> {
    let principal = require_auth(&headers, &pool, &auth).await?;

    let Some(existing) = storage::find_post(&pool, post_id).await? else {
        return Err(ApiError::NotFound(POST_NOT_FOUND));
    };
    check_owner(&auth, &principal, &existing)?;

    if !storage::delete_post(&pool, post_id).await? {
        return Err(ApiError::NotFound(POST_NOT_FOUND));
    }
    info!(post_id, "Deleted post");

    Ok(Json(DeleteResponse {
        ok: true,
        message: "Post deleted".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}",
    params(
        ("post_id" = i32, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post", body = PostOut),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip(headers, pool, auth))]
pub async fn read_post(
    Path(post_id): Path<i32>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
) -> ApiResult<Json<PostOut>> {
    require_auth(&headers, &pool, &auth).await?;

    match storage::find_post(&pool, post_id).await? {
        Some(record) => Ok(Json(record.into())),
        None => Err(ApiError::NotFound(POST_NOT_FOUND)),
    }
}
