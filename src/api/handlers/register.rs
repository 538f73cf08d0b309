use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::{blocking, storage, valid_username};
use crate::{
    api::error::{ApiError, ApiResult, ErrorBody},
    credentials::hash_password,
};

#[derive(ToSchema, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
}

/// Public view of a user row; the password hash is never serialized.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserOut {
    pub id: i32,
    pub username: String,
}

impl From<storage::UserRecord> for UserOut {
    fn from(record: storage::UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
        }
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = UserCreate,
    responses(
        (status = 200, description = "User registered", body = UserOut),
        (status = 400, description = "Username already registered or invalid input", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip(pool, payload))]
pub async fn register(
    pool: Extension<PgPool>,
    payload: Option<Json<UserCreate>>,
) -> ApiResult<Json<UserOut>> {
    let Some(Json(user)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let username = user.username.trim().to_string();
    if !valid_username(&username) {
        return Err(ApiError::BadRequest("Invalid username"));
    }

    if user.password.is_empty() {
        return Err(ApiError::BadRequest("Invalid password"));
    }

    let password = user.password;
    let hashed_password = blocking(move || hash_password(&password)).await?;

    match storage::insert_user(&pool, &username, &hashed_password).await? {
        Some(record) => {
            info!(user_id = record.id, "Registered user");
            Ok(Json(record.into()))
        }
        None => Err(ApiError::Conflict),
    }
}
