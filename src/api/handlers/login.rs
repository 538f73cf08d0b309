use axum::{extract::Extension, Form, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::{auth::AuthState, blocking, storage};
use crate::{
    api::error::{ApiError, ApiResult, ErrorBody},
    credentials::verify_password,
};

/// OAuth2 password-grant style form; extra fields such as `grant_type` are ignored.
#[derive(ToSchema, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Incorrect username or password", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip(pool, auth, payload))]
pub async fn login(
    pool: Extension<PgPool>,
    auth: Extension<Arc<AuthState>>,
    payload: Option<Form<LoginForm>>,
) -> ApiResult<Json<TokenResponse>> {
    let Some(Form(form)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let Some(user) = storage::find_user_by_username(&pool, form.username.trim()).await? else {
        return Err(ApiError::InvalidCredentials);
    };

    let password = form.password;
    let stored = user.hashed_password;
    let matches = blocking(move || Ok(verify_password(&password, &stored))).await?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = auth
        .signer()
        .issue(&user.username)
        .map_err(|err| ApiError::Internal(err.into()))?;

    info!(user_id = user.id, "Issued access token");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
