//! Route handlers and shared request validation.

pub mod auth;
pub mod health;
pub mod login;
pub mod posts;
pub mod register;
pub mod storage;
pub mod users;

use anyhow::Context;
use regex::Regex;

use crate::api::error::ApiResult;

// Stricter than uniqueness alone: ASCII only, no whitespace, so `José` or
// `a b` are refused at registration.
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_.@-]{1,64}$";

/// Usernames are 1-64 characters of letters, digits and `_.@-`.
pub fn valid_username(username: &str) -> bool {
    Regex::new(USERNAME_PATTERN).is_ok_and(|re| re.is_match(username))
}

/// Run Argon2 work off the async executor.
pub(crate) async fn blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(task)
        .await
        .context("password task panicked")?;
    Ok(result?)
}
