//! Row-level access to the `users` and `posts` tables.
//!
//! Each helper runs exactly one statement against the pool, so a connection is
//! held only for the duration of that statement.

use anyhow::{Context, Result};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{info_span, Instrument, Span};

/// Schema applied at startup; every statement is idempotent.
pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub hashed_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub owner_id: i32,
}

fn db_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn user_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        hashed_password: row.get("hashed_password"),
    }
}

fn post_from_row(row: &PgRow) -> PostRecord {
    PostRecord {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        owner_id: row.get("owner_id"),
    }
}

/// Create the tables if they do not exist yet.
///
/// # Errors
/// Returns an error if any schema statement fails.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .instrument(info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "CREATE"
        ))
        .await
        .context("failed to apply database schema")?;
    Ok(())
}

/// Insert a user, returning `None` when the username is already taken.
pub async fn insert_user(
    pool: &PgPool,
    username: &str,
    hashed_password: &str,
) -> Result<Option<UserRecord>> {
    let query = r"
        INSERT INTO users (username, hashed_password)
        VALUES ($1, $2)
        ON CONFLICT (username) DO NOTHING
        RETURNING id, username, hashed_password
    ";
    let row = sqlx::query(query)
        .bind(username)
        .bind(hashed_password)
        .fetch_optional(pool)
        .instrument(db_span("INSERT", query))
        .await
        .context("failed to insert user")?;

    Ok(row.as_ref().map(user_from_row))
}

pub async fn find_user_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRecord>> {
    let query = "SELECT id, username, hashed_password FROM users WHERE username = $1";
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to lookup user by username")?;

    Ok(row.as_ref().map(user_from_row))
}

pub async fn find_user(pool: &PgPool, user_id: i32) -> Result<Option<UserRecord>> {
    let query = "SELECT id, username, hashed_password FROM users WHERE id = $1";
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to lookup user by id")?;

    Ok(row.as_ref().map(user_from_row))
}

pub async fn insert_post(
    pool: &PgPool,
    title: &str,
    content: &str,
    owner_id: i32,
) -> Result<PostRecord> {
    let query = r"
        INSERT INTO posts (title, content, owner_id)
        VALUES ($1, $2, $3)
        RETURNING id, title, content, owner_id
    ";
    let row = sqlx::query(query)
        .bind(title)
        .bind(content)
        .bind(owner_id)
        .fetch_one(pool)
        .instrument(db_span("INSERT", query))
        .await
        .context("failed to insert post")?;

    Ok(post_from_row(&row))
}

pub async fn find_post(pool: &PgPool, post_id: i32) -> Result<Option<PostRecord>> {
    let query = "SELECT id, title, content, owner_id FROM posts WHERE id = $1";
    let row = sqlx::query(query)
        .bind(post_id)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to lookup post")?;

    Ok(row.as_ref().map(post_from_row))
}

/// Overwrite title and content; `None` when the post does not exist.
pub async fn update_post(
    pool: &PgPool,
    post_id: i32,
    title: &str,
    content: &str,
) -> Result<Option<PostRecord>> {
    let query = r"
        UPDATE posts
        SET title = $1, content = $2
        WHERE id = $3
        RETURNING id, title, content, owner_id
    ";
    let row = sqlx::query(query)
        .bind(title)
        .bind(content)
        .bind(post_id)
        .fetch_optional(pool)
        .instrument(db_span("UPDATE", query))
        .await
        .context("failed to update post")?;

    Ok(row.as_ref().map(post_from_row))
}

/// Returns `true` when a row was removed.
pub async fn delete_post(pool: &PgPool, post_id: i32) -> Result<bool> {
    let query = "DELETE FROM posts WHERE id = $1";
    let result = sqlx::query(query)
        .bind(post_id)
        .execute(pool)
        .instrument(db_span("DELETE", query))
        .await
        .context("failed to delete post")?;

    Ok(result.rows_affected() > 0)
}
