mod common;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bolalab::{
    api::{
        self,
        handlers::{login::TokenResponse, posts::PostOut, register::UserOut, storage},
    },
    credentials::TokenSigner,
};
use common::{auth_state, ensure_container_runtime, unique_username, TestDb, TEST_TOKEN_SECRET};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Caller {
    user: UserOut,
    token: String,
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    Ok(builder.body(Body::from(body.to_string()))?)
}

fn bare_request(method: Method, uri: &str, token: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

async fn register(app: &Router, username: &str, password: &str) -> Result<(StatusCode, Value)> {
    send(
        app,
        json_request(
            Method::POST,
            "/register",
            None,
            &json!({ "username": username, "password": password }),
        )?,
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> Result<(StatusCode, Value)> {
    let form = format!("username={username}&password={password}");
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))?;
    send(app, request).await
}

async fn signup(app: &Router, prefix: &str) -> Result<Caller> {
    let username = unique_username(prefix);
    let (status, body) = register(app, &username, "correct-horse").await?;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let user: UserOut = serde_json::from_value(body)?;

    let (status, body) = login(app, &username, "correct-horse").await?;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let token: TokenResponse = serde_json::from_value(body)?;
    assert_eq!(token.token_type, "bearer");

    Ok(Caller {
        user,
        token: token.access_token,
    })
}

async fn create_post(app: &Router, caller: &Caller, title: &str) -> Result<PostOut> {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/posts",
            Some(&caller.token),
            &json!({ "title": title, "content": "original" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    Ok(serde_json::from_value(body)?)
}

#[tokio::test]
async fn schema_bootstrap_is_repeatable() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;

    storage::apply_schema(&db.pool).await?;

    let tables: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM information_schema.tables WHERE table_name IN ('users', 'posts')",
    )
    .fetch_one(&db.pool)
    .await?;
    assert_eq!(tables, 2);
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let username = unique_username("dup");

    let (status, body) = register(&app, &username, "pw").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!(username));
    assert!(body.get("hashed_password").is_none());

    let (status, body) = register(&app, &username, "other").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Username already registered" }));
    Ok(())
}

#[tokio::test]
async fn concurrent_registration_admits_one_winner() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let username = unique_username("race");

    let (first, second) = tokio::join!(
        register(&app, &username, "pw-one"),
        register(&app, &username, "pw-two")
    );
    let mut statuses = vec![first?.0.as_u16(), second?.0.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![200, 400]);
    Ok(())
}

#[tokio::test]
async fn login_token_identifies_the_caller() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let alice = signup(&app, "alice").await?;

    let (status, body) = send(&app, bare_request(Method::GET, "/users/me", &alice.token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<UserOut>(body)?, alice.user);

    let (status, body) = login(&app, &alice.user.username, "wrong").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Incorrect username or password" }));

    let (status, body) = login(&app, &unique_username("nobody"), "wrong").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Incorrect username or password" }));
    Ok(())
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let token = TokenSigner::new(TEST_TOKEN_SECRET.to_vec()).issue(&unique_username("ghost"))?;

    let (status, body) = send(&app, bare_request(Method::GET, "/users/me", &token)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Could not validate credentials" }));
    Ok(())
}

#[tokio::test]
async fn any_caller_reads_any_profile_by_default() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let alice = signup(&app, "alice").await?;
    let bob = signup(&app, "bob").await?;

    let uri = format!("/users/{}", alice.user.id);
    let (status, body) = send(&app, bare_request(Method::GET, &uri, &bob.token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<UserOut>(body)?, alice.user);

    let (status, body) = send(&app, bare_request(Method::GET, "/users/2147483647", &bob.token)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "User not found" }));
    Ok(())
}

#[tokio::test]
async fn post_belongs_to_its_creator() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let alice = signup(&app, "alice").await?;
    let bob = signup(&app, "bob").await?;

    let post = create_post(&app, &alice, "hello").await?;
    assert_eq!(post.owner_id, alice.user.id);
    assert_eq!(post.title, "hello");

    let uri = format!("/posts/{}", post.id);
    let (status, body) = send(&app, bare_request(Method::GET, &uri, &bob.token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<PostOut>(body)?, post);
    Ok(())
}

#[tokio::test]
async fn any_caller_overwrites_and_deletes_any_post_by_default() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(false));
    let alice = signup(&app, "alice").await?;
    let bob = signup(&app, "bob").await?;
    let post = create_post(&app, &alice, "mine").await?;
    let uri = format!("/posts/{}", post.id);

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&bob.token),
            &json!({ "title": "pwned", "content": "by bob" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let updated: PostOut = serde_json::from_value(body)?;
    assert_eq!(updated.title, "pwned");
    assert_eq!(updated.content, "by bob");
    assert_eq!(updated.owner_id, alice.user.id);

    let (status, body) = send(&app, bare_request(Method::DELETE, &uri, &bob.token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "message": "Post deleted" }));

    let (status, body) = send(&app, bare_request(Method::GET, &uri, &alice.token)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Post not found" }));
    Ok(())
}

#[tokio::test]
async fn missing_posts_are_not_found() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(true));
    let alice = signup(&app, "alice").await?;
    let uri = "/posts/2147483647";

    let (status, _) = send(&app, bare_request(Method::GET, uri, &alice.token)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            uri,
            Some(&alice.token),
            &json!({ "title": "t", "content": "c" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, bare_request(Method::DELETE, uri, &alice.token)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Post not found" }));
    Ok(())
}

#[tokio::test]
async fn enforced_ownership_blocks_cross_user_access() -> Result<()> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }
    let db = TestDb::new().await?;
    let app = api::app(db.pool.clone(), auth_state(true));
    let alice = signup(&app, "alice").await?;
    let bob = signup(&app, "bob").await?;
    let post = create_post(&app, &alice, "mine").await?;
    let uri = format!("/posts/{}", post.id);
    let forbidden = json!({ "detail": "Not enough permissions" });

    let profile = format!("/users/{}", alice.user.id);
    let (status, body) = send(&app, bare_request(Method::GET, &profile, &bob.token)?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    let own_profile = format!("/users/{}", bob.user.id);
    let (status, _) = send(&app, bare_request(Method::GET, &own_profile, &bob.token)?).await?;
    assert_eq!(status, StatusCode::OK);

    let edit = json!({ "title": "pwned", "content": "by bob" });
    let (status, body) = send(&app, json_request(Method::PUT, &uri, Some(&bob.token), &edit)?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    let (status, body) = send(&app, bare_request(Method::DELETE, &uri, &bob.token)?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    // reads stay public
    let (status, body) = send(&app, bare_request(Method::GET, &uri, &bob.token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<PostOut>(body)?, post);

    let (status, body) = send(&app, json_request(Method::PUT, &uri, Some(&alice.token), &edit)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("pwned"));

    let (status, _) = send(&app, bare_request(Method::DELETE, &uri, &alice.token)?).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
