//! End-to-end tests for the taskhub API
//!
//! Drives the real router over an in-memory SQLite database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()

use taskhub_api::{ApiServer, ApiServerConfig};
use taskhub_auth::AuthConfig;

fn test_auth_config() -> AuthConfig {
    AuthConfig::new("test-secret-key", "taskhub-test", "taskhub-clients")
}

async fn test_app() -> Router {
    let db = taskhub_db::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    taskhub_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    ApiServer::new(ApiServerConfig::default(), db, test_auth_config()).build_router()
}

/// Send a request with an optional JSON body and bearer token, returning
/// the status and the decoded JSON body (Null for empty bodies).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Register and log in a user, returning (token, user_id)
async fn register_and_login(app: &Router, email: &str, password: &str) -> (String, String) {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/register",
        Some(json!({"email": email, "password": password})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": email, "password": password})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        body["token"].as_str().unwrap().to_string(),
        body["user_id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_then_duplicate_conflicts() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({"email": "a@x.com", "password": "password1"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered successfully");

    // Same email, different password: rejected, first credential stays
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({"email": "a@x.com", "password": "password2"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // The original password still logs in; the second never took
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "a@x.com", "password": "password1"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "a@x.com", "password": "password2"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation() {
    let app = test_app().await;

    for body in [
        json!({"email": "", "password": "longenough"}),
        json!({"email": "no-at-sign", "password": "longenough"}),
        json!({"email": "a@x.com", "password": "short"}),
    ] {
        let (status, response) = send(&app, "POST", "/api/auth/register", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "VALIDATION");
    }
}

#[tokio::test]
async fn test_login_validation() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "", "password": ""})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_login_failures_are_undifferentiated() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({"email": "a@x.com", "password": "password1"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (wrong_pw_status, wrong_pw_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "a@x.com", "password": "wrongpassword"})),
        None,
    )
    .await;
    let (no_user_status, no_user_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "nobody@x.com", "password": "wrongpassword"})),
        None,
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user_status, StatusCode::UNAUTHORIZED);
    // Identical shape: nothing distinguishes unknown-user from wrong-password
    assert_eq!(wrong_pw_body, no_user_body);
}

#[tokio::test]
async fn test_login_returns_token_identity_and_expiry() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({"email": "a@x.com", "password": "password1"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "a@x.com", "password": "password1"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["user_id"].as_str().is_some());
    assert_eq!(body["email"], "a@x.com");
    assert!(body["expires_at"].as_str().is_some());
}

#[tokio::test]
async fn test_me_returns_authenticated_user() {
    let app = test_app().await;
    let (token, user_id) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_str().unwrap(), user_id);
    assert_eq!(body["email"], "a@x.com");
    // The password hash never leaves the server
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app().await;

    for (method, uri) in [
        ("GET", "/api/auth/me"),
        ("GET", "/api/todos"),
        ("POST", "/api/todos"),
    ] {
        let body = (method == "POST").then(|| json!({"title": "x"}));
        let (status, response) = send(&app, method, uri, body, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(response["code"], "INVALID_TOKEN");
    }

    let (status, _) = send(
        &app,
        "GET",
        "/api/todos",
        None,
        Some("garbage.token.value"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_todos() {
    let app = test_app().await;
    let (token, user_id) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "Buy milk", "description": "Two liters"})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["description"], "Two liters");
    assert_eq!(created["user_id"].as_str().unwrap(), user_id);

    let (status, listed) = send(&app, "GET", "/api/todos", None, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["todos"][0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_todo_ignores_supplied_owner() {
    let app = test_app().await;
    let (token, user_id) = register_and_login(&app, "a@x.com", "password1").await;

    // Body smuggles a different owner; the field is discarded
    let (status, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({
            "title": "Spoofed",
            "user_id": "11111111-1111-1111-1111-111111111111"
        })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["user_id"].as_str().unwrap(), user_id);
}

#[tokio::test]
async fn test_create_todo_requires_title() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "   "})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_list_never_shows_other_users_items() {
    let app = test_app().await;
    let (token_a, _) = register_and_login(&app, "a@x.com", "password1").await;
    let (token_b, user_b) = register_and_login(&app, "b@x.com", "password2").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "A's secret"})),
        Some(&token_a),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) = send(&app, "GET", "/api/todos", None, Some(&token_b)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 0);
    assert!(listed["todos"].as_array().unwrap().is_empty());

    // And A's own listing only carries A's items
    let (_, listed_a) = send(&app, "GET", "/api/todos", None, Some(&token_a)).await;
    for item in listed_a["todos"].as_array().unwrap() {
        assert_ne!(item["user_id"].as_str().unwrap(), user_b);
    }
}

#[tokio::test]
async fn test_update_own_todo() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "a@x.com", "password1").await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "Old", "description": "Old body"})),
        Some(&token),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/todos/{}", id),
        Some(json!({"title": "New", "description": "New body"})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "New");
    assert_eq!(updated["description"], "New body");
    assert_eq!(updated["id"].as_str().unwrap(), id);
}

#[tokio::test]
async fn test_update_missing_todo_is_not_found() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/todos/22222222-2222-2222-2222-222222222222",
        Some(json!({"title": "x"})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_foreign_todo_is_forbidden_and_unmodified() {
    let app = test_app().await;
    let (token_a, _) = register_and_login(&app, "a@x.com", "password1").await;
    let (token_b, _) = register_and_login(&app, "b@x.com", "password2").await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "A's item"})),
        Some(&token_a),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    // B is authenticated but does not own the item: distinct from 404
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/todos/{}", id),
        Some(json!({"title": "Hijacked"})),
        Some(&token_b),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // The item is unchanged
    let (_, listed) = send(&app, "GET", "/api/todos", None, Some(&token_a)).await;
    assert_eq!(listed["todos"][0]["title"], "A's item");
}

#[tokio::test]
async fn test_delete_foreign_todo_is_forbidden() {
    let app = test_app().await;
    let (token_a, _) = register_and_login(&app, "a@x.com", "password1").await;
    let (token_b, _) = register_and_login(&app, "b@x.com", "password2").await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "A's item"})),
        Some(&token_a),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/todos/{}", id),
        None,
        Some(&token_b),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Still there for A
    let (_, listed) = send(&app, "GET", "/api/todos", None, Some(&token_a)).await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_delete_own_todo() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "a@x.com", "password1").await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({"title": "Ephemeral"})),
        Some(&token),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/todos/{}", id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/todos/{}", id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, listed) = send(&app, "GET", "/api/todos", None, Some(&token)).await;
    assert_eq!(listed["total"], 0);
}
