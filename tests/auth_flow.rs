//! End-to-end flow over the full router with an in-memory user store:
//! register, login, profile read/update, password reset, re-login.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use nutrilearn::{app::build_app, mailer::RecordingMailer, state::AppState};

fn test_app() -> (Router, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::fake_with_mailer(mailer.clone());
    (build_app(state), mailer)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("request succeeds");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn full_auth_and_profile_flow() {
    let (app, mailer) = test_app();

    // Register.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"username": "alice", "email": "alice@x.com", "password": "Abcdef1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    // Same email again fails regardless of username.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"username": "alice2", "email": "alice@x.com", "password": "Abcdef1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    // Login.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "Abcdef1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"]["password_hash"].is_null());
    let token = body["access_token"].as_str().expect("token").to_string();
    let user_id = body["user"]["id"].as_i64().expect("user id");

    // Profile requires the token.
    let (status, _) = send(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"].as_i64(), Some(user_id));
    assert_eq!(body["user"]["email"], "alice@x.com");

    // Out-of-range age is rejected...
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(&token),
        Some(json!({"age": 151})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid age");

    // ...but a valid weight in the same request still lands.
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(&token),
        Some(json!({"age": 200, "weight": 72.5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(body["user"]["weight"].as_f64(), Some(72.5));
    assert!(body["user"]["age"].is_null());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(&token),
        Some(json!({"age": 30, "dietary_goals": "less sugar"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    let (_, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(body["user"]["age"].as_i64(), Some(30));

    // Reset request: generic response, link dispatched out of band.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/request-password-reset",
        None,
        Some(json!({"email": "alice@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "If the email exists, a reset link has been sent");

    let reset_token = {
        let sent = mailer.sent.lock().expect("mailer lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "alice@x.com");
        sent[0]
            .2
            .split("token=")
            .nth(1)
            .expect("token in reset link")
            .to_string()
    };

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/reset-password",
        None,
        Some(json!({"token": reset_token, "new_password": "Newpass1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully");

    // Old password is dead, new one works.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "Abcdef1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "Newpass1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Logout is client-side; the endpoint just confirms.
    let (status, body) = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn unknown_and_malformed_logins() {
    let (app, _) = test_app();

    // Well-formed but unregistered email: same shape as a bad password.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "ghost@x.com", "password": "Abcdef1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "not-an-email", "password": "Abcdef1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "alice@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn weak_password_is_rejected_at_registration() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"username": "bob", "email": "bob@x.com", "password": "alllowercase1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password does not meet strength requirements");
}

#[tokio::test]
async fn reset_request_for_unknown_email_is_indistinguishable() {
    let (app, mailer) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/request-password-reset",
        None,
        Some(json!({"email": "ghost@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "If the email exists, a reset link has been sent");
    assert!(mailer.sent.lock().expect("mailer lock").is_empty());
}

#[tokio::test]
async fn protected_routes_reject_bad_tokens() {
    let (app, _) = test_app();

    for uri in ["/api/profile", "/api/quizzes", "/api/meals"] {
        let (status, _) = send(&app, Method::GET, uri, Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}
