//! Integration tests for registration, login and sessions.

#![allow(clippy::unwrap_used)]

use productstore_integration_tests::{PASSWORD, TestContext, message};
use reqwest::StatusCode;
use serde_json::json;

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_returns_profile_without_password() {
    let ctx = TestContext::new().await;

    let user = ctx.register("Demo User", "demo@example.com").await;

    assert_eq!(user["name"], "Demo User");
    assert_eq!(user["email"], "demo@example.com");
    assert!(user["id"].is_string());
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_does_not_sign_in() {
    let ctx = TestContext::new().await;
    ctx.register("Demo User", "demo@example.com").await;

    assert_eq!(ctx.get("/me").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let ctx = TestContext::new().await;
    let first = ctx.register("Demo User", "demo@example.com").await;

    let resp = ctx
        .post(
            "/register",
            &json!({ "name": "Impostor", "email": "demo@example.com", "password": "other" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(resp).await, "User already exists with this email");

    // The original account still owns the email
    let user = ctx.login("demo@example.com").await;
    assert_eq!(user["id"], first["id"]);
    assert_eq!(user["name"], "Demo User");
}

#[tokio::test]
async fn test_register_validates_body() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post("/register", &json!({ "name": "Demo", "email": "demo@example.com" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(resp).await, "Name, email, and password are required");

    let resp = ctx
        .post(
            "/register",
            &json!({ "name": "Demo", "email": "not-an-email", "password": PASSWORD }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(resp).await, "Invalid email address");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Login, me and logout
// =============================================================================

#[tokio::test]
async fn test_login_me_logout_flow() {
    let ctx = TestContext::new().await;
    let registered = ctx.register("Demo User", "demo@example.com").await;

    let user = ctx.login("demo@example.com").await;
    assert_eq!(user["id"], registered["id"]);

    let resp = ctx.get("/me").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(me["userId"], registered["id"]);
    assert_eq!(me["name"], "Demo User");
    assert_eq!(me["email"], "demo@example.com");

    let resp = ctx.post("/logout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(message(resp).await, "Logged out");

    assert_eq!(ctx.get("/me").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let ctx = TestContext::new().await;
    ctx.register("Demo User", "demo@example.com").await;

    for body in [
        json!({ "email": "demo@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": PASSWORD }),
    ] {
        let resp = ctx.post("/login", &body).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{body}");
        assert_eq!(message(resp).await, "Invalid credentials");
    }

    assert_eq!(ctx.get("/me").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_fields() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post("/login", &json!({ "email": "demo@example.com" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(resp).await, "Email and password are required");
}

#[tokio::test]
async fn test_sessions_are_per_client() {
    let alice = TestContext::new().await;
    let stranger = alice.other_client();
    alice.signed_in("Alice", "alice@example.com").await;

    assert_eq!(alice.get("/me").await.status(), StatusCode::OK);
    assert_eq!(stranger.get("/me").await.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Health and request IDs
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    assert_eq!(ctx.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "upstream-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "upstream-123");

    let resp = ctx.get("/health").await;
    let generated = resp.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}
