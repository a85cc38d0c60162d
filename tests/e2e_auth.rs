//! E2E tests for authentication and authorization

mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn test_login_page_renders() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/login"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sign in with Google"));
}

#[tokio::test]
async fn test_oauth_redirect_sets_state_cookie() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth/google"))
        .send()
        .await
        .unwrap();

    // Redirects to Google with a CSRF state cookie
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("state="));

    let cookies: Vec<_> = response.headers().get_all("set-cookie").iter().collect();
    assert!(
        cookies
            .iter()
            .any(|c| c.to_str().unwrap().starts_with("oauth_state="))
    );
}

#[tokio::test]
async fn test_me_requires_auth() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/v1/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = server
        .client
        .get(server.url("/api/v1/me"))
        .header("Authorization", "Bearer garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;

    let response = server
        .client
        .get(server.url("/api/v1/me"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["user_id"], "user-1");
    assert_eq!(json["email"], "creator@example.com");
    assert_eq!(json["earnings"], 0.0);
    assert_eq!(json["is_admin"], false);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;

    let response = server
        .client
        .get(server.url("/api/v1/me"))
        .header("Cookie", format!("session={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_admin_routes_are_gated_server_side() {
    let server = TestServer::new().await;

    // No session at all
    let response = server
        .client
        .get(server.url("/admin/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Valid session, but the profile is not an admin
    let token = server.login("user-1", "creator@example.com").await;
    let response = server
        .client
        .get(server.url("/admin/users"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Configured admin email gets through
    let admin_token = server.login_admin().await;
    let response = server
        .client
        .get(server.url("/admin/users"))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/logout"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let cookies: Vec<_> = response.headers().get_all("set-cookie").iter().collect();
    assert!(
        cookies
            .iter()
            .any(|c| c.to_str().unwrap().starts_with("session="))
    );
}
