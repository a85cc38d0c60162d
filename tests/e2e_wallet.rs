//! E2E tests for the wallet: withdrawal requests and the
//! reserve/commit/release round trip

mod common;

use common::TestServer;
use serde_json::Value;

fn ifsc_withdrawal(amount: f64) -> Value {
    serde_json::json!({
        "amount": amount,
        "bank_name": "Test Bank",
        "bank_account_name": "Test User",
        "bank_account_number": "1234567890",
        "ifsc_code": "TEST0001234"
    })
}

async fn balance_of(server: &TestServer, token: &str) -> f64 {
    let json: Value = server
        .client
        .get(server.url("/api/v1/me"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    json["earnings"].as_f64().unwrap()
}

#[tokio::test]
async fn test_withdrawal_below_minimum_is_rejected() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;
    server.seed_balance("user-1", 1000.0).await;

    let response = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&ifsc_withdrawal(499.0))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error_type"], "validation");

    // Nothing was reserved
    assert_eq!(balance_of(&server, &token).await, 1000.0);
}

#[tokio::test]
async fn test_withdrawal_at_exact_minimum_succeeds() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;
    server.seed_balance("user-1", 1000.0).await;

    let response = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&ifsc_withdrawal(500.0))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(balance_of(&server, &token).await, 500.0);
}

#[tokio::test]
async fn test_withdrawal_over_balance_is_insufficiency_not_validation() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;
    server.seed_balance("user-1", 1000.0).await;

    let response = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&ifsc_withdrawal(1500.0))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error_type"], "insufficient_balance");
    assert_eq!(balance_of(&server, &token).await, 1000.0);
}

#[tokio::test]
async fn test_missing_ifsc_code_is_rejected_in_ifsc_region() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;
    server.seed_balance("user-1", 1000.0).await;

    let response = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "amount": 500.0,
            "bank_name": "Test Bank",
            "bank_account_name": "Test User",
            "bank_account_number": "1234567890",
            "routing_number": "021000021"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(balance_of(&server, &token).await, 1000.0);
}

#[tokio::test]
async fn test_reject_refunds_and_approve_settles() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;
    let admin_token = server.login_admin().await;
    server.seed_balance("user-1", 1000.0).await;

    // Request 600: balance drops to 400 immediately
    let created: Value = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&ifsc_withdrawal(600.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();
    assert_eq!(balance_of(&server, &token).await, 400.0);

    // Reject: the reservation is refunded
    let response = server
        .client
        .post(server.url(&format!("/admin/withdrawals/{id}/decision")))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "action": "reject", "remarks": "bad bank details" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(balance_of(&server, &token).await, 1000.0);

    // New request, approved: debit becomes permanent, total_earnings grows
    let created: Value = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&ifsc_withdrawal(600.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let response = server
        .client
        .post(server.url(&format!("/admin/withdrawals/{id}/decision")))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "action": "approve" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let me: Value = server
        .client
        .get(server.url("/api/v1/me"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["earnings"], 400.0);
    assert_eq!(me["total_earnings"], 600.0);

    // Duplicate decision on the same request is a conflict
    let response = server
        .client
        .post(server.url(&format!("/admin/withdrawals/{id}/decision")))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "action": "reject" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_completion_follows_approval() {
    let server = TestServer::new().await;
    let token = server.login("user-1", "creator@example.com").await;
    let admin_token = server.login_admin().await;
    server.seed_balance("user-1", 1000.0).await;

    let created: Value = server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&ifsc_withdrawal(500.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    // Pending cannot be completed
    let response = server
        .client
        .post(server.url(&format!("/admin/withdrawals/{id}/decision")))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "action": "complete" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    server
        .client
        .post(server.url(&format!("/admin/withdrawals/{id}/decision")))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "action": "approve" }))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .post(server.url(&format!("/admin/withdrawals/{id}/decision")))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "action": "complete", "remarks": "transfer ref 42" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "completed");

    // Completion does not touch the ledger
    let me: Value = server
        .client
        .get(server.url("/api/v1/me"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["earnings"], 500.0);
    assert_eq!(me["total_earnings"], 500.0);
}

#[tokio::test]
async fn test_withdrawal_history_is_owner_scoped() {
    let server = TestServer::new().await;
    let token_a = server.login("user-a", "a@example.com").await;
    let token_b = server.login("user-b", "b@example.com").await;
    server.seed_balance("user-a", 1000.0).await;

    server
        .client
        .post(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&ifsc_withdrawal(500.0))
        .send()
        .await
        .unwrap();

    let json: Value = server
        .client
        .get(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);

    let json: Value = server
        .client
        .get(server.url("/api/v1/withdrawals"))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}
