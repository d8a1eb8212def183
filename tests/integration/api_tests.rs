//! API integration tests
//!
//! These talk to a running server with the default configuration and a
//! freshly migrated database.

use chrono::{Duration, Utc};
use petshop_server::models::{Role, UserClaims};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const JWT_SECRET: &str = "change-this-secret-in-production";

/// Token as the external auth service would issue it
fn token(role: Role, user_id: i32) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: format!("user-{}@example.com", user_id),
        user_id,
        role,
        exp: now + 3600,
        iat: now,
    }
    .create_token(JWT_SECRET)
    .expect("Failed to sign token")
}

fn booking(date: &str, time: &str) -> Value {
    json!({
        "petName": "Rex",
        "petType": "dog",
        "ownerName": "Jane Doe",
        "ownerEmail": "jane@example.com",
        "serviceType": "Basic Grooming",
        "date": date,
        "time": time
    })
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_list_services_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/services", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let services = body.as_array().expect("Expected an array");
    assert!(services.iter().any(|s| s["name"] == "Basic Grooming"));
    assert!(services.iter().all(|s| s["duration_label"].is_string()));
}

#[tokio::test]
#[ignore]
async fn test_guest_booking_pays_full_price() {
    let client = Client::new();
    let date = (Utc::now() + Duration::days(7)).format("%Y-%m-%d").to_string();

    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .json(&booking(&date, "10:00"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Booked");
    assert_eq!(body["resolvedStatus"], "Upcoming");
    assert_eq!(body["price"]["memberDiscount"], 0.0);
    assert_eq!(body["price"]["totalPrice"], 50.0);
}

#[tokio::test]
#[ignore]
async fn test_member_booking_gets_discount() {
    let client = Client::new();
    let date = (Utc::now() + Duration::days(7)).format("%Y-%m-%d").to_string();

    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .bearer_auth(token(Role::Member, 42))
        .json(&booking(&date, "11:00"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["price"]["totalPrice"], 47.5);

    let mine: Value = client
        .get(format!("{}/appointments/mine", BASE_URL))
        .bearer_auth(token(Role::Member, 42))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(mine
        .as_array()
        .expect("Expected an array")
        .iter()
        .any(|a| a["id"] == body["id"]));
}

#[tokio::test]
#[ignore]
async fn test_admin_endpoints_require_admin() {
    let client = Client::new();

    let response = client
        .get(format!("{}/appointments", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/appointments", BASE_URL))
        .bearer_auth(token(Role::Member, 42))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_past_appointment_is_reconciled() {
    let client = Client::new();
    let admin = token(Role::Admin, 1);
    let yesterday = (Utc::now() - Duration::days(1)).format("%Y-%m-%d").to_string();

    let created: Value = client
        .post(format!("{}/appointments", BASE_URL))
        .json(&booking(&yesterday, "09:00"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(created["status"], "Booked");
    assert_eq!(created["resolvedStatus"], "Completed");

    let report: Value = client
        .post(format!("{}/appointments/reconcile", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(report["trigger"], "manual");

    let fetched: Value = client
        .get(format!("{}/appointments/{}", BASE_URL, created["id"]))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(fetched["status"], "Completed");
}

#[tokio::test]
#[ignore]
async fn test_cancel_then_delete() {
    let client = Client::new();
    let admin = token(Role::Admin, 1);
    let date = (Utc::now() + Duration::days(3)).format("%Y-%m-%d").to_string();

    let created: Value = client
        .post(format!("{}/appointments", BASE_URL))
        .json(&booking(&date, "15:30"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_i64().expect("No id in response");

    let cancelled: Value = client
        .post(format!("{}/appointments/{}/cancel", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(cancelled["status"], "Cancelled");
    assert_eq!(cancelled["resolvedStatus"], "Cancelled");

    let response = client
        .delete(format!("{}/appointments/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/appointments/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
