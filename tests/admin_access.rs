//! Admin surface behavior through the HTTP router: login exchange, token
//! gating, aggregate statistics, and the CSV export attachment.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use community_registry::config::{AdminConfig, RateLimitConfig};
use community_registry::registry::{
    registry_router, InMemoryMemberStore, RegistryService,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn build_service() -> Arc<RegistryService<InMemoryMemberStore>> {
    let admin = AdminConfig {
        username: "admin".to_string(),
        password: "secret".to_string(),
        session_ttl_minutes: 60,
    };
    let limits = RateLimitConfig {
        max_submissions: 100,
        window_minutes: 15,
    };
    Arc::new(RegistryService::new(
        Arc::new(InMemoryMemberStore::default()),
        admin,
        limits,
    ))
}

fn submission(occupation: &str, notes: &str) -> Value {
    json!({
        "surname": "Patel",
        "name": "Raj",
        "gender": "Male",
        "age": 34,
        "mobileNumber": "9876543210",
        "emailAddress": "raj@example.com",
        "nationalIdNumber": "123456789012",
        "village": "Anand",
        "occupation": occupation,
        "notes": notes
    })
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn login(router: &axum::Router, username: &str, password: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "username": username, "password": password }))
                        .expect("serialize login"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch")
}

async fn admin_get(router: &axum::Router, path: &str, token: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("router dispatch")
}

#[tokio::test]
async fn wrong_password_is_rejected_without_a_token() {
    let router = registry_router(build_service());

    let response = login(&router, "admin", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!("Invalid credentials"));
    assert!(payload.get("token").is_none());
}

#[tokio::test]
async fn admin_routes_reject_missing_or_bogus_tokens() {
    let router = registry_router(build_service());

    for path in ["/api/admin/members", "/api/admin/stats", "/api/admin/export"] {
        let response = admin_get(&router, path, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");

        let response = admin_get(&router, path, Some("forged-token")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn login_token_unlocks_members_listing() {
    let service = build_service();
    let router = registry_router(service.clone());

    service
        .submit("test-client", serde_json::from_value(submission("Farming", "")).expect("shape"))
        .expect("submission stored");

    let response = login(&router, "admin", "secret").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    let token = payload["token"].as_str().expect("token issued").to_string();

    let response = admin_get(&router, "/api/admin/members", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    let members = payload["data"].as_array().expect("member list");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["surname"], json!("Patel"));
    assert_eq!(members[0]["mobileNumber"], json!("9876543210"));
    assert!(members[0]["submittedAt"].is_string());
}

#[tokio::test]
async fn stats_reports_totals_and_ordered_occupation_buckets() {
    let service = build_service();
    let router = registry_router(service.clone());

    for occupation in ["Farming", "Farming", "Student"] {
        service
            .submit(
                "test-client",
                serde_json::from_value(submission(occupation, "")).expect("shape"),
            )
            .expect("submission stored");
    }

    let token = service.login("admin", "secret").expect("login");
    let response = admin_get(&router, "/api/admin/stats", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["data"]["totalMembers"], json!(3));
    let buckets = payload["data"]["occupationStats"]
        .as_array()
        .expect("buckets");
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["occupation"], json!("Farming"));
    assert_eq!(buckets[0]["count"], json!(2));
    assert_eq!(buckets[1]["occupation"], json!("Student"));
    assert_eq!(buckets[1]["count"], json!(1));
}

#[tokio::test]
async fn export_returns_a_quoted_csv_attachment() {
    let service = build_service();
    let router = registry_router(service.clone());

    service
        .submit(
            "test-client",
            serde_json::from_value(submission("Farming", "said \"hello\"")).expect("shape"),
        )
        .expect("submission stored");

    let token = service.login("admin", "secret").expect("login");
    let response = admin_get(&router, "/api/admin/export", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(content_type, "text/csv");

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=community-data-"));
    assert!(disposition.ends_with(".csv"));

    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let csv = String::from_utf8(bytes.to_vec()).expect("utf8 csv");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "\"Surname\",\"Name\",\"Gender\",\"Age\",\"Mobile Number\",\"Email\",\
             \"National ID\",\"Village/City\",\"Occupation\",\"Notes\",\"Submitted At\""
        )
    );
    let row = lines.next().expect("data row");
    assert!(row.starts_with("\"Patel\",\"Raj\",\"Male\",\"34\""));
    assert!(row.contains("\"said \"\"hello\"\"\""));
}
