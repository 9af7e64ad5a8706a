use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use super::domain::MemberSubmission;
use super::service::{LoginRequest, RegistryError, RegistryService};
use super::store::MemberStore;

/// Router builder exposing the public submission endpoint and the
/// token-gated admin surface.
pub fn registry_router<S>(service: Arc<RegistryService<S>>) -> Router
where
    S: MemberStore + 'static,
{
    Router::new()
        .route("/api/submit", post(submit_handler::<S>))
        .route("/api/admin/login", post(login_handler::<S>))
        .route("/api/admin/members", get(members_handler::<S>))
        .route("/api/admin/stats", get(stats_handler::<S>))
        .route("/api/admin/export", get(export_handler::<S>))
        .with_state(service)
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(submission): Json<MemberSubmission>,
) -> Response
where
    S: MemberStore + 'static,
{
    let client = client_key(&headers, connect_info);

    match service.submit(&client, submission) {
        Ok(member) => {
            let payload = json!({
                "success": true,
                "message": "Registration successful! Thank you for your submission.",
                "data": {
                    "id": member.id,
                    "submittedAt": member.submitted_at,
                },
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(RegistryError::Validation(failures))
        | Err(RegistryError::Store(super::store::StoreError::InvalidDraft(failures))) => {
            let errors: Vec<String> = failures.iter().map(ToString::to_string).collect();
            let payload = json!({
                "success": false,
                "message": "Validation error",
                "errors": errors,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(RegistryError::RateLimited) => {
            let payload = json!({
                "success": false,
                "message": "Too many submissions from this IP, please try again later.",
            });
            (StatusCode::TOO_MANY_REQUESTS, Json(payload)).into_response()
        }
        Err(other) => server_error("submission", other),
    }
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    S: MemberStore + 'static,
{
    match service.login(&request.username, &request.password) {
        Ok(token) => {
            let payload = json!({
                "success": true,
                "message": "Login successful",
                "token": token,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(RegistryError::InvalidCredentials) => {
            let payload = json!({
                "success": false,
                "message": "Invalid credentials",
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        }
        Err(other) => server_error("login", other),
    }
}

pub(crate) async fn members_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: MemberStore + 'static,
{
    match service.members(&bearer_token(&headers)) {
        Ok(members) => {
            let payload = json!({ "success": true, "data": members });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(RegistryError::Unauthorized) => unauthorized(),
        Err(other) => server_error("members listing", other),
    }
}

pub(crate) async fn stats_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: MemberStore + 'static,
{
    match service.stats(&bearer_token(&headers)) {
        Ok(stats) => {
            let payload = json!({ "success": true, "data": stats });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(RegistryError::Unauthorized) => unauthorized(),
        Err(other) => server_error("stats", other),
    }
}

pub(crate) async fn export_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: MemberStore + 'static,
{
    match service.export_csv(&bearer_token(&headers)) {
        Ok(csv) => {
            let filename = format!("community-data-{}.csv", Utc::now().timestamp_millis());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={filename}"),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(RegistryError::Unauthorized) => unauthorized(),
        Err(other) => server_error("export", other),
    }
}

/// First `x-forwarded-for` hop when present, else the peer address.
fn client_key(headers: &HeaderMap, connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    match connect_info {
        Some(ConnectInfo(addr)) => addr.ip().to_string(),
        None => "local".to_string(),
    }
}

fn bearer_token(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

fn unauthorized() -> Response {
    let payload = json!({ "success": false, "message": "Unauthorized" });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

fn server_error(operation: &str, err: RegistryError) -> Response {
    // Detail stays in the server log; clients get the generic envelope.
    error!(%operation, error = %err, "request failed");
    let payload = json!({
        "success": false,
        "message": "Server error. Please try again later.",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_header_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        let peer = Some(ConnectInfo("192.0.2.1:5000".parse().unwrap()));
        assert_eq!(client_key(&headers, peer), "203.0.113.7");
    }

    #[test]
    fn missing_peer_falls_back_to_local() {
        assert_eq!(client_key(&HeaderMap::new(), None), "local");
    }

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), "abc123");

        let mut bare = HeaderMap::new();
        bare.insert(header::AUTHORIZATION, "abc123".parse().unwrap());
        assert_eq!(bearer_token(&bare), "");
    }
}
