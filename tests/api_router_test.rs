mod common;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use gymhub::api::routes::create_app;
use gymhub::api::AppState;
use gymhub::auth::{JwtService, UserType};
use gymhub::config::AppConfig;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::net::SocketAddr;
use tower::ServiceExt;
use uuid::Uuid;

use common::{lazy_pool, TEST_JWT_SECRET};

fn app(config: &AppConfig) -> tower_http::normalize_path::NormalizePath<axum::Router> {
    let pool = lazy_pool();
    let auth = gymhub::auth::AuthService::new(pool.clone(), JwtService::new(TEST_JWT_SECRET));
    create_app(AppState::new(pool, auth), config)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = app(&AppConfig::default()).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "gymhub");
}

#[tokio::test]
async fn test_trailing_slash_is_accepted() {
    let response = app(&AppConfig::default()).oneshot(get("/health/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    for uri in [
        "/api/gyms",
        "/api/gyms/",
        "/api/memberships/",
        "/api/dashboard/stats/",
        "/api/admin/gyms/pending/",
        "/api/ml/categories/",
    ] {
        let response = app(&AppConfig::default()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let body = json_body(response).await;
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_and_forged_tokens_rejected() {
    let forged = JwtService::new("some-other-secret")
        .create_access_token(Uuid::new_v4(), "mallory", UserType::Admin)
        .unwrap();

    for value in ["Token abc".to_string(), "Bearer not-a-jwt".to_string(), format!("Bearer {}", forged)] {
        let request = Request::builder()
            .uri("/api/gyms/")
            .header(header::AUTHORIZATION, value.as_str())
            .body(Body::empty())
            .unwrap();

        let response = app(&AppConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", value);
    }
}

fn login_from(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/auth/login/");
    if let Some(value) = forwarded_for {
        builder = builder.header("x-forwarded-for", value);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    let peer: SocketAddr = format!("{}:40000", peer).parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

fn limited_config(trusted_proxies: &[&str]) -> AppConfig {
    AppConfig {
        auth_rate_limit_per_minute: 2,
        trusted_proxies: trusted_proxies.iter().map(|proxy| proxy.to_string()).collect(),
        ..AppConfig::default()
    }
}

// Without a JSON content type the login handler rejects before any query
// runs, so a request that passes the limiter answers 415.

#[tokio::test]
async fn test_auth_endpoints_are_rate_limited_per_peer() {
    let app = app(&limited_config(&[]));

    for _ in 0..2 {
        let response = app.clone().oneshot(login_from("198.51.100.1", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    let response = app.clone().oneshot(login_from("198.51.100.1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.clone().oneshot(login_from("198.51.100.2", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_forwarded_for_rotation_does_not_escape_limit() {
    let app = app(&limited_config(&[]));

    let mut limited = 0;
    for n in 0..20 {
        let spoofed = format!("203.0.113.{}", n);
        let response = app
            .clone()
            .oneshot(login_from("198.51.100.1", Some(&spoofed)))
            .await
            .unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }
    assert_eq!(limited, 18);
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_address() {
    let app = app(&limited_config(&["10.0.0.0/8"]));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(login_from("10.0.0.2", Some("198.51.100.7")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    let response = app
        .clone()
        .oneshot(login_from("10.0.0.2", Some("198.51.100.7")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client behind the same proxy has its own budget.
    let response = app
        .clone()
        .oneshot(login_from("10.0.0.2", Some("198.51.100.8")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = app(&AppConfig::default())
        .oneshot(get("/api/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
