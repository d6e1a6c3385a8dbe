use gymhub_cli::api::{ApiClient, ApiError};
use gymhub_cli::config::Config;
use mockito::{Matcher, Server};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn config_for(server_url: &str, dir: &TempDir, access: &str, refresh: &str) -> (Config, PathBuf) {
    let path = dir.path().join("config.toml");
    let mut config = Config::default().with_path(&path);
    config.api.base_url = server_url.to_string();
    config.api.timeout_seconds = 5;
    if !access.is_empty() {
        config.set_tokens("maria", access.to_string(), refresh.to_string());
    }
    config.save().unwrap();
    (config, path)
}

fn reload(path: &Path) -> Config {
    Config::load_from(path).unwrap()
}

fn auth_body(access: &str, refresh: &str) -> String {
    json!({
        "user": {
            "id": "5f0c2f6e-9a53-4f7e-8d9c-6c8a1d2b3e4f",
            "username": "maria",
            "email": "maria@example.com",
            "first_name": "Maria",
            "last_name": "K",
            "user_type": "member"
        },
        "access": access,
        "refresh": refresh
    })
    .to_string()
}

#[tokio::test]
async fn test_login_stores_both_tokens() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "", "");

    let login = server
        .mock("POST", "/api/auth/login/")
        .match_body(Matcher::Json(json!({"username": "maria", "password": "sweat2024"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(auth_body("access-1", "refresh-1"))
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let response = client.login("maria", "sweat2024").await.unwrap();
    assert_eq!(response.user.display_name(), "Maria K");
    login.assert_async().await;

    let saved = reload(&path);
    assert_eq!(saved.auth.access_token, "access-1");
    assert_eq!(saved.auth.refresh_token, "refresh-1");
    assert_eq!(saved.auth.username, "maria");
}

#[tokio::test]
async fn test_bad_credentials_not_retried() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "", "");

    let login = server
        .mock("POST", "/api/auth/login/")
        .with_status(401)
        .with_body(r#"{"error": "invalid_credentials", "message": "Invalid username or password"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let result = client.login("maria", "wrong-pass1").await;

    match result {
        Err(ApiError::Unauthorized(message)) => assert_eq!(message, "Invalid username or password"),
        other => panic!("expected Unauthorized, got {:?}", other.map(|r| r.access)),
    }
    login.assert_async().await;
    assert!(!reload(&path).is_authenticated());
}

#[tokio::test]
async fn test_login_sent_once_on_server_error() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "", "");

    let login = server
        .mock("POST", "/api/auth/login/")
        .with_status(500)
        .with_body(r#"{"error": "Internal server error", "message": "Internal server error"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let result = client.login("maria", "sweat2024").await;

    assert!(matches!(result, Err(ApiError::ServerError(_))));
    login.assert_async().await;
    assert!(!reload(&path).is_authenticated());
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_once() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "stale", "refresh-1");

    let rejected = server
        .mock("GET", "/api/notices/")
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .with_body(r#"{"error": "token_expired", "message": "Token has expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh/")
        .match_body(Matcher::Json(json!({"refresh": "refresh-1"})))
        .with_status(200)
        .with_body(r#"{"access": "fresh"}"#)
        .expect(1)
        .create_async()
        .await;
    let replayed = server
        .mock("GET", "/api/notices/")
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let notices = client.notices().await.unwrap();
    assert!(notices.is_empty());

    rejected.assert_async().await;
    refresh.assert_async().await;
    replayed.assert_async().await;

    let saved = reload(&path);
    assert_eq!(saved.auth.access_token, "fresh");
    assert_eq!(saved.auth.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_second_401_after_refresh_is_returned() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "stale", "refresh-1");

    let rejected = server
        .mock("GET", "/api/notices/")
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh/")
        .with_status(200)
        .with_body(r#"{"access": "fresh"}"#)
        .expect(1)
        .create_async()
        .await;
    let replayed = server
        .mock("GET", "/api/notices/")
        .match_header("authorization", "Bearer fresh")
        .with_status(401)
        .with_body(r#"{"error": "Invalid token", "message": "Invalid token"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let result = client.notices().await;

    match result {
        Err(ApiError::Unauthorized(message)) => assert_eq!(message, "Invalid token"),
        other => panic!("expected Unauthorized, got {:?}", other.map(|n| n.len())),
    }
    rejected.assert_async().await;
    refresh.assert_async().await;
    replayed.assert_async().await;

    assert_eq!(reload(&path).auth.access_token, "fresh");
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "stale", "revoked");

    let rejected = server
        .mock("GET", "/api/dashboard/stats/")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh/")
        .with_status(401)
        .with_body(r#"{"error": "token_revoked", "message": "Token has been revoked"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let result = client.dashboard_stats().await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));

    rejected.assert_async().await;
    refresh.assert_async().await;

    let saved = reload(&path);
    assert!(!saved.is_authenticated());
    assert!(saved.auth.refresh_token.is_empty());
}

#[tokio::test]
async fn test_server_error_message_surfaces() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, _) = config_for(&server.url(), &dir, "token", "refresh");
    let gym = uuid::Uuid::new_v4();

    let _mark = server
        .mock("POST", format!("/api/gyms/{}/attendance/mark/", gym).as_str())
        .with_status(409)
        .with_body(r#"{"error": "conflict", "message": "Attendance already marked for today"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let err = client.mark_attendance(gym).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
    assert_eq!(err.to_string(), "Conflict: Attendance already marked for today");
}

#[tokio::test]
async fn test_city_filter_sent_as_query() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, _) = config_for(&server.url(), &dir, "token", "refresh");

    let gyms = server
        .mock("GET", "/api/gyms/")
        .match_query(Matcher::UrlEncoded("city".into(), "Porto".into()))
        .with_status(200)
        .with_body(
            json!([{
                "id": "0d6f3c55-2f0a-4a8e-9a35-0d9b7e1f2c3a",
                "name": "Ribeira Strength",
                "address": "Rua das Flores 10, Porto",
                "phone": "+351 220 000 000",
                "email": "hello@ribeira.example",
                "description": null,
                "member_count": 42,
                "owner_name": "Ana Silva"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    let result = client.available_gyms(Some(" Porto ")).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].member_count, 42);
    gyms.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_tokens_even_when_server_fails() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (config, path) = config_for(&server.url(), &dir, "token", "refresh");

    let logout = server
        .mock("POST", "/api/auth/logout/")
        .match_header("authorization", "Bearer token")
        .with_status(500)
        .create_async()
        .await;

    let client = ApiClient::new(config).unwrap();
    client.logout().await.unwrap();

    logout.assert_async().await;
    assert!(!reload(&path).is_authenticated());
}

#[test]
fn test_config_authentication_status() {
    let mut config = Config::default();
    assert!(!config.is_authenticated());

    config.set_tokens("maria", "access".to_string(), "refresh".to_string());
    assert!(config.is_authenticated());

    config.clear_tokens();
    assert!(!config.is_authenticated());
}
