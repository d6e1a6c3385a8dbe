use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    AttendanceStats, AuthResponse, Gym, LeaderboardEntry, LoginRequest, MarkAttendanceResponse,
    Membership, Notice, Plan, SignupRequest, TokenResponse, UserInfo,
};

mod error;

pub use error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP client for the GymHub API. Tokens live in the shared `Config` and are
/// written back to disk whenever they change.
///
/// Every request is sent once. The only replay is the one that follows a
/// successful token refresh after a 401.
pub struct ApiClient {
    client: Client,
    base_url: String,
    config: Arc<Mutex<Config>>,
}

impl ApiClient {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds);
        let base_url = config.api.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            config: Arc::new(Mutex::new(config)),
        })
    }

    fn config(&self) -> MutexGuard<'_, Config> {
        match self.config.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Copy of the current config, tokens included
    pub fn config_snapshot(&self) -> Config {
        self.config().clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn access_token(&self) -> ApiResult<String> {
        let config = self.config();
        if !config.is_authenticated() {
            return Err(ApiError::NotLoggedIn);
        }
        Ok(config.auth.access_token.clone())
    }

    fn store_login(&self, response: &AuthResponse) -> ApiResult<()> {
        let mut config = self.config();
        config.set_tokens(
            &response.user.username,
            response.access.clone(),
            response.refresh.clone(),
        );
        config.save()?;
        Ok(())
    }

    fn clear_tokens(&self) -> ApiResult<()> {
        let mut config = self.config();
        config.clear_tokens();
        config.save()?;
        Ok(())
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|err| ApiError::ServerError(format!("Unexpected response body: {}", err)))
    }

    async fn ensure_success(response: Response) -> ApiResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        tracing::debug!(username, "Logging in");

        let response = self
            .client
            .post(self.url("/api/auth/login/"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let response: AuthResponse = Self::parse(response).await?;

        self.store_login(&response)?;
        tracing::info!(username = %response.user.username, "Logged in");
        Ok(response)
    }

    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        let response = self
            .client
            .post(self.url("/api/auth/signup/"))
            .json(request)
            .send()
            .await?;
        let response: AuthResponse = Self::parse(response).await?;

        self.store_login(&response)?;
        Ok(response)
    }

    /// Revoke the session on the server when possible, then forget the tokens
    pub async fn logout(&self) -> ApiResult<()> {
        let (access, refresh) = {
            let config = self.config();
            (config.auth.access_token.clone(), config.auth.refresh_token.clone())
        };

        if !access.is_empty() {
            let result = self
                .client
                .post(self.url("/api/auth/logout/"))
                .bearer_auth(&access)
                .json(&json!({ "refresh": refresh }))
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "Server rejected logout")
                }
                Err(err) => tracing::debug!(error = %err, "Logout request failed"),
            }
        }

        self.clear_tokens()
    }

    /// Trade the refresh token for a new access token. Any rejection ends the session.
    async fn refresh_access_token(&self) -> ApiResult<String> {
        let refresh = self.config().auth.refresh_token.clone();
        if refresh.is_empty() {
            self.clear_tokens()?;
            return Err(ApiError::SessionExpired);
        }

        tracing::debug!("Refreshing access token");
        let response = self
            .client
            .post(self.url("/api/auth/refresh/"))
            .json(&json!({ "refresh": refresh }))
            .send()
            .await?;

        let token = match Self::parse::<TokenResponse>(response).await {
            Ok(token) => token,
            Err(ApiError::Network(err)) => return Err(ApiError::Network(err)),
            Err(err) => {
                tracing::debug!(error = %err, "Refresh rejected");
                self.clear_tokens()?;
                return Err(ApiError::SessionExpired);
            }
        };

        {
            let mut config = self.config();
            config.auth.access_token = token.access.clone();
            config.save()?;
        }

        Ok(token.access)
    }

    fn build(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: &str,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    /// Authenticated request. A 401 triggers one refresh and one replay.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<Response> {
        let token = self.access_token()?;
        let response = self.build(&method, path, query, body, &token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(path, "Received 401, refreshing token");
        let token = self.refresh_access_token().await?;
        Ok(self.build(&method, path, query, body, &token).send().await?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        Self::parse(self.send(Method::GET, path, &[], None).await?).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        Self::parse(self.send(Method::GET, path, query, None).await?).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::BadRequest(err.to_string()))?;
        Self::parse(self.send(Method::POST, path, &[], Some(&body)).await?).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::BadRequest(err.to_string()))?;
        Self::parse(self.send(Method::PUT, path, &[], Some(&body)).await?).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        Self::ensure_success(self.send(Method::DELETE, path, &[], None).await?).await
    }

    pub async fn profile(&self) -> ApiResult<UserInfo> {
        self.get("/api/auth/profile/").await
    }

    pub async fn available_gyms(&self, city: Option<&str>) -> ApiResult<Vec<Gym>> {
        let query: Vec<(&str, String)> = city
            .filter(|city| !city.trim().is_empty())
            .map(|city| vec![("city", city.trim().to_string())])
            .unwrap_or_default();
        self.get_with_query("/api/gyms/", &query).await
    }

    pub async fn gym_plans(&self, gym_id: Uuid) -> ApiResult<Vec<Plan>> {
        self.get(&format!("/api/gyms/{}/plans/", gym_id)).await
    }

    pub async fn request_membership(&self, gym_id: Uuid, plan_id: Uuid) -> ApiResult<Membership> {
        self.post(&format!("/api/gyms/{}/plans/{}/request/", gym_id, plan_id), &json!({}))
            .await
    }

    pub async fn memberships(&self, status: Option<&str>) -> ApiResult<Vec<Membership>> {
        let query: Vec<(&str, String)> = status
            .map(|status| vec![("status", status.to_string())])
            .unwrap_or_default();
        self.get_with_query("/api/memberships/", &query).await
    }

    pub async fn mark_attendance(&self, gym_id: Uuid) -> ApiResult<MarkAttendanceResponse> {
        self.post(&format!("/api/gyms/{}/attendance/mark/", gym_id), &json!({}))
            .await
    }

    pub async fn attendance_stats(&self, gym_id: Uuid) -> ApiResult<AttendanceStats> {
        self.get(&format!("/api/gyms/{}/attendance/stats/", gym_id)).await
    }

    pub async fn leaderboard(&self, gym_id: Uuid) -> ApiResult<Vec<LeaderboardEntry>> {
        self.get(&format!("/api/gyms/{}/attendance/leaderboard/", gym_id))
            .await
    }

    pub async fn notices(&self) -> ApiResult<Vec<Notice>> {
        self.get("/api/notices/").await
    }

    /// Role-specific payload; the shape depends on `role`
    pub async fn dashboard_stats(&self) -> ApiResult<Value> {
        self.get("/api/dashboard/stats/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = Config::default();
        config.api.base_url = "http://gym.local:8000/".to_string();
        let client = ApiClient::new(config).unwrap();
        assert_eq!(client.url("/api/gyms/"), "http://gym.local:8000/api/gyms/");
    }

    #[tokio::test]
    async fn test_requires_login() {
        let client = ApiClient::new(Config::default()).unwrap();
        let result = client.notices().await;
        assert!(matches!(result, Err(ApiError::NotLoggedIn)));
    }
}
