use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use governor::Quota;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::auth::{extract_bearer_token, AuthError, AuthService, UserSession, UserType};

/// JWT authentication middleware
pub async fn jwt_auth_middleware(
    State(auth_service): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = extract_bearer_token(auth_header)?;
    let session = auth_service.validate_session(token).await?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Reject the caller unless their account type is one of `allowed`
pub fn require_user_type(session: &UserSession, allowed: &[UserType]) -> Result<(), AuthError> {
    if allowed.contains(&session.user_type) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}

/// Admin-only middleware, layered under `jwt_auth_middleware`
pub async fn admin_only_middleware(request: Request, next: Next) -> Result<Response, AuthError> {
    let session = request
        .extensions()
        .get::<UserSession>()
        .ok_or(AuthError::MissingAuthHeader)?;

    require_user_type(session, &[UserType::Admin])?;

    Ok(next.run(request).await)
}

pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match origin.and_then(|value| value.parse::<HeaderValue>().ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

pub fn security_headers_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        axum::http::header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    )
}

type KeyedLimiter = governor::DefaultKeyedRateLimiter<IpAddr>;

/// Checks between sweeps of idle per-address state
const SWEEP_EVERY: u64 = 1024;

/// Per-client limiter for the public auth endpoints.
///
/// Clients are keyed on the TCP peer address. `X-Forwarded-For` is only
/// consulted when the peer is one of the configured trusted proxies.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<KeyedLimiter>,
    trusted_proxies: Arc<Vec<String>>,
    checks: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, trusted_proxies: Vec<String>) -> Self {
        let burst = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(governor::RateLimiter::keyed(Quota::per_minute(burst))),
            trusted_proxies: Arc::new(trusted_proxies),
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn check_rate_limit(&self, client: IpAddr) -> bool {
        let allowed = self.limiter.check_key(&client).is_ok();

        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
        }

        allowed
    }

    /// Addresses currently holding limiter state
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_trusted_proxy(&self, ip: IpAddr) -> bool {
        self.trusted_proxies
            .iter()
            .any(|proxy| proxy_matches(ip, proxy.trim()))
    }

    /// Address the request is attributed to. Forwarding headers are walked
    /// right to left, skipping trusted hops, and only when the peer itself
    /// is trusted.
    pub fn client_ip(&self, peer: IpAddr, headers: &HeaderMap) -> IpAddr {
        if !self.is_trusted_proxy(peer) {
            return peer;
        }

        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .rsplit(',')
                    .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
                    .find(|hop| !self.is_trusted_proxy(*hop))
            });

        match forwarded {
            Some(Some(client)) => client,
            Some(None) => peer,
            None => headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(peer),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("tracked_clients", &self.tracked_clients())
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}

/// Single address or CIDR block
fn proxy_matches(ip: IpAddr, proxy: &str) -> bool {
    let Some((network, prefix_len)) = proxy.split_once('/') else {
        return proxy.parse::<IpAddr>().map(|addr| addr == ip).unwrap_or(false);
    };

    let (Ok(network), Ok(prefix_len)) = (network.parse::<IpAddr>(), prefix_len.parse::<u32>())
    else {
        return false;
    };

    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            u32::from(ip) & mask == u32::from(net) & mask
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            u128::from(ip) & mask == u128::from(net) & mask
        }
        _ => false,
    }
}

pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    // Without a peer address the limit cannot be attributed to anyone.
    let Some(peer) = peer else {
        tracing::error!("rate limiter has no peer address; serve with connect info");
        return Err(AuthError::RateLimitExceeded);
    };

    let client = rate_limiter.client_ip(peer, request.headers());

    if !rate_limiter.check_rate_limit(client) {
        tracing::warn!(client = %client, path = %request.uri().path(), "rate limit exceeded");
        return Err(AuthError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn session(user_type: UserType) -> UserSession {
        UserSession {
            user_id: uuid::Uuid::new_v4(),
            username: "someone".to_string(),
            user_type,
            jti: "jti".to_string(),
            exp: 0,
        }
    }

    fn ip(value: &str) -> IpAddr {
        value.parse().unwrap()
    }

    #[test]
    fn test_rate_limiter_is_per_client() {
        let limiter = RateLimiter::new(3, Vec::new());

        assert!(limiter.check_rate_limit(ip("198.51.100.1")));
        assert!(limiter.check_rate_limit(ip("198.51.100.1")));
        assert!(limiter.check_rate_limit(ip("198.51.100.1")));
        assert!(!limiter.check_rate_limit(ip("198.51.100.1")));

        assert!(limiter.check_rate_limit(ip("198.51.100.2")));
    }

    #[test]
    fn test_idle_clients_are_swept() {
        // A cell replenishes every 60µs, so a bucket is full again almost at once.
        let limiter = RateLimiter::new(1_000_000, Vec::new());
        for n in 0..(SWEEP_EVERY as u32 - 1) {
            assert!(limiter.check_rate_limit(IpAddr::from(Ipv4Addr::from(0x0a00_0000 + n))));
        }
        assert_eq!(limiter.tracked_clients(), SWEEP_EVERY as usize - 1);

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(limiter.check_rate_limit(ip("198.51.100.1")));
        assert!(limiter.tracked_clients() <= 1);
    }

    #[test]
    fn test_require_user_type() {
        let owner = session(UserType::GymOwner);
        assert!(require_user_type(&owner, &[UserType::GymOwner, UserType::Admin]).is_ok());
        assert!(matches!(
            require_user_type(&owner, &[UserType::Member]),
            Err(AuthError::InsufficientPermissions)
        ));
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_forwarded_header_ignored_from_untrusted_peer() {
        let limiter = RateLimiter::new(10, Vec::new());
        let peer = ip("203.0.113.9");
        assert_eq!(limiter.client_ip(peer, &forwarded("10.0.0.1")), peer);
    }

    #[test]
    fn test_forwarded_header_from_trusted_proxy() {
        let limiter = RateLimiter::new(10, vec!["10.0.0.0/8".to_string(), "::1".to_string()]);
        let proxy = ip("10.1.2.3");

        assert_eq!(
            limiter.client_ip(proxy, &forwarded("1.1.1.1, 198.51.100.7, 10.0.0.5")),
            ip("198.51.100.7")
        );
        assert_eq!(limiter.client_ip(proxy, &HeaderMap::new()), proxy);
        assert_eq!(limiter.client_ip(proxy, &forwarded("garbage")), proxy);
        assert!(limiter.is_trusted_proxy(ip("::1")));
        assert!(!limiter.is_trusted_proxy(ip("11.0.0.1")));
    }

    #[test]
    fn test_proxy_matches_cidr() {
        assert!(proxy_matches(ip("192.168.1.40"), "192.168.1.0/24"));
        assert!(!proxy_matches(ip("192.168.2.40"), "192.168.1.0/24"));
        assert!(proxy_matches(ip("172.16.0.1"), "0.0.0.0/0"));
        assert!(proxy_matches(ip("fd00::1"), "fd00::/8"));
        assert!(!proxy_matches(ip("fd00::1"), "10.0.0.0/8"));
        assert!(!proxy_matches(ip("10.0.0.1"), "10.0.0.0/40"));
    }
}
