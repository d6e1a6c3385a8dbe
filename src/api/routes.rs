use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::{
    admin, attendance, auth, dashboard, exercise_entries, gyms, memberships, notices,
    recommendations, routines, AppState,
};
use crate::auth::{
    admin_only_middleware, cors_layer, jwt_auth_middleware, rate_limit_middleware,
    security_headers_layer, RateLimiter,
};
use crate::config::AppConfig;

/// Every route of the API. Public auth endpoints are rate limited; everything
/// under the protected router requires a valid access token.
pub fn create_routes(state: AppState, config: &AppConfig) -> Router {
    let limiter = RateLimiter::new(
        config.auth_rate_limit_per_minute,
        config.trusted_proxies.clone(),
    );

    let public = auth::public_routes()
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware));

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(gyms::routes())
        .merge(attendance::routes())
        .merge(memberships::routes())
        .merge(notices::routes())
        .merge(exercise_entries::routes())
        .merge(dashboard::routes())
        .merge(recommendations::routes())
        .merge(routines::routes())
        .merge(admin::routes().route_layer(from_fn(admin_only_middleware)))
        .route_layer(from_fn_with_state(
            state.auth_service.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer(config.cors_origin.as_deref()))
        .with_state(state)
}

/// The router wrapped so `/api/gyms/` and `/api/gyms` reach the same handler.
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>`; the
/// auth rate limiter keys on the peer address.
pub fn create_app(state: AppState, config: &AppConfig) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(create_routes(state, config))
}
