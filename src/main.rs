use anyhow::Context;
use axum::extract::Request;
use axum::ServiceExt;
use chrono::Duration;
use std::net::SocketAddr;
use gymhub::api::routes::create_app;
use gymhub::api::AppState;
use gymhub::auth::{AuthService, JwtService};
use gymhub::config::{run_migrations, seed_admin, AppConfig, DatabaseConfig, SeedConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    if let Some(seed) = SeedConfig::from_env() {
        seed_admin(&pool, &seed).await?;
    }

    let jwt = JwtService::with_lifetimes(
        &config.jwt_secret,
        Duration::minutes(config.access_token_ttl_minutes),
        Duration::days(config.refresh_token_ttl_days),
    );
    let state = AppState::new(pool.clone(), AuthService::new(pool, jwt));
    let app = create_app(state, &config);

    let address = config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!(environment = %config.environment, "GymHub server listening on http://{}", address);

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
