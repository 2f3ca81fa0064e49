//! Backend entry-point: loads settings, prepares storage and serves the blog.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use blog_backend::inbound::http::health::HealthState;
use blog_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server, load_session_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let key = load_session_key(
        &settings.session_key_file(),
        settings.allow_ephemeral_session_key,
    )
    .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure,
        settings.bind_addr(),
        &settings.media_root(),
    );
    if let Some(database_url) = settings.database_url.as_deref() {
        run_pending_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_pool_max_size),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %settings.bind_addr(), "starting server");
    let server = create_server(health_state, config)?;
    server.await
}
