//! Backend entry-point: loads settings, prepares storage and mail, then
//! serves the REST API and OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppConfig, BuildMode, ServerConfig, SessionSettings, create_server, session_settings};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let SessionSettings {
        key,
        cookie_secure,
        same_site,
    } = session_settings(&config, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let mut server_config =
        ServerConfig::new(key, cookie_secure, same_site, config.bind_addr()?)
            .with_mail(config.mail_settings())
            .with_frontend_url(config.frontend_url());

    if let Some(database_url) = config.database_url.as_deref() {
        run_pending_migrations(database_url)
            .await
            .wrap_err("database migrations failed")?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(config.db_max_connections()),
        )
        .await
        .wrap_err("failed to create database pool")?;
        info!(max_connections = config.db_max_connections(), "database pool ready");
        server_config = server_config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, server_config)?;
    server.await?;
    Ok(())
}
