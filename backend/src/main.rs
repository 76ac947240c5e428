//! Server entry point: load settings, seed accounts, and serve the pages.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rolegate::config::AppSettings;
use rolegate::inbound::http::health::HealthState;
use rolegate::inbound::http::session_config::{BuildMode, session_settings_from_env};
use rolegate::inbound::http::state::HttpState;
use rolegate::outbound::{BcryptPasswordHasher, InMemoryCredentialStore};
use rolegate::seed::seed_accounts;
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("configuration error: {e}")))?;

    let session = session_settings_from_env(&DefaultEnv::default(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %session.fingerprint(),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let hasher = BcryptPasswordHasher::new(settings.bcrypt_cost()).map_err(std::io::Error::other)?;
    let http_state = web::Data::new(HttpState::from_ports(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(hasher),
    ));

    if settings.skip_seed {
        info!(reason = "disabled", "account seeding skipped");
    } else {
        seed_accounts(&http_state.accounts, &settings.seed_accounts())
            .await
            .map_err(std::io::Error::other)?;
    }

    let bind_addr = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        http_state,
        ServerConfig::from_session(session, bind_addr),
    )?;
    info!(%bind_addr, "listening");
    server.await
}
