//! Backend entry-point: loads settings, connects adapters and serves the
//! API, health probes and the rendered document shell.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recordkeeper::domain::PasswordHasher;
use recordkeeper::inbound::http::health::HealthState;
use recordkeeper::inbound::http::session_config::{BuildMode, session_settings_from_env};
use recordkeeper::inbound::ssr::{ChunkManifest, SsrState};
use recordkeeper::settings::AppSettings;

use server::{ServerConfig, build_adapters, build_http_state, create_server};

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(startup_error)?;
    let mode = BuildMode::from_debug_assertions();
    let session = session_settings_from_env(&DefaultEnv::new(), mode).map_err(startup_error)?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let secrets = settings.token_secrets(mode).map_err(startup_error)?;
    let hasher = settings
        .bcrypt_cost
        .map_or_else(PasswordHasher::default, PasswordHasher::with_cost);
    let adapters = build_adapters(&settings, clock.clone())
        .await
        .map_err(startup_error)?;
    let http_state = build_http_state(&adapters, secrets, hasher, clock);

    let manifest =
        ChunkManifest::load_or_fallback(&settings.client_stats_path(), !settings.production);
    let ssr_state = SsrState::new(manifest, settings.production);

    let health = adapters.secret_store.clone().map_or_else(HealthState::new, |probe| {
        HealthState::new().with_secret_store(probe)
    });
    let health_state = web::Data::new(health);

    let bind_addr = settings.bind_addr();
    let config = ServerConfig::new(session, bind_addr)
        .with_static_dirs(settings.client_dir(), settings.assets_dir());
    let server = create_server(health_state.clone(), http_state, ssr_state, config)?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    if let Some(cleanup) = adapters.cleanup {
        cleanup.abort();
    }
    result
}
