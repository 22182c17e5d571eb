//! Dashboard entry-point: loads settings, builds the REST backend client and
//! serves the guarded pages, actions and OpenAPI docs.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dashboard::inbound::http::health::HealthState;
use dashboard::inbound::http::state::HttpStatePorts;
use dashboard::outbound::rest::RestBackend;
use server::{DashboardSettings, ServerConfig, create_server};

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

    let settings = DashboardSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let api_url = settings.api_url().map_err(std::io::Error::other)?;

    let backend = RestBackend::new(api_url, settings.request_timeout())
        .map_err(|e| std::io::Error::other(format!("failed to build backend client: {e}")))?;
    let api_url = backend.base().to_string();

    let config = ServerConfig::new(bind_addr, HttpStatePorts::from_backend(Arc::new(backend)))
        .with_cookie_secure(settings.cookie_secure())
        .with_token_policy(settings.token_policy())
        .with_max_images(settings.max_images())
        .with_max_drafts(settings.max_drafts());
    info!(%api_url, bind_addr = %config.bind_addr(), "starting dashboard");
    if !settings.cookie_secure() {
        warn!("token cookie is not marked Secure");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
