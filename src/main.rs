use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{cors_layer, serve, AppState};
use sisreg_core::config::{config_from_lookup, cors_origins_from_env_value};
use sisreg_core::{ConsultaService, SisregClient};

/// Main entry point for the SISREG consultation proxy
///
/// Resolves configuration once from the environment (a `.env` file is honoured), then
/// serves the REST API.
///
/// # Environment Variables
/// - `SISREG_USUARIO`, `SISREG_SENHA`: upstream basic-auth credentials (required)
/// - `SISREG_BASE_URL`: upstream search host (default: "https://sisreg-es.saude.gov.br")
/// - `SISREG_SOLICITACAO_INDEX`, `SISREG_MARCACAO_INDEX`: referral and appointment indices
/// - `SISREG_TIMEOUT_SECS`: per-search timeout (default: 30)
/// - `SISREG_REST_ADDR`: server address (default: "0.0.0.0:8000")
/// - `SISREG_CORS_ORIGINS`: comma-separated allowed origins (default: any)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sisreg_run=info".parse()?)
                .add_directive("sisreg_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(config_from_lookup(|name| std::env::var(name).ok())?);
    let addr = std::env::var("SISREG_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let cors = cors_layer(&cors_origins_from_env_value(
        std::env::var("SISREG_CORS_ORIGINS").ok(),
    ))?;

    tracing::info!(
        "++ Starting SISREG consulta on {} (upstream {}, timeout {}s)",
        addr,
        cfg.base_url(),
        cfg.timeout().as_secs()
    );

    let client = SisregClient::new(cfg)?;
    serve(&addr, AppState::new(ConsultaService::new(client)), cors).await
}
