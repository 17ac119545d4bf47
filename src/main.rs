//  ██████╗██████╗ ███████╗██████╗ ██╗████████╗ ██████╗
// ██╔════╝██╔══██╗██╔════╝██╔══██╗██║╚══██╔══╝██╔═══██╗
// ██║     ██████╔╝█████╗  ██║  ██║██║   ██║   ██║   ██║
// ██║     ██╔══██╗██╔══╝  ██║  ██║██║   ██║   ██║   ██║
// ╚██████╗██║  ██║███████╗██████╔╝██║   ██║   ╚██████╔╝
//  ╚═════╝╚═╝  ╚═╝╚══════╝╚═════╝ ╚═╝   ╚═╝    ╚═════╝
//
// P Ú B L I C O
//
// Registry data, court jurisdiction and litigation hints for a Brazilian
// company, from nothing but its CNPJ and the public internet.

mod api;
mod cnpj;
mod config;
mod error;
mod jurisdiction;
mod metrics;
mod models;
mod sources;
mod text_scanner;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::AppState;
use crate::config::Config;

fn print_banner(config: &Config) {
    let banner = r#"
    ╔══════════════════════════════════════════════════════════════════╗
    ║                                                                  ║
    ║              ASSISTENTE CRÉDITO PÚBLICO                          ║
    ║                                                                  ║
    ║   Registry:  BrasilAPI CNPJ                                      ║
    ║   Indexers:  JusBrasil | Escavador                               ║
    ║   Courts:    TJ (27) | TRT (PJe-JT) | TRF (1-6)                  ║
    ║                                                                  ║
    ║   "Indícios, não processos."                                     ║
    ║                                                                  ║
    ╚══════════════════════════════════════════════════════════════════╝
    "#;
    println!("{}", banner);
    println!("    {} v{}\n", config.service_title, config.service_version);
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => warn!("🛑 Shutdown signal received!"),
        Err(err) => error!("❌ Signal listener error: {}", err),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json);

    if !config.log_json {
        print_banner(&config);
    }

    info!(
        bind_addr = config.bind_addr.as_str(),
        registry = config.registry_base_url.as_str(),
        registry_timeout_secs = config.registry_timeout.as_secs(),
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        "✅ Configuration loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config).context("failed to build outbound HTTP client")?;
    let app = api::router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("🟢 Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("💤 Server stopped");
    Ok(())
}
