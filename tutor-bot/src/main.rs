//! tutor-bot - WhatsApp AI tutor service
//!
//! Serves the Twilio webhook plus a few operator endpoints. Configuration
//! resolves once at startup; see `tutor_common::config` for precedence.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tutor_bot::lesson::OpenRouterClient;
use tutor_bot::twilio::TwilioClient;
use tutor_bot::{build_router, AppState};
use tutor_common::config::{
    load_toml_config, resolve_database_path, resolve_root_folder, BotConfig, LlmConfig,
    TwilioConfig, DEFAULT_HOST, DEFAULT_PORT,
};
use tutor_common::db::init_database;

/// Command-line arguments for tutor-bot
#[derive(Parser, Debug)]
#[command(name = "tutor-bot")]
#[command(about = "WhatsApp AI tutor webhook service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "WA_TUTOR_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref()).context("Failed to load config")?;

    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tutor_bot={0},tutor_common={0},tower_http={0}", level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting WhatsApp AI Tutor (tutor-bot) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let database_path = resolve_database_path(&root_folder, &toml_config);

    let config = BotConfig {
        host: args
            .host
            .or_else(|| toml_config.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
        database_path,
        llm: LlmConfig::resolve(&toml_config),
        twilio: TwilioConfig::resolve(&toml_config),
    };

    info!("Root folder: {}", root_folder.display());
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let lesson_client =
        OpenRouterClient::new(config.llm.clone()).context("Failed to build lesson client")?;
    if config.llm.is_configured() {
        match lesson_client.probe().await {
            Ok(_) => info!("✓ Lesson service reachable (model {})", config.llm.model),
            Err(e) => warn!("Lesson service check failed: {}", e),
        }
    } else {
        warn!("OPENROUTER_API_KEY not set. Lesson requests will get a failure reply.");
    }

    let twilio = match config.twilio.clone() {
        Some(twilio_config) => {
            Some(TwilioClient::new(twilio_config).context("Failed to build Twilio client")?)
        }
        None => None,
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool, Arc::new(lesson_client), twilio, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("tutor-bot listening on http://{}", bind_address);
    info!("Webhook: POST http://{}/whatsapp", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
