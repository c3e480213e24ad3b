mod api;
mod handler;
mod messages;
mod metrics;
mod poller;
mod state;
mod telegram;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magnetdrop_core::{load_config, validate_config, Pipeline, SanitizedConfig};

use api::create_router;
use handler::BotHandler;
use state::AppState;
use telegram::TelegramClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let json = std::env::var("MAGNETDROP_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("MAGNETDROP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        config = ?SanitizedConfig::from(&config),
        "Configuration loaded successfully"
    );

    let pipeline =
        Arc::new(Pipeline::from_config(&config).context("Failed to create HTTP client")?);

    let client = TelegramClient::new(config.telegram.token.clone())
        .context("Failed to create Telegram client")?;
    let me = client
        .get_me()
        .await
        .context("Failed to authenticate bot token with Telegram")?;
    info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or(""),
        "Authorized on Telegram"
    );

    let handler = Arc::new(
        BotHandler::new(Arc::clone(&pipeline), Arc::new(client.clone()), &config)
            .with_bot_username(me.username.clone()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Optional health/metrics endpoint
    let server_handle = if config.server.enabled {
        let app = create_router(Arc::new(AppState::new(config.clone())));
        let addr = SocketAddr::new(config.server.host, config.server.port);
        info!("Starting health/metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        let mut rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.wait_for(|stop| *stop).await;
                })
                .await;
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }))
    } else {
        info!("Health/metrics server disabled in config");
        None
    };

    let poll_timeout = Duration::from_secs(config.telegram.poll_timeout_secs as u64);
    poller::run_polling(&client, handler, poll_timeout, shutdown_signal()).await;

    info!("Bot shutting down...");
    let _ = shutdown_tx.send(true);
    drop(shutdown_rx);
    if let Some(handle) = server_handle {
        let _ = handle.await;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
