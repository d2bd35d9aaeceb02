mod config;
mod error;
mod homework;
mod platform;
mod practicum;
mod scheduler;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Credentials, LoggingConfig, Settings};
use crate::platform::telegram::TelegramNotifier;
use crate::practicum::PracticumClient;
use crate::scheduler::PollLoop;

const DEFAULT_CONFIG_PATH: &str = "homework_bot.toml";

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,homework_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // An explicitly named config file must exist; the default one is optional
    let (config_path, required) = match std::env::args().nth(1) {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let settings = Settings::load(&config_path, required)?;

    init_logging(&settings.logging)?;
    info!("Bot is starting...");

    let credentials = Credentials::from_env().map_err(|e| {
        error!("{}. Stopping.", e);
        e
    })?;
    let config = Config::new(credentials, settings);

    info!("Configuration loaded successfully");
    info!("  Endpoint: {}", config.practicum.endpoint);
    info!("  Request timeout: {}s", config.practicum.request_timeout_secs);
    info!("  Retry interval: {}s", config.poll.retry_secs);
    info!("  Chat: {}", config.credentials.telegram_chat_id);

    let client = PracticumClient::new(
        &config.practicum,
        config.credentials.practicum_token.clone(),
    )
    .context("Failed to build Practicum client")?;
    let notifier = TelegramNotifier::new(
        &config.credentials.telegram_token,
        &config.credentials.telegram_chat_id,
    );

    let mut poll = PollLoop::new(client, notifier, config.poll.retry_interval());
    poll.run().await;

    Ok(())
}
