mod client;
mod config;
mod handler;
mod meme_api;
mod responder;
mod responders;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Args, Config};
use crate::handler::CommandHandler;
use crate::meme_api::MemeApiClient;
use crate::responders::meme::MemeResponder;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meme_bot=info,serenity=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_args(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}. Please check your .env file.");
            std::process::exit(1);
        }
    };

    info!("Starting meme bot");
    info!(
        url = %config.meme_api.url,
        timeout_secs = config.meme_api.timeout.as_secs(),
        "Meme API configured"
    );

    let fetcher = Arc::new(MemeApiClient::new(&config.meme_api)?);
    let responder = Arc::new(MemeResponder::new(fetcher));
    let handler = CommandHandler::new(responder);

    let mut client = client::build_client(&config.discord_token, handler).await?;

    info!("Connecting to Discord gateway...");

    client.start().await.context("Discord client stopped")?;

    Ok(())
}
