use anyhow::{Context, Result};
use serenity::all::{Client, GatewayIntents};
use tracing::info;

use crate::handler::CommandHandler;

/// Gateway intents needed to see message text in guilds and DMs
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Build a new Discord client with the command handler registered
pub async fn build_client(token: &str, handler: CommandHandler) -> Result<Client> {
    info!("🔐 Building Discord client");

    Client::builder(token, gateway_intents())
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")
}
