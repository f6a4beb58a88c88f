use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::all::{
    ChannelId, Context, CreateMessage, EventHandler, Http, Message, Ready, UserId,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::responder::{IncomingMessage, Responder};

/// The bot's own account, learned from the gateway `ready` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: UserId,
    pub name: String,
}

/// Sends a plain-text message to a channel
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, channel_id: ChannelId, text: &str) -> Result<()>;
}

/// [`Replier`] backed by the Discord REST API
pub struct HttpReplier {
    http: Arc<Http>,
}

impl HttpReplier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Replier for HttpReplier {
    async fn reply(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        channel_id
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .with_context(|| format!("Failed to send message to channel {channel_id}"))?;
        Ok(())
    }
}

/// Gates incoming messages and routes triggers to the responder
pub struct CommandHandler {
    responder: Arc<dyn Responder>,
    identity: OnceCell<BotIdentity>,
}

impl CommandHandler {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            identity: OnceCell::new(),
        }
    }

    /// Record the bot's identity. Later calls (gateway resumes) keep the first value.
    pub fn set_identity(&self, identity: BotIdentity) {
        let _ = self.identity.set(identity);
    }

    /// Handle one message, sending at most one reply
    ///
    /// Never fails: delivery errors are logged and dropped.
    pub async fn handle(&self, message: &IncomingMessage, replier: &dyn Replier) {
        let Some(identity) = self.identity.get() else {
            debug!("Ignoring message received before ready");
            return;
        };

        // Ignore messages from ourselves to prevent feedback loops
        if message.author_id == identity.id {
            debug!(bot = %identity.name, "Ignoring own message");
            return;
        }

        if !self.responder.should_handle(message) {
            return;
        }

        debug!(
            responder = self.responder.name(),
            channel_id = %message.channel_id,
            author_id = %message.author_id,
            "Handling command"
        );

        let reply = self.responder.handle(message).await;

        if let Err(e) = replier.reply(message.channel_id, &reply).await {
            error!(
                channel_id = %message.channel_id,
                error = %e,
                "✗ Failed to send reply"
            );
        }
    }
}

#[async_trait]
impl EventHandler for CommandHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged on as {} (ID: {})", ready.user.name, ready.user.id);
        self.set_identity(BotIdentity {
            id: ready.user.id,
            name: ready.user.name.clone(),
        });
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let message = IncomingMessage::from(&msg);
        let replier = HttpReplier::new(ctx.http.clone());
        self.handle(&message, &replier).await;
    }
}
