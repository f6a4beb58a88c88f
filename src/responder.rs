use async_trait::async_trait;
use serenity::all::{ChannelId, Message, UserId};

/// A message observed on the gateway, reduced to what responders need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// User ID of the message author
    pub author_id: UserId,
    /// The actual message text
    pub content: String,
    /// Channel the message was posted in, and where replies go
    pub channel_id: ChannelId,
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            author_id: msg.author.id,
            content: msg.content.clone(),
            channel_id: msg.channel_id,
        }
    }
}

/// Core trait that all responders must implement
#[async_trait]
pub trait Responder: Send + Sync {
    /// Returns the name of this responder
    fn name(&self) -> &str;

    /// Check if this responder should handle the message
    /// This is called first as a fast filter before handle()
    fn should_handle(&self, message: &IncomingMessage) -> bool;

    /// Handle the message and return the reply text
    /// Only called if should_handle() returns true; failures are turned into a reply here
    async fn handle(&self, message: &IncomingMessage) -> String;
}
