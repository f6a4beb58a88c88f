use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::meme_api::MemeFetcher;
use crate::responder::{IncomingMessage, Responder};

/// Literal prefix that triggers a meme fetch (case-sensitive)
pub const TRIGGER: &str = "$meme";

/// Reply sent when the meme API could not deliver
pub const FALLBACK_REPLY: &str = "🚫 Couldn't fetch meme. Try again later!";

/// Answers `$meme` with a fresh meme URL
pub struct MemeResponder {
    fetcher: Arc<dyn MemeFetcher>,
}

impl MemeResponder {
    pub fn new(fetcher: Arc<dyn MemeFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Responder for MemeResponder {
    fn name(&self) -> &str {
        "MemeResponder"
    }

    fn should_handle(&self, message: &IncomingMessage) -> bool {
        message.content.starts_with(TRIGGER)
    }

    async fn handle(&self, message: &IncomingMessage) -> String {
        match self.fetcher.fetch_meme_url().await {
            Ok(url) => {
                info!(channel_id = %message.channel_id, url = %url, "✅ Fetched meme");
                url
            }
            Err(e) => {
                error!(
                    channel_id = %message.channel_id,
                    kind = %e.kind(),
                    error = %e,
                    "API request failed"
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
