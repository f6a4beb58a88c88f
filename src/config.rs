use clap::Parser;
use std::time::Duration;
use thiserror::Error;

/// Endpoint serving one random meme per GET
pub const DEFAULT_MEME_API_URL: &str = "https://meme-api.com/gimme";

/// Upper bound for a single meme API request
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Discord meme bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Meme API endpoint
    #[arg(long, env = "MEME_API_URL", default_value = DEFAULT_MEME_API_URL)]
    pub meme_api_url: String,

    /// Meme API request timeout in seconds
    #[arg(long, env = "MEME_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN is not set")]
    MissingToken,
}

/// Settings for the outbound meme API call
#[derive(Debug, Clone)]
pub struct MemeApiConfig {
    pub url: String,
    pub timeout: Duration,
}

/// Process-wide configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub meme_api: MemeApiConfig,
}

impl Config {
    /// Validate parsed arguments into a config
    ///
    /// A blank token counts as missing.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let discord_token = args
            .token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            discord_token,
            meme_api: MemeApiConfig {
                url: args.meme_api_url,
                timeout: Duration::from_secs(args.timeout_secs),
            },
        })
    }
}
