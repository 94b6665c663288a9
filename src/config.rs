use std::env;

use log::{debug, error, info};

use crate::error::{BotError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub slack_bot_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let slack_bot_token = env::var("SLACK_BOT_TOKEN").map_err(|e| {
            error!("Failed to load SLACK_BOT_TOKEN from environment: {}", e);
            e
        })?;

        Self::from_token(slack_bot_token)
    }

    /// Build a config from an explicit token, rejecting blank values.
    pub fn from_token(slack_bot_token: String) -> Result<Self> {
        if slack_bot_token.trim().is_empty() {
            error!("SLACK_BOT_TOKEN is set but empty");
            return Err(BotError::Config("SLACK_BOT_TOKEN is empty".to_string()));
        }

        info!("Configuration loaded successfully");
        debug!("Slack token length: {} characters", slack_bot_token.len());

        Ok(Self { slack_bot_token })
    }
}
