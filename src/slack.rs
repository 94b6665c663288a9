//! Thin client for the Slack Web API methods the bot needs.

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::rtm::{EventSource, RtmConnection};

/// Base URL for Slack Web API.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Request body for `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub as_user: bool,
}

impl PostMessage {
    pub fn text(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: Some(text.into()),
            blocks: None,
            user: None,
            as_user: true,
        }
    }

    pub fn blocks(channel: impl Into<String>, blocks: Vec<serde_json::Value>) -> Self {
        Self {
            channel: channel.into(),
            text: None,
            blocks: Some(blocks),
            user: None,
            as_user: true,
        }
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }
}

/// The subset of Slack the bot talks to.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Returns the user id of the token's owner (`auth.test`).
    async fn auth_test(&self) -> Result<String>;
    /// Posts a message to a channel (`chat.postMessage`).
    async fn post_message(&self, message: &PostMessage) -> Result<()>;
    /// Opens a real-time event stream (`rtm.connect`).
    async fn rtm_connect(&self) -> Result<Box<dyn EventSource>>;
}

/// Generic Slack API response envelope.
#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(bot_token: String) -> Self {
        Self::with_base_url(bot_token, SLACK_API_BASE.to_string())
    }

    /// Points the client at another API root, e.g. a local mock server.
    pub fn with_base_url(bot_token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Calls any Web API method with a JSON body and returns the response payload
    /// (minus `ok`/`error`) once Slack reports success.
    pub async fn api_call(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::HttpStatus {
                url: response.url().to_string(),
                status: response.status(),
            });
        }

        let api_response: SlackApiResponse = response.json().await?;

        if !api_response.ok {
            let error_msg = api_response.error.as_deref().unwrap_or("unknown");
            warn!("Slack API error from {}: {}", method, error_msg);
            return Err(BotError::SlackApi(format!("{method} error: {error_msg}")));
        }

        Ok(api_response.rest)
    }

    fn string_field(
        method: &str,
        payload: &serde_json::Map<String, serde_json::Value>,
        field: &str,
    ) -> Result<String> {
        payload
            .get(field)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BotError::SlackApi(format!("{method} response missing '{field}'")))
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn auth_test(&self) -> Result<String> {
        debug!("Calling auth.test");
        let payload = self.api_call("auth.test", &serde_json::json!({})).await?;
        Self::string_field("auth.test", &payload, "user_id")
    }

    async fn post_message(&self, message: &PostMessage) -> Result<()> {
        debug!("Posting message to {}", message.channel);
        let body = serde_json::to_value(message)?;
        self.api_call("chat.postMessage", &body).await?;
        Ok(())
    }

    async fn rtm_connect(&self) -> Result<Box<dyn EventSource>> {
        debug!("Calling rtm.connect");
        let payload = self.api_call("rtm.connect", &serde_json::json!({})).await?;
        let url = Self::string_field("rtm.connect", &payload, "url")?;
        let connection = RtmConnection::connect(&url).await?;
        Ok(Box::new(connection))
    }
}
