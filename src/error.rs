use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("RTM connection closed")]
    ConnectionClosed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Menu page is missing field '{0}'")]
    MissingMenuField(&'static str),
}

pub type Result<T> = std::result::Result<T, BotError>;
