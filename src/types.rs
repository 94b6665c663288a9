//! Common types used throughout the foodabot bot.

use serde::Deserialize;

/// A single event frame read from the Slack RTM socket.
///
/// Only the fields the bot inspects are kept; everything else in the frame is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatEvent {
    /// Event type, e.g. `message` or `presence_change`
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Present for edits, joins, bot messages and other non-plain messages
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Author of the message
    #[serde(default)]
    pub user: Option<String>,
}

impl ChatEvent {
    /// Returns true for a plain user message (type `message`, no subtype).
    pub fn is_plain_message(&self) -> bool {
        self.event_type == "message" && self.subtype.is_none()
    }
}

/// A command addressed to the bot, with the channel it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    pub command: String,
    pub channel: String,
}
