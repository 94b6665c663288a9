//! Direct-mention parsing and the bot's fixed command set.

use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use crate::error::Result;
use crate::fooda::{FoodaClient, Location};
use crate::slack::{PostMessage, SlackApi};
use crate::types::{BotCommand, ChatEvent};

/// Any command starting with this word gets the acknowledgement.
pub const EXAMPLE_COMMAND: &str = "do";

pub const LUNCH_COMMAND: &str = "lunch";

pub const ACK_RESPONSE: &str = "Sure...write some more code then I can do that!";

pub const HELP_RESPONSE: &str = "Not sure what you mean. Try \"lunch\" or *do*.";

/// Location served by the `lunch` command unless told otherwise.
pub const DEFAULT_LUNCH_LOCATION: Location = Location::Broad;

// First group is the mentioned user id, second the rest of the line.
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<@(|[WU].+?)>(.*)").expect("mention pattern is valid")
});

/// Finds a mention at the very start of `text`.
///
/// Returns the mentioned user id and the trimmed remainder of the line.
pub fn parse_direct_mention(text: &str) -> Option<(&str, &str)> {
    let captures = MENTION_REGEX.captures(text)?;
    let user_id = captures.get(1)?.as_str();
    let rest = captures.get(2).map_or("", |m| m.as_str()).trim();
    Some((user_id, rest))
}

/// Returns the first plain message in `events` that opens with a mention of `bot_id`.
pub fn parse_bot_command(events: &[ChatEvent], bot_id: &str) -> Option<BotCommand> {
    events
        .iter()
        .filter(|event| event.is_plain_message())
        .find_map(|event| {
            let (user_id, command) = parse_direct_mention(event.text.as_deref()?)?;
            if user_id != bot_id {
                return None;
            }
            let channel = event.channel.clone()?;
            debug!("Found command '{}' in channel {}", command, channel);
            Some(BotCommand {
                command: command.to_string(),
                channel,
            })
        })
}

/// What the bot will answer to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Acknowledge,
    Lunch,
    Help,
}

impl Reply {
    pub fn for_command(command: &str) -> Self {
        if command.starts_with(EXAMPLE_COMMAND) {
            Reply::Acknowledge
        } else if command == LUNCH_COMMAND {
            Reply::Lunch
        } else {
            Reply::Help
        }
    }
}

/// Answers commands by posting to Slack.
pub struct CommandHandler<'a> {
    slack: &'a dyn SlackApi,
    fooda: &'a FoodaClient,
    bot_id: Option<String>,
    lunch_location: Location,
}

impl<'a> CommandHandler<'a> {
    pub fn new(slack: &'a dyn SlackApi, fooda: &'a FoodaClient, bot_id: Option<String>) -> Self {
        Self {
            slack,
            fooda,
            bot_id,
            lunch_location: DEFAULT_LUNCH_LOCATION,
        }
    }

    pub fn with_lunch_location(mut self, location: Location) -> Self {
        self.lunch_location = location;
        self
    }

    pub fn bot_id(&self) -> Option<&str> {
        self.bot_id.as_deref()
    }

    /// Posts the reply for `command` to `channel`.
    ///
    /// Menu fetch failures are returned as-is; nothing is posted in that case.
    pub async fn handle(&self, command: &str, channel: &str) -> Result<()> {
        let message = match Reply::for_command(command) {
            Reply::Acknowledge => PostMessage::text(channel, ACK_RESPONSE),
            Reply::Lunch => {
                let menu = self.fooda.fetch_menu(self.lunch_location).await?;
                info!("Posting lunch from {} to {}", menu.restaurant, channel);
                PostMessage::blocks(channel, menu.to_blocks())
            }
            Reply::Help => PostMessage::text(channel, HELP_RESPONSE),
        };

        self.slack
            .post_message(&message.with_user(self.bot_id.clone()))
            .await
    }
}
