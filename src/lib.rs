pub mod command;
pub mod config;
pub mod error;
pub mod fooda;
pub mod rtm;
pub mod slack;
pub mod types;

#[cfg(test)]
mod testing;

use clap::Parser;
use log::{error, info, warn};

use command::{CommandHandler, DEFAULT_LUNCH_LOCATION, LUNCH_COMMAND};
use config::Config;
use error::Result;
use fooda::{FoodaClient, Location};
use slack::{SlackApi, SlackClient};

/// Channel the one-shot `post` action publishes to.
pub const POST_CHANNEL: &str = "the-lab-lunch-project";

/// Action that posts today's lunch once instead of listening.
pub const POST_ACTION: &str = "post";

/// Slack bot that answers mentions and posts the Fooda lunch menu.
#[derive(Debug, Parser)]
#[command(name = "foodabot", version, about)]
pub struct Cli {
    /// `post` publishes today's lunch once and exits; anything else listens for mentions
    pub action: Option<String>,

    /// Fooda location to scrape; only used with `post`
    #[arg(long, default_value_t = DEFAULT_LUNCH_LOCATION)]
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Post,
    Listen,
}

impl Mode {
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            Some(POST_ACTION) => Mode::Post,
            _ => Mode::Listen,
        }
    }
}

impl Cli {
    pub fn mode(&self) -> Mode {
        Mode::from_action(self.action.as_deref())
    }

    /// A non-default `--location` given outside `post`, which has no effect.
    pub fn ignored_location(&self) -> Option<Location> {
        (self.mode() == Mode::Listen && self.location != DEFAULT_LUNCH_LOCATION)
            .then_some(self.location)
    }
}

/// Run the Slack bot.
pub async fn run(cli: Cli) -> Result<()> {
    info!("Initializing bot");
    if let Some(location) = cli.ignored_location() {
        warn!(
            "--location {} only applies to `{}`; the lunch command uses {}",
            location, POST_ACTION, DEFAULT_LUNCH_LOCATION
        );
    }
    let config = Config::from_env()?;

    let slack = SlackClient::new(config.slack_bot_token);
    let fooda = FoodaClient::new();

    execute(cli.mode(), cli.location, &slack, &fooda).await
}

/// Dispatches on the startup mode.
pub async fn execute(
    mode: Mode,
    location: Location,
    slack: &dyn SlackApi,
    fooda: &FoodaClient,
) -> Result<()> {
    match mode {
        Mode::Post => post_lunch(slack, fooda, location).await,
        Mode::Listen => listen(slack, fooda).await,
    }
}

async fn post_lunch(slack: &dyn SlackApi, fooda: &FoodaClient, location: Location) -> Result<()> {
    info!("Posting {} lunch to {}", location, POST_CHANNEL);
    let handler = CommandHandler::new(slack, fooda, None).with_lunch_location(location);
    handler.handle(LUNCH_COMMAND, POST_CHANNEL).await
}

async fn listen(slack: &dyn SlackApi, fooda: &FoodaClient) -> Result<()> {
    let mut source = slack.rtm_connect().await.map_err(|e| {
        error!("Connection failed. {}", e);
        e
    })?;

    let bot_id = slack.auth_test().await?;
    info!("Fooda Bot connected and running as {}", bot_id);

    let handler = CommandHandler::new(slack, fooda, Some(bot_id));
    rtm::poll_events(source.as_mut(), &handler).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ACK_RESPONSE;
    use crate::error::BotError;
    use crate::fooda::tests::BANNER_PAGE;
    use crate::testing::{RecordingSlack, TEST_BOT_ID, message};

    #[test]
    fn post_action_selects_post_mode() {
        assert_eq!(Mode::from_action(Some("post")), Mode::Post);
        assert_eq!(Mode::from_action(None), Mode::Listen);
        assert_eq!(Mode::from_action(Some("listen")), Mode::Listen);
        assert_eq!(Mode::from_action(Some("POST")), Mode::Listen);
    }

    #[test]
    fn cli_parses_action_and_location() {
        let cli = Cli::try_parse_from(["foodabot", "post"]).expect("valid args");
        assert_eq!(cli.mode(), Mode::Post);
        assert_eq!(cli.location, Location::Broad);

        let cli = Cli::try_parse_from(["foodabot", "post", "--location", "simches"])
            .expect("valid args");
        assert_eq!(cli.location, Location::Simches);

        let cli = Cli::try_parse_from(["foodabot"]).expect("valid args");
        assert_eq!(cli.mode(), Mode::Listen);

        assert!(Cli::try_parse_from(["foodabot", "--location", "mgh"]).is_err());
    }

    #[test]
    fn location_outside_post_is_flagged_as_ignored() {
        let cli = Cli::try_parse_from(["foodabot", "--location", "simches"]).expect("valid args");
        assert_eq!(cli.mode(), Mode::Listen);
        assert_eq!(cli.ignored_location(), Some(Location::Simches));

        let cli = Cli::try_parse_from(["foodabot", "post", "--location", "simches"])
            .expect("valid args");
        assert_eq!(cli.ignored_location(), None);

        let cli = Cli::try_parse_from(["foodabot", "--location", "broad"]).expect("valid args");
        assert_eq!(cli.ignored_location(), None);
    }

    #[tokio::test]
    async fn post_mode_posts_once_and_never_connects() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/broadinstitute")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(BANNER_PAGE)
            .expect(1)
            .create_async()
            .await;

        let slack = RecordingSlack::default();
        let fooda = FoodaClient::with_base_url(server.url());

        execute(Mode::Post, Location::Broad, &slack, &fooda)
            .await
            .expect("post succeeds");

        let posts = slack.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].channel, POST_CHANNEL);
        assert!(posts[0].blocks.is_some());
        assert_eq!(slack.rtm_connects(), 0);
        assert_eq!(slack.auth_calls(), 0);
        page.assert_async().await;
    }

    #[tokio::test(start_paused = true)]
    async fn listen_mode_answers_mentions_until_closed() {
        let slack = RecordingSlack::with_events(vec![
            vec![message("C1", "good morning")],
            vec![message("C2", &format!("<@{TEST_BOT_ID}> do lunch"))],
        ]);
        let fooda = FoodaClient::new();

        let err = execute(Mode::Listen, Location::Broad, &slack, &fooda)
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::ConnectionClosed));
        assert_eq!(slack.rtm_connects(), 1);
        assert_eq!(slack.auth_calls(), 1);
        let posts = slack.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].channel, "C2");
        assert_eq!(posts[0].text.as_deref(), Some(ACK_RESPONSE));
        assert_eq!(posts[0].user.as_deref(), Some(TEST_BOT_ID));
    }

    #[tokio::test]
    async fn failed_connection_never_polls() {
        let slack = RecordingSlack::refusing_connections();
        let fooda = FoodaClient::new();

        let err = execute(Mode::Listen, Location::Broad, &slack, &fooda)
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::SlackApi(_)));
        assert_eq!(slack.auth_calls(), 0);
        assert!(slack.posts().is_empty());
    }
}
