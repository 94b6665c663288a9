//! Slack real-time messaging socket and the polling loop that drives the bot.

use std::time::Duration;

use async_trait::async_trait;
use futures::{FutureExt, StreamExt};
use log::{debug, info};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::command::{CommandHandler, parse_bot_command};
use crate::error::{BotError, Result};
use crate::types::ChatEvent;

/// Delay between two reads of the RTM socket.
pub const RTM_READ_DELAY: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A source of pending chat events.
#[async_trait]
pub trait EventSource: Send {
    /// Returns every event already received, without waiting for new ones.
    ///
    /// An empty batch is normal. A closed or broken stream is an error.
    async fn read(&mut self) -> Result<Vec<ChatEvent>>;
}

/// An open RTM WebSocket.
pub struct RtmConnection {
    stream: WsStream,
}

impl RtmConnection {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| BotError::WebSocket(format!("connect failed: {e}")))?;
        info!("Connected to Slack RTM");
        Ok(Self { stream })
    }
}

#[async_trait]
impl EventSource for RtmConnection {
    async fn read(&mut self) -> Result<Vec<ChatEvent>> {
        let mut events = Vec::new();

        while let Some(next) = self.stream.next().now_or_never() {
            let Some(frame) = next else {
                info!("RTM stream ended");
                return Err(BotError::ConnectionClosed);
            };
            let frame = frame.map_err(|e| BotError::WebSocket(format!("read failed: {e}")))?;

            match frame {
                WsMessage::Text(text) => {
                    if let Some(event) = decode_event(&text) {
                        events.push(event);
                    }
                }
                WsMessage::Close(reason) => {
                    info!("RTM socket closed by server: {:?}", reason);
                    return Err(BotError::ConnectionClosed);
                }
                _ => {}
            }
        }

        Ok(events)
    }
}

fn decode_event(text: &str) -> Option<ChatEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!("Skipping undecodable RTM frame ({}): {}", e, text);
            None
        }
    }
}

/// Read, dispatch, sleep; forever.
///
/// Returns only when reading or handling fails. There is no reconnect.
pub async fn poll_events(
    source: &mut dyn EventSource,
    handler: &CommandHandler<'_>,
) -> Result<()> {
    let bot_id = handler
        .bot_id()
        .ok_or_else(|| BotError::Config("bot user id is required to poll".to_string()))?
        .to_string();

    info!("Polling RTM events as {}", bot_id);

    loop {
        let events = source.read().await?;
        if let Some(bot_command) = parse_bot_command(&events, &bot_id) {
            handler
                .handle(&bot_command.command, &bot_command.channel)
                .await?;
        }
        tokio::time::sleep(RTM_READ_DELAY).await;
    }
}
