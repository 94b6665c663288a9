//! Test doubles for the Slack seams.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{BotError, Result};
use crate::rtm::EventSource;
use crate::slack::{PostMessage, SlackApi};
use crate::types::ChatEvent;

pub const TEST_BOT_ID: &str = "UBOT";

/// Records every call; `rtm.connect` hands out the scripted batches.
#[derive(Default)]
pub struct RecordingSlack {
    posts: Mutex<Vec<PostMessage>>,
    batches: Mutex<Vec<Vec<ChatEvent>>>,
    rtm_connects: AtomicUsize,
    auth_calls: AtomicUsize,
    refuse_connection: bool,
}

impl RecordingSlack {
    pub fn with_events(batches: Vec<Vec<ChatEvent>>) -> Self {
        Self {
            batches: Mutex::new(batches),
            ..Self::default()
        }
    }

    pub fn refusing_connections() -> Self {
        Self {
            refuse_connection: true,
            ..Self::default()
        }
    }

    pub fn posts(&self) -> Vec<PostMessage> {
        self.posts.lock().expect("posts lock").clone()
    }

    pub fn rtm_connects(&self) -> usize {
        self.rtm_connects.load(Ordering::SeqCst)
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SlackApi for RecordingSlack {
    async fn auth_test(&self) -> Result<String> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TEST_BOT_ID.to_string())
    }

    async fn post_message(&self, message: &PostMessage) -> Result<()> {
        self.posts.lock().expect("posts lock").push(message.clone());
        Ok(())
    }

    async fn rtm_connect(&self) -> Result<Box<dyn EventSource>> {
        self.rtm_connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connection {
            return Err(BotError::SlackApi("rtm.connect error: invalid_auth".to_string()));
        }
        let batches = std::mem::take(&mut *self.batches.lock().expect("batches lock"));
        Ok(Box::new(ScriptedEvents::new(batches)))
    }
}

/// Yields one batch per read, then reports the connection closed.
pub struct ScriptedEvents {
    batches: VecDeque<Vec<ChatEvent>>,
}

impl ScriptedEvents {
    pub fn new(batches: Vec<Vec<ChatEvent>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedEvents {
    async fn read(&mut self) -> Result<Vec<ChatEvent>> {
        self.batches.pop_front().ok_or(BotError::ConnectionClosed)
    }
}

/// A plain channel message from a human.
pub fn message(channel: &str, text: &str) -> ChatEvent {
    ChatEvent {
        event_type: "message".to_string(),
        subtype: None,
        text: Some(text.to_string()),
        channel: Some(channel.to_string()),
        user: Some("UHUMAN".to_string()),
    }
}
