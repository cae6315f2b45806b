//! Channel trait: where patient input comes from and where turns are shown.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;
use crate::transcript::Turn;

/// A line of patient input received on a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name, e.g. "cli".
    pub channel: String,
    pub user_id: String,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
        }
    }
}

/// Stream of incoming patient input.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A presentation surface for one conversation.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start reading input.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Show one transcript turn, in transcript order.
    async fn render(&self, turn: &Turn) -> Result<(), ChannelError>;

    /// Show the appointment notes after they change.
    async fn show_summary(&self, summary: &str) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
