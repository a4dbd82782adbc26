//! Outbound platform port.
//!
//! Telegram is the first implementation; the engine only ever talks to this
//! trait, so tests drive it with an in-memory recording fake.

use async_trait::async_trait;

use crate::domain::{ChatId, MessageId, PollId, TopicId};
use crate::Result;

/// Result of sending a poll: the platform-assigned poll id plus the id of the
/// message carrying it (needed for pinning and for stopping the poll later).
#[derive(Clone, Debug)]
pub struct SentPoll {
    pub poll_id: PollId,
    pub message_id: MessageId,
}

#[async_trait]
pub trait TeamChatPort: Send + Sync {
    /// Send a non-anonymous single-choice poll into a chat topic.
    async fn send_poll(
        &self,
        chat_id: ChatId,
        topic_id: TopicId,
        question: &str,
        options: &[String],
    ) -> Result<SentPoll>;

    /// Stop an open poll. Failing because the poll is already gone is an
    /// expected transient outcome; callers treat it as already-closed.
    async fn stop_poll(&self, chat_id: ChatId, topic_id: TopicId, poll_id: &PollId) -> Result<()>;

    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;

    /// Send an HTML-formatted message into a chat topic.
    async fn send_html(&self, chat_id: ChatId, topic_id: TopicId, html: &str) -> Result<()>;
}
