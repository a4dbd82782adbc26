//! Telegram adapter (teloxide).
//!
//! Implements the `ftb-core` `TeamChatPort` over the Telegram Bot API.

use std::collections::HashMap;

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

use tokio::sync::Mutex;
use tokio::time::sleep;

pub mod handlers;
pub mod router;

use ftb_core::{
    domain::{ChatId, MessageId, PollId, TopicId},
    errors::Error,
    ports::{SentPoll, TeamChatPort},
    Result,
};

pub struct TelegramPort {
    bot: Bot,
    /// Telegram's stopPoll wants the id of the message carrying the poll,
    /// while our directory keys polls by poll id. Populated by `send_poll`;
    /// process-local, so stopping a poll sent before a restart fails and is
    /// handled as already-closed by the engine.
    poll_messages: Mutex<HashMap<String, i32>>,
}

impl TelegramPort {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            poll_messages: Mutex::new(HashMap::new()),
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Platform(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl TeamChatPort for TelegramPort {
    async fn send_poll(
        &self,
        chat_id: ChatId,
        topic_id: TopicId,
        question: &str,
        options: &[String],
    ) -> Result<SentPoll> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_poll(Self::tg_chat(chat_id), question.to_string(), options.to_vec())
                    .message_thread_id(topic_id.0)
                    .is_anonymous(false)
                    .allows_multiple_answers(false)
            })
            .await?;

        let poll_id = msg
            .poll()
            .map(|p| p.id.clone())
            .ok_or_else(|| Error::Platform("sendPoll response carried no poll".to_string()))?;

        self.poll_messages
            .lock()
            .await
            .insert(poll_id.clone(), msg.id.0);

        Ok(SentPoll {
            poll_id: PollId(poll_id),
            message_id: MessageId(msg.id.0),
        })
    }

    async fn stop_poll(&self, chat_id: ChatId, _topic_id: TopicId, poll_id: &PollId) -> Result<()> {
        let message_id = self
            .poll_messages
            .lock()
            .await
            .remove(poll_id.as_str())
            .ok_or_else(|| {
                Error::Platform(format!("no message id known for poll {}", poll_id.0))
            })?;

        self.with_retry(|| {
            self.bot.stop_poll(
                Self::tg_chat(chat_id),
                teloxide::types::MessageId(message_id),
            )
        })
        .await?;
        Ok(())
    }

    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.with_retry(|| {
            self.bot.pin_chat_message(
                Self::tg_chat(chat_id),
                teloxide::types::MessageId(message_id.0),
            )
        })
        .await?;
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, topic_id: TopicId, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), html.to_string())
                .message_thread_id(topic_id.0)
                .parse_mode(ParseMode::Html)
                .disable_web_page_preview(true)
        })
        .await?;
        Ok(())
    }
}
