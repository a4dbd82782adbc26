//! Topic lifecycle: new topics, their first message, closed topics.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::MessageForumTopicCreated;

use chrono::Local;

use ftb_core::domain::{ChatId, TopicId};

use super::log_engine_err;
use crate::router::AppState;

pub async fn handle_topic_created(
    thread_id: Option<i32>,
    created: &MessageForumTopicCreated,
    app: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(thread_id) = thread_id else {
        return Ok(());
    };
    app.service
        .on_topic_created(TopicId(thread_id), &created.forum_topic_created.name)
        .await;
    Ok(())
}

/// A text message inside a topic. Only the first one after a matching topic
/// creation does anything: it consumes the pending entry and creates the poll.
pub async fn handle_topic_message(
    chat_id: ChatId,
    topic_id: TopicId,
    app: Arc<AppState>,
) -> ResponseResult<()> {
    log_engine_err(
        "first-message poll creation",
        app.service
            .on_first_message(chat_id, topic_id, Local::now())
            .await,
    );
    Ok(())
}

/// Telegram sends no "topic deleted" update; a closed topic is the closest
/// inbound signal, and a vanished topic surfaces as failing sends which the
/// engine already treats as already-closed.
pub async fn handle_topic_closed(
    chat_id: ChatId,
    thread_id: Option<i32>,
    app: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(thread_id) = thread_id else {
        return Ok(());
    };
    log_engine_err(
        "topic close cleanup",
        app.service
            .on_topic_deleted(chat_id, TopicId(thread_id))
            .await,
    );
    Ok(())
}
