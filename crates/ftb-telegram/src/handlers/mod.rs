//! Telegram update handlers.
//!
//! Each handler is a thin adapter: it maps teloxide types onto core ids and
//! calls into the `ftb-core` engine. Engine errors are logged here and never
//! bubble into the dispatcher, so one bad event cannot stop polling.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ChatMemberUpdated, Message, MessageKind, Poll, PollAnswer},
};

use ftb_core::domain::{ChatId, PollId, TopicId, UserInfo};

use crate::router::AppState;

mod membership;
mod topics;
mod votes;

pub(crate) fn user_info(user: &teloxide::types::User) -> UserInfo {
    UserInfo {
        id: ftb_core::domain::UserId(user.id.0 as i64),
        is_bot: user.is_bot,
        username: user.username.clone(),
        full_name: user.full_name(),
    }
}

pub(crate) fn log_engine_err<T>(context: &str, res: ftb_core::Result<T>) {
    if let Err(e) = res {
        eprintln!("[HANDLER] {context} failed: {e}");
    }
}

pub async fn handle_message(_bot: Bot, msg: Message, app: Arc<AppState>) -> ResponseResult<()> {
    // Topic lifecycle service messages first; they carry no user content.
    match &msg.kind {
        MessageKind::ForumTopicCreated(created) => {
            return topics::handle_topic_created(msg.thread_id, created, app).await;
        }
        MessageKind::ForumTopicClosed(_) => {
            return topics::handle_topic_closed(ChatId(msg.chat.id.0), msg.thread_id, app).await;
        }
        _ => {}
    }

    membership::register_from_message(&msg, &app).await;

    if msg.text().is_some() {
        if let Some(thread_id) = msg.thread_id {
            return topics::handle_topic_message(ChatId(msg.chat.id.0), TopicId(thread_id), app)
                .await;
        }
    }

    Ok(())
}

pub async fn handle_poll_answer(
    _bot: Bot,
    answer: PollAnswer,
    app: Arc<AppState>,
) -> ResponseResult<()> {
    votes::handle_poll_answer(answer, app).await
}

pub async fn handle_poll_update(_bot: Bot, poll: Poll, app: Arc<AppState>) -> ResponseResult<()> {
    votes::handle_poll_update(poll, app).await
}

pub async fn handle_my_chat_member(
    _bot: Bot,
    update: ChatMemberUpdated,
    app: Arc<AppState>,
) -> ResponseResult<()> {
    membership::handle_my_chat_member(update, app).await
}

pub(crate) fn poll_id(id: &str) -> PollId {
    PollId(id.to_string())
}
