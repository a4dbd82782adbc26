//! Membership: per-message member sightings and the bot's own chat membership.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, Message};

use ftb_core::domain::ChatId;

use super::{log_engine_err, user_info};
use crate::router::AppState;

/// Every group message is a sighting: register the sender so reports can
/// mention non-voters. Idempotent in the engine, so no filtering here.
pub async fn register_from_message(msg: &Message, app: &Arc<AppState>) {
    let Some(user) = msg.from() else {
        return;
    };
    log_engine_err(
        "member registration",
        app.service
            .register_member(ChatId(msg.chat.id.0), &user_info(user))
            .await,
    );
}

/// The bot's own membership changed: entering a group registers its team,
/// leaving (or being banned) deletes it.
pub async fn handle_my_chat_member(
    update: ChatMemberUpdated,
    app: Arc<AppState>,
) -> ResponseResult<()> {
    let chat_id = ChatId(update.chat.id.0);
    let old = &update.old_chat_member;
    let new = &update.new_chat_member;

    let was_out = old.is_left() || old.is_banned();
    let is_in = new.is_member() || new.is_administrator();
    let is_out = new.is_left() || new.is_banned();
    let was_in = old.is_member() || old.is_administrator();

    if is_in && was_out {
        let title = update.chat.title().unwrap_or("(sin nombre)");
        println!("[TEAM] Bot added to '{title}' ({})", chat_id.0);
        log_engine_err("team registration", app.service.on_bot_joined(chat_id, title).await);
    } else if is_out && was_in {
        println!("[TEAM] Bot removed from chat {}", chat_id.0);
        log_engine_err("team deletion", app.service.on_bot_left(chat_id).await);
    }

    Ok(())
}
