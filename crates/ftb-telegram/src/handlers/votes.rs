//! Vote-answer and poll-state updates.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{Poll, PollAnswer};

use chrono::Local;

use super::{log_engine_err, poll_id, user_info};
use crate::router::AppState;

pub async fn handle_poll_answer(answer: PollAnswer, app: Arc<AppState>) -> ResponseResult<()> {
    let user = user_info(&answer.user);
    log_engine_err(
        "vote ingestion",
        app.service
            .on_vote_answer(
                &poll_id(&answer.poll_id),
                &user,
                &answer.option_ids,
                Local::now(),
            )
            .await,
    );
    Ok(())
}

/// Poll state pushed by the platform. Only closure matters to us; vote
/// counters are tracked through the per-user answers instead.
pub async fn handle_poll_update(poll: Poll, app: Arc<AppState>) -> ResponseResult<()> {
    if !poll.is_closed {
        return Ok(());
    }
    log_engine_err(
        "upstream poll closure",
        app.service.on_poll_closed(&poll_id(&poll.id)).await,
    );
    Ok(())
}
