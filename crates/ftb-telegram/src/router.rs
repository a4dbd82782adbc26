//! Bootstrap + dispatch: loads snapshots, wires the engine to Telegram, and
//! runs long polling until shutdown.

use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use ftb_core::{
    config::Config,
    engine::{BotState, MatchPollService, Stores},
    ports::TeamChatPort,
    store::{LocationStore, MemberStore, PollStore, TeamStore},
    sweep::DailySweep,
};

use crate::handlers;
use crate::TelegramPort;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub service: Arc<MatchPollService>,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        println!("ftb started: @{}", me.username());
    }
    println!("Data directory: {}", cfg.data_dir.display());

    // Snapshots first: the engine state must be live before the first update.
    let stores = Stores {
        polls: PollStore::new(cfg.polls_file()),
        members: MemberStore::new(cfg.members_file()),
        teams: TeamStore::new(cfg.teams_file()),
    };
    let state = BotState {
        polls: stores.polls.load()?,
        members: stores.members.load()?,
        teams: stores.teams.load()?,
        locations: LocationStore::new(cfg.locations_file()).load()?,
        ..BotState::default()
    };
    println!(
        "Loaded {} open polls from snapshot",
        state.polls.open_polls().len()
    );

    let port: Arc<dyn TeamChatPort> = Arc::new(TelegramPort::new(bot.clone()));
    let service = Arc::new(MatchPollService::new(state, port, stores));

    let sweep = DailySweep::start(service.clone(), cfg.report_hour);

    let app = Arc::new(AppState {
        cfg: cfg.clone(),
        service: service.clone(),
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_poll_answer().endpoint(handlers::handle_poll_answer))
        .branch(Update::filter_poll().endpoint(handlers::handle_poll_update))
        .branch(Update::filter_my_chat_member().endpoint(handlers::handle_my_chat_member));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    // Final snapshot write on the way out.
    sweep.stop();
    if let Err(e) = service.save_all().await {
        eprintln!("Final snapshot save failed: {e}");
    }

    Ok(())
}
