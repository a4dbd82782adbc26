//! The availability-poll engine: topic-to-poll bridge, vote ingestion and
//! reconciliation, close paths, and the daily sweep body.
//!
//! All shared state lives in one `BotState` behind a single tokio mutex, so
//! handlers never interleave over it; outbound platform calls and snapshot
//! saves happen while the lock is held, which keeps every event handled to
//! completion before the next one touches the state.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::Mutex;

use crate::directory::PollDirectory;
use crate::domain::{ChatId, PollId, TopicId, UserInfo};
use crate::formatting::{mention_html, mention_html_bare};
use crate::locations::LocationRegistry;
use crate::members::MembershipRegistry;
use crate::poll::{Availability, MatchPoll, POLL_QUESTION};
use crate::ports::TeamChatPort;
use crate::store::{MemberStore, PollStore, TeamStore};
use crate::teams::TeamRegistry;
use crate::topics::PendingTopics;
use crate::Result;

/// Closing notice posted when a poll is stopped or reported closed upstream.
const CLOSED_NOTICE: &str = "Convocatoria cerrada";

/// Long-lived in-memory process state, loaded from snapshots at startup.
#[derive(Debug, Default)]
pub struct BotState {
    pub polls: PollDirectory,
    pub members: MembershipRegistry,
    pub pending: PendingTopics,
    pub teams: TeamRegistry,
    pub locations: LocationRegistry,
}

/// Write-through snapshot stores. Every accepted mutation saves the affected
/// file synchronously before the handler returns.
#[derive(Clone, Debug)]
pub struct Stores {
    pub polls: PollStore,
    pub members: MemberStore,
    pub teams: TeamStore,
}

pub struct MatchPollService {
    state: Arc<Mutex<BotState>>,
    port: Arc<dyn TeamChatPort>,
    stores: Stores,
}

impl MatchPollService {
    pub fn new(state: BotState, port: Arc<dyn TeamChatPort>, stores: Stores) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            port,
            stores,
        }
    }

    /// Register a user sighting in a chat. Idempotent, bots skipped; the
    /// membership snapshot is written only when a new entry was added.
    pub async fn register_member(&self, chat_id: ChatId, user: &UserInfo) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.members.register(chat_id, user) {
            println!("[MEMBER] Registered {} in chat {}", user.id.0, chat_id.0);
            self.stores.members.save(&state.members)?;
        }
        Ok(())
    }

    /// A new forum topic appeared. Match-code titles are parked until their
    /// first message; everything else is ignored.
    pub async fn on_topic_created(&self, topic_id: TopicId, title: &str) {
        let mut state = self.state.lock().await;
        if state.pending.observe_created(topic_id, title) {
            println!("[TOPIC] Pending match topic {}: {title}", topic_id.0);
        }
    }

    /// First real message in a topic: if the topic is pending, consume the
    /// entry, create the poll, persist, and pin the poll message.
    /// Returns true when a poll was created.
    pub async fn on_first_message(
        &self,
        chat_id: ChatId,
        topic_id: TopicId,
        now: DateTime<Local>,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(title) = state.pending.take(topic_id) else {
            return Ok(false);
        };

        println!("[TOPIC] First message in '{title}', creating poll");
        let sent = self
            .port
            .send_poll(
                chat_id,
                topic_id,
                POLL_QUESTION,
                &Availability::option_labels(),
            )
            .await?;

        let poll = MatchPoll::new(sent.poll_id.clone(), now);
        state.polls.add(chat_id, topic_id, poll);
        self.stores.polls.save(&state.polls)?;

        if let Err(e) = self.port.pin_message(chat_id, sent.message_id).await {
            eprintln!("[TOPIC] Failed to pin poll message: {e}");
        }
        println!(
            "[TOPIC] Poll {} created in chat {}, topic {}",
            sent.poll_id.0, chat_id.0, topic_id.0
        );
        Ok(true)
    }

    /// A topic was deleted: stop and drop any open polls under it, and clear
    /// a pending entry that never saw its first message.
    pub async fn on_topic_deleted(&self, chat_id: ChatId, topic_id: TopicId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.pending.clear(topic_id);

        let poll_ids = state.polls.topic_poll_ids(chat_id, topic_id);
        for poll_id in poll_ids {
            self.close_poll(&mut state, chat_id, topic_id, &poll_id, true)
                .await?;
        }
        Ok(())
    }

    /// Vote-answer ingestion (the transition table).
    ///
    /// Member registration always runs first, keyed by the chat derived from
    /// the poll lookup; an unknown poll id means nothing to key on, so the
    /// whole event is dropped.
    pub async fn on_vote_answer(
        &self,
        poll_id: &PollId,
        user: &UserInfo,
        option_ids: &[i32],
        now: DateTime<Local>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;

        let Some((chat_id, topic_id)) = state.polls.locate(poll_id) else {
            println!("[VOTE] Unknown poll {}, ignoring", poll_id.0);
            return Ok(());
        };

        if state.members.register(chat_id, user) {
            self.stores.members.save(&state.members)?;
        }

        if option_ids.len() > 1 {
            // Our polls are single-choice; a multi-select answer cannot come
            // from one of them.
            println!("[VOTE] Multi-select answer for poll {}, ignoring", poll_id.0);
            return Ok(());
        }

        let Some(poll) = state.polls.poll(chat_id, topic_id, poll_id) else {
            return Ok(());
        };

        if !poll.is_active(now) {
            println!("[VOTE] Poll {} expired, closing", poll_id.0);
            self.close_poll(&mut state, chat_id, topic_id, poll_id, true)
                .await?;
            return Ok(());
        }

        if option_ids.is_empty() {
            // Retraction deletes the vote outright so a later re-vote looks
            // like a first vote.
            println!("[VOTE] User {} retracted vote on poll {}", user.id.0, poll_id.0);
            if let Some(poll) = state.polls.poll_mut(chat_id, topic_id, poll_id) {
                poll.retract_vote(user.id);
            }
            self.stores.polls.save(&state.polls)?;
            return Ok(());
        }

        let index = option_ids[0];
        let Some(option) = usize::try_from(index)
            .ok()
            .and_then(Availability::from_index)
        else {
            println!("[VOTE] Invalid option id {index} for poll {}, ignoring", poll_id.0);
            return Ok(());
        };

        let previous = state
            .polls
            .poll_mut(chat_id, topic_id, poll_id)
            .map(|poll| poll.record_vote(user.id, option, now));
        self.stores.polls.save(&state.polls)?;

        if let Some(Some(previous)) = previous {
            if previous != option {
                println!(
                    "[VOTE] User {} changed vote on poll {}: {} -> {}",
                    user.id.0,
                    poll_id.0,
                    previous.label(),
                    option.label()
                );
                let mention = match state.members.profile(chat_id, user.id) {
                    Some(profile) => mention_html(user.id, profile),
                    None => mention_html_bare(user.id),
                };
                let alert = format!(
                    "ALERTA: El usuario {mention} ha cambiado su voto de {} a {}",
                    previous.label(),
                    option.label()
                );
                if let Err(e) = self.port.send_html(chat_id, topic_id, &alert).await {
                    eprintln!("[VOTE] Failed to send change alert: {e}");
                }
            }
        }
        Ok(())
    }

    /// The platform reports a poll closed (stopped by an admin, or by us).
    /// Unknown ids are normal: polls from other bots, or already removed.
    pub async fn on_poll_closed(&self, poll_id: &PollId) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some((chat_id, topic_id)) = state.polls.locate(poll_id) else {
            println!("[POLL] Closed poll {} not ours, ignoring", poll_id.0);
            return Ok(());
        };
        println!("[POLL] Poll {} closed upstream", poll_id.0);
        // Already closed on the platform; only local cleanup + notice.
        self.close_poll(&mut state, chat_id, topic_id, poll_id, false)
            .await
    }

    /// One sweep pass: close expired polls, report on the open ones. The only
    /// path that closes a poll purely by elapsed time.
    pub async fn sweep_tick(&self, now: DateTime<Local>) -> Result<()> {
        let mut state = self.state.lock().await;
        let snapshot = state.polls.open_polls();
        println!("[SWEEP] Walking {} open polls", snapshot.len());

        for (chat_id, topic_id, poll_id) in snapshot {
            let Some(poll) = state.polls.poll(chat_id, topic_id, &poll_id) else {
                continue; // removed earlier in this pass
            };

            if !poll.is_active(now) {
                println!("[SWEEP] Poll {} expired, closing", poll_id.0);
                self.close_poll(&mut state, chat_id, topic_id, &poll_id, true)
                    .await?;
                continue;
            }

            let members = state.members.chat_members(chat_id);
            let report = poll.render_report(&members);
            if let Err(e) = self.port.send_html(chat_id, topic_id, &report).await {
                eprintln!("[SWEEP] Failed to send report for poll {}: {e}", poll_id.0);
            }
        }
        Ok(())
    }

    /// The bot was added to a group: register its team.
    pub async fn on_bot_joined(&self, chat_id: ChatId, title: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.teams.register(chat_id, title) {
            println!("[TEAM] Registered team '{title}' for chat {}", chat_id.0);
            self.stores.teams.save(&state.teams)?;
        }
        Ok(())
    }

    /// The bot was removed from a group: drop its team.
    pub async fn on_bot_left(&self, chat_id: ChatId) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(team) = state.teams.delete(chat_id) {
            println!("[TEAM] Deleted team '{}' for chat {}", team.name, chat_id.0);
            self.stores.teams.save(&state.teams)?;
        }
        Ok(())
    }

    /// Final snapshot write at shutdown.
    pub async fn save_all(&self) -> Result<()> {
        let state = self.state.lock().await;
        self.stores.polls.save(&state.polls)?;
        self.stores.members.save(&state.members)?;
        self.stores.teams.save(&state.teams)?;
        Ok(())
    }

    /// Stop the poll (when we initiate the close), remove it from the
    /// directory, persist, and post the closing notice.
    ///
    /// A failing stop-poll call means the poll/topic is already gone on the
    /// platform side; local cleanup proceeds regardless.
    async fn close_poll(
        &self,
        state: &mut BotState,
        chat_id: ChatId,
        topic_id: TopicId,
        poll_id: &PollId,
        issue_stop: bool,
    ) -> Result<()> {
        if issue_stop {
            if let Err(e) = self.port.stop_poll(chat_id, topic_id, poll_id).await {
                eprintln!("[POLL] stop_poll for {} failed (treating as closed): {e}", poll_id.0);
            }
        }

        state.polls.remove(chat_id, topic_id, poll_id);
        self.stores.polls.save(&state.polls)?;

        if let Err(e) = self.port.send_html(chat_id, topic_id, CLOSED_NOTICE).await {
            eprintln!("[POLL] Failed to send closing notice: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, UserId};
    use crate::ports::SentPoll;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        SendPoll(ChatId, TopicId),
        StopPoll(ChatId, TopicId, String),
        Pin(ChatId, MessageId),
        SendHtml(ChatId, TopicId, String),
    }

    /// In-memory platform double: records every outbound call and mints
    /// sequential poll ids.
    #[derive(Default)]
    struct RecordingPort {
        calls: StdMutex<Vec<Call>>,
        next_poll: AtomicUsize,
    }

    impl RecordingPort {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn sent_html(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::SendHtml(_, _, html) => Some(html),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl TeamChatPort for RecordingPort {
        async fn send_poll(
            &self,
            chat_id: ChatId,
            topic_id: TopicId,
            _question: &str,
            options: &[String],
        ) -> Result<SentPoll> {
            assert_eq!(options.len(), 3);
            let n = self.next_poll.fetch_add(1, Ordering::SeqCst) + 1;
            self.calls
                .lock()
                .unwrap()
                .push(Call::SendPoll(chat_id, topic_id));
            Ok(SentPoll {
                poll_id: PollId(format!("poll-{n}")),
                message_id: MessageId(n as i32 * 100),
            })
        }

        async fn stop_poll(
            &self,
            chat_id: ChatId,
            topic_id: TopicId,
            poll_id: &PollId,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::StopPoll(chat_id, topic_id, poll_id.0.clone()));
            Ok(())
        }

        async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Pin(chat_id, message_id));
            Ok(())
        }

        async fn send_html(&self, chat_id: ChatId, topic_id: TopicId, html: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::SendHtml(chat_id, topic_id, html.to_string()));
            Ok(())
        }
    }

    fn tmp_dir() -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/ftb-engine-{}-{ts}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn service(dir: &std::path::Path) -> (Arc<RecordingPort>, MatchPollService) {
        let port = Arc::new(RecordingPort::default());
        let stores = Stores {
            polls: PollStore::new(dir.join("active_match_polls.json")),
            members: MemberStore::new(dir.join("chat_members.json")),
            teams: TeamStore::new(dir.join("teams.json")),
        };
        let svc = MatchPollService::new(BotState::default(), port.clone(), stores);
        (port, svc)
    }

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
    }

    fn user(id: i64, username: Option<&str>) -> UserInfo {
        UserInfo {
            id: UserId(id),
            is_bot: false,
            username: username.map(|s| s.to_string()),
            full_name: format!("User {id}"),
        }
    }

    const CHAT: ChatId = ChatId(-1001);
    const TOPIC: TopicId = TopicId(42);

    async fn create_poll(svc: &MatchPollService) -> PollId {
        svc.on_topic_created(TOPIC, "J12 - Rivals FC").await;
        assert!(svc.on_first_message(CHAT, TOPIC, t0()).await.unwrap());
        PollId("poll-1".to_string())
    }

    #[tokio::test]
    async fn topic_bridge_creates_exactly_one_pinned_poll() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);

        svc.on_topic_created(TOPIC, "J12 - Rivals FC").await;
        assert!(svc.on_first_message(CHAT, TOPIC, t0()).await.unwrap());
        // Second message: pending entry already consumed.
        assert!(!svc.on_first_message(CHAT, TOPIC, t0()).await.unwrap());

        let calls = port.calls();
        assert_eq!(
            calls.iter().filter(|c| matches!(c, Call::SendPoll(..))).count(),
            1
        );
        assert!(calls.contains(&Call::Pin(CHAT, MessageId(100))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn non_matching_topic_never_creates_a_poll() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);

        svc.on_topic_created(TOPIC, "General").await;
        assert!(!svc.on_first_message(CHAT, TOPIC, t0()).await.unwrap());
        assert!(port.calls().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn report_shows_voter_and_non_voters() {
        // Scenario A: vote at T+1h, report at T+2h.
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;

        svc.register_member(CHAT, &user(2, None)).await.unwrap();
        svc.on_vote_answer(&poll_id, &user(1, Some("ana")), &[0], t0() + Duration::hours(1))
            .await
            .unwrap();

        svc.sweep_tick(t0() + Duration::hours(2)).await.unwrap();
        let reports = port.sent_html();
        let report = reports.last().unwrap();
        assert!(report.contains("@ana"));
        assert!(report.contains("Disponible"));
        assert_eq!(report.matches("aún no ha votado").count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn changed_vote_emits_exactly_one_alert() {
        // Scenario B: Available at T+1h, Unavailable at T+2h.
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;
        let ana = user(1, Some("ana"));

        svc.on_vote_answer(&poll_id, &ana, &[0], t0() + Duration::hours(1))
            .await
            .unwrap();
        svc.on_vote_answer(&poll_id, &ana, &[2], t0() + Duration::hours(2))
            .await
            .unwrap();

        let alerts: Vec<_> = port
            .sent_html()
            .into_iter()
            .filter(|h| h.starts_with("ALERTA"))
            .collect();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("de Disponible a Baja"));
        assert!(alerts[0].contains("@ana"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn same_option_revote_does_not_alert() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;
        let ana = user(1, Some("ana"));

        svc.on_vote_answer(&poll_id, &ana, &[1], t0() + Duration::hours(1))
            .await
            .unwrap();
        svc.on_vote_answer(&poll_id, &ana, &[1], t0() + Duration::hours(2))
            .await
            .unwrap();

        assert!(port.sent_html().iter().all(|h| !h.starts_with("ALERTA")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn retraction_suppresses_change_alert_on_revote() {
        // Scenario C: vote, retract, vote a different option — no alert.
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;
        let ana = user(1, Some("ana"));

        svc.on_vote_answer(&poll_id, &ana, &[2], t0() + Duration::hours(1))
            .await
            .unwrap();
        svc.on_vote_answer(&poll_id, &ana, &[], t0() + Duration::hours(2))
            .await
            .unwrap();
        svc.on_vote_answer(&poll_id, &ana, &[0], t0() + Duration::hours(3))
            .await
            .unwrap();

        assert!(port.sent_html().iter().all(|h| !h.starts_with("ALERTA")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn vote_after_deadline_closes_poll_without_recording() {
        // Scenario D: answer arrives at T+5d.
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;

        svc.on_vote_answer(&poll_id, &user(1, Some("ana")), &[0], t0() + Duration::days(5))
            .await
            .unwrap();

        let calls = port.calls();
        assert!(calls.contains(&Call::StopPoll(CHAT, TOPIC, "poll-1".to_string())));
        assert!(port.sent_html().contains(&CLOSED_NOTICE.to_string()));

        // Removed from the directory: a later answer is ignored entirely.
        let before = port.calls().len();
        svc.on_vote_answer(&poll_id, &user(2, None), &[0], t0() + Duration::days(5))
            .await
            .unwrap();
        assert_eq!(port.calls().len(), before);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn multi_select_and_bad_index_are_dropped() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;
        let ana = user(1, Some("ana"));

        let before = port.calls().len();
        svc.on_vote_answer(&poll_id, &ana, &[0, 1], t0() + Duration::hours(1))
            .await
            .unwrap();
        svc.on_vote_answer(&poll_id, &ana, &[7], t0() + Duration::hours(1))
            .await
            .unwrap();
        svc.on_vote_answer(&poll_id, &ana, &[-1], t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(port.calls().len(), before);

        // No state change either: a later vote is a first vote, no alert.
        svc.on_vote_answer(&poll_id, &ana, &[2], t0() + Duration::hours(2))
            .await
            .unwrap();
        assert!(port.sent_html().iter().all(|h| !h.starts_with("ALERTA")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unknown_poll_is_ignored() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);

        svc.on_vote_answer(&PollId("nope".into()), &user(1, None), &[0], t0())
            .await
            .unwrap();
        assert!(port.calls().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn voters_are_registered_before_processing() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;

        // Even a dropped (multi-select) answer registers the member.
        svc.on_vote_answer(&poll_id, &user(9, Some("leo")), &[0, 1], t0())
            .await
            .unwrap();
        svc.sweep_tick(t0() + Duration::hours(1)).await.unwrap();
        assert!(port.sent_html().last().unwrap().contains("@leo"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn sweep_closes_expired_and_reports_open() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);

        // Poll 1 in one topic, poll 2 in another, created a day apart.
        svc.on_topic_created(TOPIC, "J12 - Rivals FC").await;
        svc.on_first_message(CHAT, TOPIC, t0()).await.unwrap();
        svc.on_topic_created(TopicId(43), "J13 - Otros FC").await;
        svc.on_first_message(CHAT, TopicId(43), t0() + Duration::days(2))
            .await
            .unwrap();

        // At T+5d the first is expired, the second still open.
        svc.sweep_tick(t0() + Duration::days(5)).await.unwrap();

        let calls = port.calls();
        assert!(calls.contains(&Call::StopPoll(CHAT, TOPIC, "poll-1".to_string())));
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::StopPoll(_, _, id) if id == "poll-2")));
        let htmls = port.sent_html();
        assert!(htmls.contains(&CLOSED_NOTICE.to_string()));
        assert!(htmls.iter().any(|h| h.contains("REPORTE ACTUAL")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn poll_closed_upstream_cleans_up_without_stop_call() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;

        svc.on_poll_closed(&poll_id).await.unwrap();

        let calls = port.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::StopPoll(..))));
        assert!(port.sent_html().contains(&CLOSED_NOTICE.to_string()));
        // Gone from the directory.
        svc.on_poll_closed(&poll_id).await.unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn topic_deletion_stops_polls_and_clears_pending() {
        let dir = tmp_dir();
        let (port, svc) = service(&dir);
        create_poll(&svc).await;

        // A second pending topic that never got its first message.
        svc.on_topic_created(TopicId(99), "J14 - Nunca FC").await;
        svc.on_topic_deleted(CHAT, TopicId(99)).await.unwrap();
        // Deleting the pending topic later creates nothing.
        assert!(!svc.on_first_message(CHAT, TopicId(99), t0()).await.unwrap());

        svc.on_topic_deleted(CHAT, TOPIC).await.unwrap();
        assert!(port
            .calls()
            .contains(&Call::StopPoll(CHAT, TOPIC, "poll-1".to_string())));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn team_lifecycle_follows_bot_membership() {
        let dir = tmp_dir();
        let (_port, svc) = service(&dir);

        svc.on_bot_joined(CHAT, "CD Ejemplo").await.unwrap();
        svc.on_bot_joined(CHAT, "CD Ejemplo").await.unwrap(); // idempotent
        svc.on_bot_left(CHAT).await.unwrap();
        svc.on_bot_left(CHAT).await.unwrap(); // no-op

        let teams = TeamStore::new(dir.join("teams.json")).load().unwrap();
        assert!(teams.get(CHAT).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn votes_survive_snapshot_reload() {
        let dir = tmp_dir();
        let (_, svc) = service(&dir);
        let poll_id = create_poll(&svc).await;
        svc.on_vote_answer(&poll_id, &user(1, Some("ana")), &[0], t0() + Duration::hours(1))
            .await
            .unwrap();

        // A fresh service over the same files sees the poll and the vote.
        let polls = PollStore::new(dir.join("active_match_polls.json"))
            .load()
            .unwrap();
        let poll = polls.poll(CHAT, TOPIC, &poll_id).unwrap();
        assert_eq!(
            poll.votes.get(&UserId(1)).unwrap().option,
            Availability::Available
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
