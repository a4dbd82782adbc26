//! Availability polls: the option set, a single vote, and the poll itself.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{PollId, UserId};
use crate::formatting::{mention_html, mention_html_bare};
use crate::members::MemberProfile;

/// Days a poll stays open after creation. Fixed, not configurable.
pub const POLL_DEADLINE_DAYS: i64 = 4;

/// Question sent with every match poll.
pub const POLL_QUESTION: &str = "Indica tu disponibilidad";

/// The closed option set of a match poll.
///
/// The ordinal mapping (0/1/2) matches the option order sent to the platform,
/// so platform option indices convert directly. Snapshots store the Spanish
/// label so files written by earlier deployments load unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "Disponible")]
    Available,
    #[serde(rename = "Duda (indica cuándo podrás confirmar)")]
    Unsure,
    #[serde(rename = "Baja")]
    Unavailable,
}

impl Availability {
    pub const ALL: [Availability; 3] = [
        Availability::Available,
        Availability::Unsure,
        Availability::Unavailable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Availability::Available => "Disponible",
            Availability::Unsure => "Duda (indica cuándo podrás confirmar)",
            Availability::Unavailable => "Baja",
        }
    }

    /// Option index as reported by the platform. `None` for out-of-range
    /// indices; callers drop those events at the ingestion boundary.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Option labels in ordinal order, as sent with `send_poll`.
    pub fn option_labels() -> Vec<String> {
        Self::ALL.iter().map(|o| o.label().to_string()).collect()
    }
}

/// A single user's latest choice and when it was cast.
#[derive(Clone, Debug, PartialEq)]
pub struct Vote {
    pub user_id: UserId,
    pub option: Availability,
    pub timestamp: DateTime<Local>,
}

/// One availability poll tied to a chat+topic pair.
///
/// Votes are keyed by user: a re-vote replaces the prior entry and a
/// retraction deletes it outright, so a retract-then-revote is
/// indistinguishable from a first vote (the change alert will not fire).
#[derive(Clone, Debug)]
pub struct MatchPoll {
    pub poll_id: PollId,
    pub created_at: DateTime<Local>,
    pub deadline: DateTime<Local>,
    pub votes: BTreeMap<UserId, Vote>,
}

impl MatchPoll {
    pub fn new(poll_id: PollId, created_at: DateTime<Local>) -> Self {
        Self {
            poll_id,
            created_at,
            deadline: created_at + Duration::days(POLL_DEADLINE_DAYS),
            votes: BTreeMap::new(),
        }
    }

    /// Record (or overwrite) a user's vote. Returns the prior option if the
    /// user had already voted; the caller compares it against the new option
    /// to decide whether to emit a change alert.
    pub fn record_vote(
        &mut self,
        user_id: UserId,
        option: Availability,
        timestamp: DateTime<Local>,
    ) -> Option<Availability> {
        let previous = self.votes.get(&user_id).map(|v| v.option);
        self.votes.insert(
            user_id,
            Vote {
                user_id,
                option,
                timestamp,
            },
        );
        previous
    }

    /// Delete a user's vote entirely (no tombstone). No-op if absent.
    pub fn retract_vote(&mut self, user_id: UserId) {
        self.votes.remove(&user_id);
    }

    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        now < self.deadline
    }

    pub fn available_players(&self) -> Vec<UserId> {
        self.votes
            .values()
            .filter(|v| v.option == Availability::Available)
            .map(|v| v.user_id)
            .collect()
    }

    pub fn unavailable_players(&self) -> Vec<UserId> {
        self.votes
            .values()
            .filter(|v| v.option != Availability::Available)
            .map(|v| v.user_id)
            .collect()
    }

    /// Render the attendance report (Telegram HTML).
    ///
    /// Header with the creation timestamp, one line per cast vote, one line
    /// per registered member who has not voted, footer with the deadline.
    /// Both maps are `BTreeMap`, so the output is deterministic.
    pub fn render_report(&self, members: &BTreeMap<UserId, MemberProfile>) -> String {
        let mut lines = vec![
            format!(
                "<u><b>REPORTE ACTUAL DE LA CONVOCATORIA {}</b></u>",
                self.created_at.format("%d-%m-%Y %H:%M")
            ),
            "Votos:".to_string(),
        ];

        for (user_id, vote) in &self.votes {
            let mention = match members.get(user_id) {
                Some(profile) => mention_html(*user_id, profile),
                None => mention_html_bare(*user_id),
            };
            lines.push(format!(
                "{mention} : {} (Marca temporal: {})",
                vote.option.label(),
                vote.timestamp.format("%Y-%m-%d %H:%M")
            ));
        }

        for (user_id, profile) in members {
            if !self.votes.contains_key(user_id) {
                lines.push(format!(
                    "{} aún no ha votado.",
                    mention_html(*user_id, profile)
                ));
            }
        }

        lines.push(format!(
            "<u>Cierre de la convocatoria: {}</u>",
            self.deadline.format("%d-%m-%Y %H:%M")
        ));

        lines.join("\n\n")
    }
}
