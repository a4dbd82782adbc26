//! Keyed storage of all live polls, grouped by chat and topic.
//!
//! Vote-answer updates carry only a poll id, so the directory maintains a
//! reverse index `poll_id -> (chat, topic)` as a derived cache. The index is
//! updated inside `add`/`remove` only; callers never touch it.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{ChatId, PollId, TopicId};
use crate::poll::MatchPoll;

pub type TopicPolls = BTreeMap<PollId, MatchPoll>;
pub type ChatTopics = BTreeMap<TopicId, TopicPolls>;

#[derive(Debug, Default)]
pub struct PollDirectory {
    polls: BTreeMap<ChatId, ChatTopics>,
    index: HashMap<PollId, (ChatId, TopicId)>,
}

impl PollDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a poll, creating intermediate levels as needed.
    pub fn add(&mut self, chat_id: ChatId, topic_id: TopicId, poll: MatchPoll) {
        self.index.insert(poll.poll_id.clone(), (chat_id, topic_id));
        self.polls
            .entry(chat_id)
            .or_default()
            .entry(topic_id)
            .or_default()
            .insert(poll.poll_id.clone(), poll);
    }

    /// Reverse lookup. Absence is a normal outcome (e.g. an update for a poll
    /// this process never created, or one already removed).
    pub fn locate(&self, poll_id: &PollId) -> Option<(ChatId, TopicId)> {
        self.index.get(poll_id).copied()
    }

    /// Delete a poll. Callers are responsible for having already issued the
    /// platform stop-poll side effect where needed.
    pub fn remove(&mut self, chat_id: ChatId, topic_id: TopicId, poll_id: &PollId) {
        if let Some(topics) = self.polls.get_mut(&chat_id) {
            if let Some(polls) = topics.get_mut(&topic_id) {
                polls.remove(poll_id);
                if polls.is_empty() {
                    topics.remove(&topic_id);
                }
            }
            if topics.is_empty() {
                self.polls.remove(&chat_id);
            }
        }
        self.index.remove(poll_id);
    }

    pub fn poll(&self, chat_id: ChatId, topic_id: TopicId, poll_id: &PollId) -> Option<&MatchPoll> {
        self.polls.get(&chat_id)?.get(&topic_id)?.get(poll_id)
    }

    pub fn poll_mut(
        &mut self,
        chat_id: ChatId,
        topic_id: TopicId,
        poll_id: &PollId,
    ) -> Option<&mut MatchPoll> {
        self.polls
            .get_mut(&chat_id)?
            .get_mut(&topic_id)?
            .get_mut(poll_id)
    }

    /// Poll ids living under one chat+topic (for topic-deletion cleanup).
    pub fn topic_poll_ids(&self, chat_id: ChatId, topic_id: TopicId) -> Vec<PollId> {
        self.polls
            .get(&chat_id)
            .and_then(|topics| topics.get(&topic_id))
            .map(|polls| polls.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Stable snapshot of all (chat, topic, poll) triples.
    ///
    /// The sweep closes polls while walking, which mutates the directory, so
    /// it iterates over this snapshot rather than live references.
    pub fn open_polls(&self) -> Vec<(ChatId, TopicId, PollId)> {
        let mut out = Vec::new();
        for (chat_id, topics) in &self.polls {
            for (topic_id, polls) in topics {
                for poll_id in polls.keys() {
                    out.push((*chat_id, *topic_id, poll_id.clone()));
                }
            }
        }
        out
    }

    pub fn iter_chats(&self) -> impl Iterator<Item = (&ChatId, &ChatTopics)> {
        self.polls.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn poll(id: &str) -> MatchPoll {
        MatchPoll::new(
            PollId(id.to_string()),
            Local.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn locate_after_add_and_remove() {
        let mut dir = PollDirectory::new();
        let (chat, topic) = (ChatId(-100), TopicId(7));
        dir.add(chat, topic, poll("p1"));

        assert_eq!(dir.locate(&PollId("p1".into())), Some((chat, topic)));
        assert_eq!(dir.locate(&PollId("p2".into())), None);

        dir.remove(chat, topic, &PollId("p1".into()));
        assert_eq!(dir.locate(&PollId("p1".into())), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn remove_prunes_empty_levels_but_keeps_siblings() {
        let mut dir = PollDirectory::new();
        let chat = ChatId(-100);
        dir.add(chat, TopicId(1), poll("a"));
        dir.add(chat, TopicId(2), poll("b"));

        dir.remove(chat, TopicId(1), &PollId("a".into()));
        assert_eq!(dir.locate(&PollId("b".into())), Some((chat, TopicId(2))));
        assert_eq!(dir.open_polls().len(), 1);
    }

    #[test]
    fn open_polls_snapshot_covers_all_triples() {
        let mut dir = PollDirectory::new();
        dir.add(ChatId(-1), TopicId(1), poll("a"));
        dir.add(ChatId(-1), TopicId(2), poll("b"));
        dir.add(ChatId(-2), TopicId(9), poll("c"));

        let snap = dir.open_polls();
        assert_eq!(snap.len(), 3);
        // Mutating while holding the snapshot is fine.
        for (chat, topic, poll_id) in snap {
            dir.remove(chat, topic, &poll_id);
        }
        assert!(dir.is_empty());
    }

    #[test]
    fn two_polls_may_coexist_in_one_topic() {
        let mut dir = PollDirectory::new();
        let (chat, topic) = (ChatId(-1), TopicId(1));
        dir.add(chat, topic, poll("a"));
        dir.add(chat, topic, poll("b"));
        assert_eq!(dir.topic_poll_ids(chat, topic).len(), 2);
    }
}
