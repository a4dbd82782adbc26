//! Pending topics: the bridge between "topic created" and its first message.
//!
//! A topic whose title looks like a match code (e.g. `J12 - Rivals FC`) is
//! parked here; the entry is consumed when the first real message arrives and
//! the poll gets created, or cleared if the topic is deleted first.

use std::collections::HashMap;

use regex::Regex;

use crate::domain::TopicId;

/// Match-code titles: one letter (J = jornada, A = amistoso), digits, optional
/// spaces, then a hyphen.
const MATCH_TOPIC_PATTERN: &str = r"^[JA]\d+\s*-";

#[derive(Debug)]
pub struct PendingTopics {
    pattern: Regex,
    pending: HashMap<TopicId, String>,
}

impl Default for PendingTopics {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingTopics {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(MATCH_TOPIC_PATTERN).expect("valid pattern"),
            pending: HashMap::new(),
        }
    }

    /// Park the topic if its title matches the match-code pattern.
    /// Returns true when parked.
    pub fn observe_created(&mut self, topic_id: TopicId, title: &str) -> bool {
        if !self.pattern.is_match(title) {
            return false;
        }
        self.pending.insert(topic_id, title.to_string());
        true
    }

    /// Consume the pending entry for a topic (first message arrived).
    pub fn take(&mut self, topic_id: TopicId) -> Option<String> {
        self.pending.remove(&topic_id)
    }

    /// Drop the pending entry without consuming it (topic deleted).
    pub fn clear(&mut self, topic_id: TopicId) {
        self.pending.remove(&topic_id);
    }

    pub fn contains(&self, topic_id: TopicId) -> bool {
        self.pending.contains_key(&topic_id)
    }
}
