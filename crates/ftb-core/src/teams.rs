//! Team registry: one team per group chat the bot lives in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ChatId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct TeamRegistry {
    teams: BTreeMap<ChatId, Team>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the chat's team. Returns true when newly registered.
    pub fn register(&mut self, chat_id: ChatId, name: &str) -> bool {
        if self.teams.contains_key(&chat_id) {
            return false;
        }
        self.teams.insert(
            chat_id,
            Team {
                name: name.to_string(),
            },
        );
        true
    }

    /// Delete the chat's team. Returns the removed team, if any.
    pub fn delete(&mut self, chat_id: ChatId) -> Option<Team> {
        self.teams.remove(&chat_id)
    }

    pub fn get(&self, chat_id: ChatId) -> Option<&Team> {
        self.teams.get(&chat_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChatId, &Team)> {
        self.teams.iter()
    }

    pub fn insert(&mut self, chat_id: ChatId, team: Team) {
        self.teams.insert(chat_id, team);
    }
}
