//! Per-chat registry of known human users.
//!
//! Append-only in practice: an entry is added on first sighting of a non-bot
//! user in a chat and never updated afterwards (a later username change is
//! not reflected). Used only for mention rendering and non-voter listing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ChatId, UserId, UserInfo};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub username: Option<String>,
    pub full_name: String,
}

#[derive(Debug, Default)]
pub struct MembershipRegistry {
    chats: BTreeMap<ChatId, BTreeMap<UserId, MemberProfile>>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in a chat. Idempotent; bots are never registered.
    /// Returns true when a new entry was added (caller persists on true).
    pub fn register(&mut self, chat_id: ChatId, user: &UserInfo) -> bool {
        if user.is_bot {
            return false;
        }
        let chat = self.chats.entry(chat_id).or_default();
        if chat.contains_key(&user.id) {
            return false;
        }
        chat.insert(
            user.id,
            MemberProfile {
                username: user.username.clone(),
                full_name: user.full_name.clone(),
            },
        );
        true
    }

    pub fn profile(&self, chat_id: ChatId, user_id: UserId) -> Option<&MemberProfile> {
        self.chats.get(&chat_id)?.get(&user_id)
    }

    pub fn chat_members(&self, chat_id: ChatId) -> BTreeMap<UserId, MemberProfile> {
        self.chats.get(&chat_id).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChatId, &BTreeMap<UserId, MemberProfile>)> {
        self.chats.iter()
    }

    pub fn insert_chat(&mut self, chat_id: ChatId, members: BTreeMap<UserId, MemberProfile>) {
        self.chats.insert(chat_id, members);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, is_bot: bool) -> UserInfo {
        UserInfo {
            id: UserId(id),
            is_bot,
            username: Some(format!("u{id}")),
            full_name: format!("User {id}"),
        }
    }

    #[test]
    fn registration_is_idempotent() {
        let mut reg = MembershipRegistry::new();
        assert!(reg.register(ChatId(-1), &user(1, false)));
        assert!(!reg.register(ChatId(-1), &user(1, false)));
        assert_eq!(reg.chat_members(ChatId(-1)).len(), 1);
    }

    #[test]
    fn bots_are_never_registered() {
        let mut reg = MembershipRegistry::new();
        assert!(!reg.register(ChatId(-1), &user(2, true)));
        assert!(reg.chat_members(ChatId(-1)).is_empty());
    }

    #[test]
    fn existing_profile_is_not_updated() {
        let mut reg = MembershipRegistry::new();
        reg.register(ChatId(-1), &user(1, false));
        let mut renamed = user(1, false);
        renamed.username = Some("renamed".to_string());
        reg.register(ChatId(-1), &renamed);
        assert_eq!(
            reg.profile(ChatId(-1), UserId(1)).unwrap().username,
            Some("u1".to_string())
        );
    }
}
