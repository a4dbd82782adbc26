/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Forum topic id (message thread id, numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId(pub i32);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// Platform-assigned poll id (string, immutable, unique).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PollId(pub String);

impl PollId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A user as seen in an inbound update. Bots are never registered as members.
#[derive(Clone, Debug)]
pub struct UserInfo {
    pub id: UserId,
    pub is_bot: bool,
    pub username: Option<String>,
    pub full_name: String,
}
