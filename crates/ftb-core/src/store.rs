//! Flat-file JSON persistence for the poll directory and the registries.
//!
//! Saves are synchronous and write-through: every accepted mutation rewrites
//! the whole file. No atomic-rename or checksumming; write frequency is low
//! and the risk is accepted. Numeric ids are stringified in the files
//! (snapshot compatibility with earlier deployments), so each store converts
//! between the on-disk DTOs and the in-memory typed structures.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::directory::PollDirectory;
use crate::domain::{ChatId, PollId, TopicId, UserId};
use crate::locations::{Location, LocationRegistry};
use crate::members::{MemberProfile, MembershipRegistry};
use crate::poll::{Availability, MatchPoll};
use crate::teams::{Team, TeamRegistry};
use crate::Result;

pub const POLLS_FILE: &str = "active_match_polls.json";
pub const MEMBERS_FILE: &str = "chat_members.json";
pub const TEAMS_FILE: &str = "teams.json";
pub const LOCATIONS_FILE: &str = "locations.json";

// === On-disk DTOs ===

#[derive(Serialize, Deserialize)]
struct VoteSnapshot {
    user_id: i64,
    option: Availability,
    timestamp: DateTime<Local>,
}

#[derive(Serialize, Deserialize)]
struct PollSnapshot {
    poll_id: String,
    created_at: DateTime<Local>,
    votes: HashMap<String, VoteSnapshot>,
}

type PollsFile = HashMap<String, HashMap<String, HashMap<String, PollSnapshot>>>;
type MembersFile = HashMap<String, HashMap<String, MemberProfile>>;
type TeamsFile = HashMap<String, Team>;
type LocationsFile = HashMap<String, Location>;

fn read_json_or_default<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

/// Stringified-id keys that fail to parse are skipped with a warning rather
/// than failing the whole load; a half-usable snapshot beats none.
fn parse_key<T: std::str::FromStr>(key: &str, what: &str) -> Option<T> {
    match key.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("[STORE] Skipping malformed {what} key: {key}");
            None
        }
    }
}

// === Poll directory ===

#[derive(Clone, Debug)]
pub struct PollStore {
    path: PathBuf,
}

impl PollStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<PollDirectory> {
        let data: PollsFile = read_json_or_default(&self.path)?;
        let mut dir = PollDirectory::new();
        for (chat_key, topics) in data {
            let Some(chat_id) = parse_key::<i64>(&chat_key, "chat") else {
                continue;
            };
            for (topic_key, polls) in topics {
                let Some(topic_id) = parse_key::<i32>(&topic_key, "topic") else {
                    continue;
                };
                for (_, snap) in polls {
                    let mut poll = MatchPoll::new(PollId(snap.poll_id), snap.created_at);
                    for (_, vote) in snap.votes {
                        poll.record_vote(UserId(vote.user_id), vote.option, vote.timestamp);
                    }
                    dir.add(ChatId(chat_id), TopicId(topic_id), poll);
                }
            }
        }
        Ok(dir)
    }

    pub fn save(&self, dir: &PollDirectory) -> Result<()> {
        let mut data: PollsFile = HashMap::new();
        for (chat_id, topics) in dir.iter_chats() {
            let chat_entry = data.entry(chat_id.0.to_string()).or_default();
            for (topic_id, polls) in topics {
                let topic_entry = chat_entry.entry(topic_id.0.to_string()).or_default();
                for (poll_id, poll) in polls {
                    let votes = poll
                        .votes
                        .iter()
                        .map(|(user_id, vote)| {
                            (
                                user_id.0.to_string(),
                                VoteSnapshot {
                                    user_id: vote.user_id.0,
                                    option: vote.option,
                                    timestamp: vote.timestamp,
                                },
                            )
                        })
                        .collect();
                    topic_entry.insert(
                        poll_id.0.clone(),
                        PollSnapshot {
                            poll_id: poll.poll_id.0.clone(),
                            created_at: poll.created_at,
                            votes,
                        },
                    );
                }
            }
        }
        write_json(&self.path, &data)
    }
}

// === Membership registry ===

#[derive(Clone, Debug)]
pub struct MemberStore {
    path: PathBuf,
}

impl MemberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<MembershipRegistry> {
        let data: MembersFile = read_json_or_default(&self.path)?;
        let mut reg = MembershipRegistry::new();
        for (chat_key, members) in data {
            let Some(chat_id) = parse_key::<i64>(&chat_key, "chat") else {
                continue;
            };
            let members = members
                .into_iter()
                .filter_map(|(user_key, profile)| {
                    parse_key::<i64>(&user_key, "user").map(|id| (UserId(id), profile))
                })
                .collect();
            reg.insert_chat(ChatId(chat_id), members);
        }
        Ok(reg)
    }

    pub fn save(&self, reg: &MembershipRegistry) -> Result<()> {
        let data: MembersFile = reg
            .iter()
            .map(|(chat_id, members)| {
                (
                    chat_id.0.to_string(),
                    members
                        .iter()
                        .map(|(user_id, profile)| (user_id.0.to_string(), profile.clone()))
                        .collect(),
                )
            })
            .collect();
        write_json(&self.path, &data)
    }
}

// === Team registry ===

#[derive(Clone, Debug)]
pub struct TeamStore {
    path: PathBuf,
}

impl TeamStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<TeamRegistry> {
        let data: TeamsFile = read_json_or_default(&self.path)?;
        let mut reg = TeamRegistry::new();
        for (chat_key, team) in data {
            let Some(chat_id) = parse_key::<i64>(&chat_key, "chat") else {
                continue;
            };
            reg.insert(ChatId(chat_id), team);
        }
        Ok(reg)
    }

    pub fn save(&self, reg: &TeamRegistry) -> Result<()> {
        let data: TeamsFile = reg
            .iter()
            .map(|(chat_id, team)| (chat_id.0.to_string(), team.clone()))
            .collect();
        write_json(&self.path, &data)
    }
}

// === Location registry ===

#[derive(Clone, Debug)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<LocationRegistry> {
        let data: LocationsFile = read_json_or_default(&self.path)?;
        let mut reg = LocationRegistry::new();
        for (name, location) in data {
            reg.upsert(&name, location);
        }
        Ok(reg)
    }

    pub fn save(&self, reg: &LocationRegistry) -> Result<()> {
        let data: LocationsFile = reg
            .iter()
            .map(|(name, location)| (name.clone(), location.clone()))
            .collect();
        write_json(&self.path, &data)
    }
}
