//! Core domain + application logic for the football team bot.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind the
//! `TeamChatPort` trait implemented in the adapter crate; everything with
//! state-machine behavior (poll lifecycle, vote reconciliation, the daily
//! sweep) is testable here without a live platform connection.

pub mod config;
pub mod directory;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod formatting;
pub mod locations;
pub mod logging;
pub mod members;
pub mod poll;
pub mod ports;
pub mod store;
pub mod sweep;
pub mod teams;
pub mod topics;
pub mod version;

pub use errors::{Error, Result};
