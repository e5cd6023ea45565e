//! Conversation logic and port trait definitions for gptbot.
//!
//! This crate defines the "ports" (`HistoryStore`, `Completer`) that the
//! infrastructure layer implements, and the `Conversation` session that
//! drives them. It depends only on `gptbot-types` -- never on `gptbot-infra`
//! or any database/IO crate.

pub mod conversation;
pub mod history;
pub mod llm;
