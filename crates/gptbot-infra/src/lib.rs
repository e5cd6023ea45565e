//! Infrastructure layer for gptbot.
//!
//! Implements the port traits defined in `gptbot-core`: SQLite-backed
//! conversation history and an OpenAI completion client. Also owns config
//! file loading and credential resolution.

pub mod config;
pub mod llm;
pub mod sqlite;
