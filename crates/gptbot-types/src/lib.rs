//! Shared domain types for gptbot.
//!
//! This crate has no I/O. It defines the data shapes passed between the
//! conversation session, the history store, and the completion collaborator.

pub mod completion;
pub mod config;
pub mod error;
pub mod message;
pub mod window;
