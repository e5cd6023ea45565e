//! Conversation sessions.
//!
//! A `Conversation` ties one conversation id to a history store and a
//! completer, and runs the append / window / complete / append cycle.

pub mod session;

pub use session::{Conversation, FUNCTION_CALL_PLACEHOLDER};
