//! Message history persistence.
//!
//! - `HistoryStore`: RPITIT port implemented by the SQLite store in
//!   gptbot-infra
//! - `InMemoryHistoryStore`: process-local implementation with the same
//!   window semantics

pub mod memory;
pub mod store;
