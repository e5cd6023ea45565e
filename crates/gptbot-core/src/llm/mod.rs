//! Completion collaborator abstractions.
//!
//! - `Completer`: RPITIT trait for concrete completion endpoints
//! - `BoxCompleter`: object-safe wrapper for runtime selection

pub mod box_completer;
pub mod completer;
