//! # knockout-service
//!
//! The bracket engine for single elimination tournaments. It seeds
//! participants into fair pairings, generates the match tree, records
//! results, advances winners, forfeits the matches of withdrawing
//! participants and reverses completed matches with a cascading undo.
//!
//! Matches and sets are persisted through the [`store::MatchStore`] and
//! [`store::SetStore`] contracts. [`store::MemoryStore`] is a complete
//! in-memory implementation of both; database backed implementations live
//! with the embedding service.
//!
//! All operations are exposed on [`BracketService`]. Mutating operations
//! serialize per tournament; reads run against the latest committed data.

pub mod store;

mod generator;
mod locks;
mod reopen;
mod service;
mod withdraw;

pub use service::BracketService;
pub use withdraw::Withdrawal;

use knockout_core::MatchStatus;

use thiserror::Error;

/// A `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The errors surfaced by the bracket engine.
///
/// Every variant maps 1:1 to a caller-facing failure; the engine never
/// retries and never rolls back partially applied multi-step persistence on
/// its own.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The requested match or tournament does not exist.
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The operation is not legal for the current match status.
    #[error("invalid match state: {0:?}")]
    InvalidState(MatchStatus),
    /// Both entrants won an equal number of sets.
    #[error("no clear winner")]
    NoClearWinner,
    /// A failure inside the storage backend.
    #[error("store: {0}")]
    Store(String),
}
