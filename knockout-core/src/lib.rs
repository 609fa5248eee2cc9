//! # knockout-core
//!
//! This crate contains the data model and the seeding math for single
//! elimination brackets.
//!
//! Important types:
//! - [`Participant`]: an entrant reference carried through the bracket.
//! - [`Match`]: a node in the match tree, linked to the match its winner
//!   advances into.
//! - [`Set`]: a single scored sub-game of a match.
//! - [`Outcome`]: the result state of a match. A match is either undecided,
//!   decided by play or decided by forfeit.
//! - [`BracketState`]: a derived summary of a whole bracket.
//!
//! The bracket shape itself (sizes, pairings, advancement mapping) lives in
//! the [`seeding`] module.
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to all types.

pub mod seeding;

mod id;

pub use id::{MatchId, ParticipantId, TournamentId};

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An entrant in a bracket.
///
/// Participants are external references: id and display name are owned by
/// the surrounding tournament service. The seed is the rank used to build
/// the round-1 pairings, starting at 1 for the strongest entrant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub seed: u64,
}

/// The elimination system requested for a bracket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SystemKind {
    SingleElimination,
    DoubleElimination,
}

/// The side of the bracket a match belongs to.
///
/// Single elimination only ever produces `Winners` matches. `Losers` exists
/// in the persisted vocabulary for double elimination, which is not
/// generated by this engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BracketType {
    Winners,
    Losers,
}

/// The lifecycle state of a match.
///
/// Matches move strictly forward through `Pending` -> `Ready` ->
/// `InProgress` -> `Completed` (skipping `InProgress` is legal). The only
/// backwards transition is a reopen, which takes a completed match back to
/// `Ready` and its dependents back to `Ready` or `Pending`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchStatus {
    /// At least one slot is still unfilled.
    Pending,
    /// Both slots are filled and no result has been recorded.
    Ready,
    InProgress,
    Completed,
}

impl MatchStatus {
    /// Returns `true` if the match has a recorded result.
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A single scored set within a match.
///
/// Set numbers are 1-indexed and define the order of play. `scores` holds
/// the points of slot 0 and slot 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Set {
    pub number: u64,
    pub scores: [u64; 2],
}

impl Set {
    /// Returns the slot index that won this set, or `None` when the set is
    /// tied. A tied set counts for neither side.
    #[inline]
    pub fn winner(&self) -> Option<usize> {
        match self.scores[0].cmp(&self.scores[1]) {
            Ordering::Greater => Some(0),
            Ordering::Less => Some(1),
            Ordering::Equal => None,
        }
    }
}

/// The result state of a match.
///
/// `Decided` and `Forfeited` both name a winner; the variant records *how*
/// the match was won. This makes the invalid combination of a forfeit
/// winner without a winner unrepresentable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    #[default]
    Undecided,
    /// Decided by play, justified by the recorded sets.
    Decided { winner: ParticipantId },
    /// Decided by the opponent withdrawing.
    Forfeited { winner: ParticipantId },
}

impl Outcome {
    /// Returns the winner regardless of how the match was decided.
    #[inline]
    pub fn winner(&self) -> Option<ParticipantId> {
        match *self {
            Self::Undecided => None,
            Self::Decided { winner } | Self::Forfeited { winner } => Some(winner),
        }
    }

    /// Returns `true` if the match was decided by forfeit.
    #[inline]
    pub fn is_forfeit(&self) -> bool {
        matches!(self, Self::Forfeited { .. })
    }
}

/// A match (node) in the bracket tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub bracket: BracketType,
    /// 1-indexed round within the bracket.
    pub round: u64,
    /// 1-indexed position within the round. Odd positions feed slot 0 of
    /// the next match, even positions slot 1.
    pub position: u64,
    /// The two entrant slots. A round-1 slot that stays `None` is a bye;
    /// in later rounds `None` means the feeding match is not decided yet.
    pub slots: [Option<Participant>; 2],
    pub status: MatchStatus,
    pub outcome: Outcome,
    /// The match the winner advances into. `None` only for the final.
    pub next_match: Option<MatchId>,
    /// Ordered sets, hydrated from the set store.
    pub sets: Vec<Set>,
}

impl Match {
    /// Returns the index of the slot occupied by `participant`.
    pub fn slot_of(&self, participant: ParticipantId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().map_or(false, |p| p.id == participant))
    }

    /// Returns `true` if both slots are filled.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Returns the winning participant, if the match is decided and the
    /// winner still occupies one of the slots.
    pub fn winner(&self) -> Option<&Participant> {
        let winner = self.outcome.winner()?;
        self.slots.iter().flatten().find(|p| p.id == winner)
    }
}

/// A derived summary of a bracket.
///
/// `BracketState` is computed from the match set on demand and never
/// persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BracketState {
    pub tournament_id: TournamentId,
    pub total_rounds: u64,
    /// The lowest round that still has an undecided match, or the final
    /// round once everything is completed.
    pub current_round: u64,
    pub complete: bool,
    pub champion: Option<Participant>,
    /// All matches ordered by bracket, round and position.
    pub matches: Vec<Match>,
}
