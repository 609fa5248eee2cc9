//! Persistence contracts consumed by the bracket engine.
//!
//! The engine never talks to a database directly. It mutates matches and
//! sets through [`MatchStore`] and [`SetStore`]; every method is expected
//! to be atomic on its own. [`MemoryStore`] implements both contracts in
//! memory.

mod mem;

pub use mem::MemoryStore;

use crate::Result;

use knockout_core::{
    BracketType, Match, MatchId, MatchStatus, Outcome, Participant, ParticipantId, Set,
    TournamentId,
};

use std::collections::HashMap;

/// A match that has not been assigned an identity yet.
///
/// Produced in bulk by the generator and turned into [`Match`]es by
/// [`MatchStore::create_matches`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub bracket: BracketType,
    pub round: u64,
    pub position: u64,
    pub slots: [Option<Participant>; 2],
    pub status: MatchStatus,
    pub outcome: Outcome,
}

/// Match persistence.
///
/// Matches returned by this contract carry an empty `sets` list; sets are
/// the domain of [`SetStore`] and are hydrated by the service layer.
pub trait MatchStore {
    /// Persists `matches` in bulk, assigning an identity to each. The
    /// returned matches keep the input order.
    fn create_matches(&self, matches: Vec<NewMatch>) -> Result<Vec<Match>>;

    /// Returns the match with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no match with the given `id` exists.
    ///
    /// [`Error::NotFound`]: crate::Error::NotFound
    fn match_by_id(&self, id: MatchId) -> Result<Match>;

    /// Returns all matches of `tournament` ordered by bracket, round and
    /// position.
    fn matches_for_tournament(&self, tournament: TournamentId) -> Result<Vec<Match>>;

    /// Records `outcome` on the match and marks it completed.
    fn update_result(&self, id: MatchId, outcome: Outcome) -> Result<()>;

    fn update_status(&self, id: MatchId, status: MatchStatus) -> Result<()>;

    /// Places `participant` into `slot` (0 or 1) of the match.
    fn set_slot(&self, id: MatchId, slot: usize, participant: Participant) -> Result<()>;

    /// Empties `slot` (0 or 1) of the match.
    fn clear_slot(&self, id: MatchId, slot: usize) -> Result<()>;

    /// Updates the pointer to the match the winner advances into.
    fn update_next_match(&self, id: MatchId, next: Option<MatchId>) -> Result<()>;

    /// Clears the outcome and resets the status to [`MatchStatus::Ready`].
    /// Recorded sets are removed separately via [`SetStore::delete_sets`].
    fn reopen_match(&self, id: MatchId) -> Result<()>;

    /// Returns all matches of `tournament` with `participant` in either
    /// slot and a status of pending, ready or in progress.
    fn pending_for_participant(
        &self,
        tournament: TournamentId,
        participant: ParticipantId,
    ) -> Result<Vec<Match>>;
}

/// Set persistence.
pub trait SetStore {
    /// Replaces all sets of the match. Implemented as a delete followed by
    /// a rewrite; calling it twice with the same input is idempotent.
    fn replace_sets(&self, id: MatchId, sets: &[Set]) -> Result<()>;

    /// Returns the sets of the match ordered by set number.
    fn sets_for_match(&self, id: MatchId) -> Result<Vec<Set>>;

    /// Returns the sets for every match in `ids`. Matches without sets are
    /// absent from the returned map.
    fn sets_for_matches(&self, ids: &[MatchId]) -> Result<HashMap<MatchId, Vec<Set>>> {
        let mut sets = HashMap::new();

        for id in ids {
            let for_match = self.sets_for_match(*id)?;
            if !for_match.is_empty() {
                sets.insert(*id, for_match);
            }
        }

        Ok(sets)
    }

    fn delete_sets(&self, id: MatchId) -> Result<()>;
}
