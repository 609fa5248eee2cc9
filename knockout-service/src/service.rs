use crate::locks::TournamentLocks;
use crate::store::{MatchStore, SetStore};
use crate::{Error, Result};

use knockout_core::{
    seeding, BracketState, Match, MatchId, MatchStatus, Outcome, Participant, Set, TournamentId,
};

use std::cmp::Ordering;

/// The bracket engine exposed to the API layer.
///
/// `BracketService` owns a store implementing the persistence contracts and
/// a per-tournament lock table. Mutating operations (`generate`,
/// `report_result`, `start`, `withdraw`, `reopen`) serialize per
/// tournament; `list_matches` and `bracket_state` read the latest
/// committed data without taking a lock.
#[derive(Debug)]
pub struct BracketService<S> {
    pub(crate) store: S,
    pub(crate) locks: TournamentLocks,
}

impl<S> BracketService<S>
where
    S: MatchStore + SetStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: TournamentLocks::new(),
        }
    }

    /// Starts a ready match, moving it to in progress.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the match does not exist and
    /// [`Error::InvalidState`] if it is not ready.
    pub fn start(&self, id: MatchId) -> Result<Match> {
        let r#match = self.store.match_by_id(id)?;

        let lock = self.locks.get(r#match.tournament_id);
        let _guard = lock.lock();

        // Re-read under the lock; the status may have moved since.
        let r#match = self.store.match_by_id(id)?;
        if r#match.status != MatchStatus::Ready {
            return Err(Error::InvalidState(r#match.status));
        }

        self.store.update_status(id, MatchStatus::InProgress)?;
        log::debug!("Match {} is now in progress", id);

        self.hydrated(id)
    }

    /// Records a result on a ready or in-progress match and advances the
    /// winner into the next match.
    ///
    /// The winner is the participant that won strictly more sets; tied sets
    /// count for neither side. If filling the winner into the next match
    /// completes its slots, that match flips to ready.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the match does not exist,
    /// [`Error::InvalidState`] if it is pending or already completed,
    /// [`Error::InvalidInput`] if `sets` is empty or malformed and
    /// [`Error::NoClearWinner`] if both sides won an equal number of sets.
    pub fn report_result(&self, id: MatchId, sets: Vec<Set>) -> Result<Match> {
        let r#match = self.store.match_by_id(id)?;

        let lock = self.locks.get(r#match.tournament_id);
        let _guard = lock.lock();

        let r#match = self.store.match_by_id(id)?;
        match r#match.status {
            MatchStatus::Pending | MatchStatus::Completed => {
                return Err(Error::InvalidState(r#match.status));
            }
            MatchStatus::Ready | MatchStatus::InProgress => {}
        }

        if sets.is_empty() {
            return Err(Error::InvalidInput("a result requires at least one set"));
        }
        if sets.iter().any(|set| set.number == 0) {
            return Err(Error::InvalidInput("set numbers start at 1"));
        }

        let slot = winning_slot(&sets).ok_or(Error::NoClearWinner)?;
        // A ready or in-progress match always has both slots filled.
        let winner = r#match.slots[slot]
            .clone()
            .ok_or(Error::InvalidState(r#match.status))?;

        self.store.replace_sets(id, &sets)?;
        self.store
            .update_result(id, Outcome::Decided { winner: winner.id })?;

        log::debug!("Match {} completed, winner is {}", id, winner.id);

        self.advance_winner(&r#match, winner)?;

        self.hydrated(id)
    }

    /// Returns all matches of `tournament` ordered by bracket, round and
    /// position, with their sets hydrated.
    pub fn list_matches(&self, tournament: TournamentId) -> Result<Vec<Match>> {
        let mut matches = self.store.matches_for_tournament(tournament)?;

        let ids: Vec<MatchId> = matches.iter().map(|m| m.id).collect();
        let mut sets = self.store.sets_for_matches(&ids)?;

        for r#match in &mut matches {
            if let Some(sets) = sets.remove(&r#match.id) {
                r#match.sets = sets;
            }
        }

        Ok(matches)
    }

    /// Derives the summary view of the bracket from its match set.
    ///
    /// The current round is the lowest round with an undecided match. The
    /// bracket is complete once the single match of the last round has a
    /// winner; that winner is the champion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no bracket was generated for
    /// `tournament`.
    pub fn bracket_state(&self, tournament: TournamentId) -> Result<BracketState> {
        let matches = self.list_matches(tournament)?;
        if matches.is_empty() {
            return Err(Error::NotFound);
        }

        let total_rounds = matches.iter().map(|m| m.round).max().unwrap_or(0);
        let current_round = matches
            .iter()
            .filter(|m| !m.status.is_completed())
            .map(|m| m.round)
            .min()
            .unwrap_or(total_rounds);

        let champion = matches
            .iter()
            .find(|m| m.round == total_rounds)
            .and_then(|m| m.winner())
            .cloned();

        Ok(BracketState {
            tournament_id: tournament,
            total_rounds,
            current_round,
            complete: champion.is_some(),
            champion,
            matches,
        })
    }

    /// Moves `winner` into its slot of the match fed by `r#match` and flips
    /// that match to ready once both slots are filled. Does nothing for the
    /// final.
    pub(crate) fn advance_winner(&self, r#match: &Match, winner: Participant) -> Result<()> {
        let next_id = match r#match.next_match {
            Some(id) => id,
            None => return Ok(()),
        };

        let slot = seeding::next_match_slot(r#match.position);
        self.store.set_slot(next_id, slot, winner)?;

        let next = self.store.match_by_id(next_id)?;
        if next.is_full() && next.status == MatchStatus::Pending {
            self.store.update_status(next_id, MatchStatus::Ready)?;
        }

        log::debug!(
            "Advanced winner of match {} into slot {} of match {}",
            r#match.id,
            slot,
            next_id
        );

        Ok(())
    }

    /// Returns the match with its sets hydrated.
    pub(crate) fn hydrated(&self, id: MatchId) -> Result<Match> {
        let mut r#match = self.store.match_by_id(id)?;
        r#match.sets = self.store.sets_for_match(id)?;

        Ok(r#match)
    }
}

/// Returns the slot that won strictly more sets, or `None` on a tie.
fn winning_slot(sets: &[Set]) -> Option<usize> {
    let mut wins = [0u64; 2];

    for set in sets {
        if let Some(slot) = set.winner() {
            wins[slot] += 1;
        }
    }

    match wins[0].cmp(&wins[1]) {
        Ordering::Greater => Some(0),
        Ordering::Less => Some(1),
        Ordering::Equal => None,
    }
}
