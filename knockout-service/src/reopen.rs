//! Reversing completed matches.
//!
//! Reopening a match must also unwind everything that depended on its
//! winner: the winner may already sit in the next match, and that match may
//! itself be completed. The cascade walks the dependency chain depth-first
//! and clears dependents before the match that fed them, so reopening any
//! match, up to and including the final, leaves a consistent bracket
//! without the caller knowing its shape.

use crate::service::BracketService;
use crate::store::{MatchStore, SetStore};
use crate::{Error, Result};

use knockout_core::{seeding, MatchId, MatchStatus};

impl<S> BracketService<S>
where
    S: MatchStore + SetStore,
{
    /// Reopens a completed match and every completed match that its winner
    /// advanced into, transitively.
    ///
    /// Each affected match loses its sets and outcome and returns to
    /// ready; a match that lost an entrant out of one of its slots drops
    /// back to pending. Returns the ids of every match that was reopened,
    /// dependents first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the match does not exist and
    /// [`Error::InvalidState`] if it is not completed.
    pub fn reopen(&self, id: MatchId) -> Result<Vec<MatchId>> {
        let r#match = self.store.match_by_id(id)?;

        let lock = self.locks.get(r#match.tournament_id);
        let _guard = lock.lock();

        let r#match = self.store.match_by_id(id)?;
        if r#match.status != MatchStatus::Completed {
            return Err(Error::InvalidState(r#match.status));
        }

        let mut affected = Vec::new();

        // Explicit two-phase stack instead of recursion; the dependency
        // chain is at most one match per round deep.
        let mut stack = vec![(id, false)];
        while let Some((id, expanded)) = stack.pop() {
            if !expanded {
                stack.push((id, true));

                // A completed next match holding this winner has to be
                // reopened before the winner can be pulled out of it.
                let r#match = self.store.match_by_id(id)?;
                if let (Some(next_id), Some(winner)) =
                    (r#match.next_match, r#match.outcome.winner())
                {
                    let next = self.store.match_by_id(next_id)?;
                    let slot = seeding::next_match_slot(r#match.position);

                    let occupied = next.slots[slot].as_ref().map_or(false, |p| p.id == winner);
                    if occupied && next.status == MatchStatus::Completed {
                        stack.push((next_id, false));
                    }
                }

                continue;
            }

            let r#match = self.store.match_by_id(id)?;

            if let (Some(next_id), Some(winner)) = (r#match.next_match, r#match.outcome.winner()) {
                let next = self.store.match_by_id(next_id)?;
                let slot = seeding::next_match_slot(r#match.position);

                if next.slots[slot].as_ref().map_or(false, |p| p.id == winner) {
                    self.store.clear_slot(next_id, slot)?;

                    let next = self.store.match_by_id(next_id)?;
                    let status = if next.is_full() {
                        MatchStatus::Ready
                    } else {
                        MatchStatus::Pending
                    };
                    self.store.update_status(next_id, status)?;
                }
            }

            self.store.delete_sets(id)?;
            self.store.reopen_match(id)?;

            log::debug!("Reopened match {}", id);
            affected.push(id);
        }

        Ok(affected)
    }
}
