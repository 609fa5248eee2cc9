//! Participant withdrawal processing.

use crate::service::BracketService;
use crate::store::{MatchStore, SetStore};
use crate::Result;

use knockout_core::{MatchId, Outcome, ParticipantId, TournamentId};

use serde::{Deserialize, Serialize};

/// The result of processing a withdrawal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Matches decided by forfeit.
    pub forfeited: Vec<MatchId>,
    /// Opponents advanced into their next match.
    pub advanced: Vec<ParticipantId>,
}

impl<S> BracketService<S>
where
    S: MatchStore + SetStore,
{
    /// Forfeits every not yet completed match of `participant` in favor of
    /// the opponent and advances the opponent into the next match.
    ///
    /// Matches the participant already won or lost are left untouched; the
    /// cascade stops at the opponents' next matches. A pending match where
    /// no opponent is present yet is skipped.
    pub fn withdraw(
        &self,
        tournament: TournamentId,
        participant: ParticipantId,
    ) -> Result<Withdrawal> {
        let lock = self.locks.get(tournament);
        let _guard = lock.lock();

        let pending = self.store.pending_for_participant(tournament, participant)?;

        log::debug!(
            "Processing withdrawal of {} from {}: {} pending matches",
            participant,
            tournament,
            pending.len()
        );

        let mut withdrawal = Withdrawal::default();

        for r#match in pending {
            let slot = match r#match.slot_of(participant) {
                Some(slot) => slot,
                None => continue,
            };

            let opponent = match r#match.slots[1 - slot].clone() {
                Some(opponent) => opponent,
                None => {
                    // Should not occur in a valid bracket; without an
                    // opponent there is nobody to declare the winner.
                    log::warn!(
                        "Match {} has no opponent for withdrawing participant {}",
                        r#match.id,
                        participant
                    );
                    continue;
                }
            };

            self.store.update_result(
                r#match.id,
                Outcome::Forfeited {
                    winner: opponent.id,
                },
            )?;
            self.advance_winner(&r#match, opponent.clone())?;

            withdrawal.forfeited.push(r#match.id);
            withdrawal.advanced.push(opponent.id);
        }

        Ok(withdrawal)
    }
}
