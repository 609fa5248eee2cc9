use super::{MatchStore, NewMatch, SetStore};
use crate::{Error, Result};

use knockout_core::{Match, MatchId, MatchStatus, Outcome, Participant, ParticipantId, Set, TournamentId};

use parking_lot::RwLock;
use snowflaked::sync::Generator;

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// An in-memory implementation of [`MatchStore`] and [`SetStore`].
///
/// Used by tests and embeddings that keep brackets purely in process. All
/// clones share the same state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

struct MemoryStoreInner {
    matches: RwLock<HashMap<MatchId, Match>>,
    sets: RwLock<HashMap<MatchId, Vec<Set>>>,
    ids: Generator,
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("matches", &self.inner.matches.read().len())
            .field("sets", &self.inner.sets.read().len())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryStoreInner {
                matches: RwLock::new(HashMap::new()),
                sets: RwLock::new(HashMap::new()),
                ids: Generator::new_unchecked(0),
            }),
        }
    }

    fn update_match<F>(&self, id: MatchId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Match),
    {
        let mut matches = self.inner.matches.write();

        let r#match = matches.get_mut(&id).ok_or(Error::NotFound)?;
        f(r#match);

        Ok(())
    }
}

impl Default for MemoryStore {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStore for MemoryStore {
    fn create_matches(&self, matches: Vec<NewMatch>) -> Result<Vec<Match>> {
        let mut created = Vec::with_capacity(matches.len());

        let mut guard = self.inner.matches.write();
        for m in matches {
            let id = MatchId(self.inner.ids.generate());

            let r#match = Match {
                id,
                tournament_id: m.tournament_id,
                bracket: m.bracket,
                round: m.round,
                position: m.position,
                slots: m.slots,
                status: m.status,
                outcome: m.outcome,
                next_match: None,
                sets: Vec::new(),
            };

            guard.insert(id, r#match.clone());
            created.push(r#match);
        }

        Ok(created)
    }

    fn match_by_id(&self, id: MatchId) -> Result<Match> {
        self.inner
            .matches
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn matches_for_tournament(&self, tournament: TournamentId) -> Result<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .inner
            .matches
            .read()
            .values()
            .filter(|m| m.tournament_id == tournament)
            .cloned()
            .collect();

        matches.sort_by_key(|m| (m.bracket, m.round, m.position));

        Ok(matches)
    }

    fn update_result(&self, id: MatchId, outcome: Outcome) -> Result<()> {
        self.update_match(id, |m| {
            m.outcome = outcome;
            m.status = MatchStatus::Completed;
        })
    }

    fn update_status(&self, id: MatchId, status: MatchStatus) -> Result<()> {
        self.update_match(id, |m| m.status = status)
    }

    fn set_slot(&self, id: MatchId, slot: usize, participant: Participant) -> Result<()> {
        self.update_match(id, |m| m.slots[slot] = Some(participant))
    }

    fn clear_slot(&self, id: MatchId, slot: usize) -> Result<()> {
        self.update_match(id, |m| m.slots[slot] = None)
    }

    fn update_next_match(&self, id: MatchId, next: Option<MatchId>) -> Result<()> {
        self.update_match(id, |m| m.next_match = next)
    }

    fn reopen_match(&self, id: MatchId) -> Result<()> {
        self.update_match(id, |m| {
            m.outcome = Outcome::Undecided;
            m.status = MatchStatus::Ready;
        })
    }

    fn pending_for_participant(
        &self,
        tournament: TournamentId,
        participant: ParticipantId,
    ) -> Result<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .inner
            .matches
            .read()
            .values()
            .filter(|m| {
                m.tournament_id == tournament
                    && !m.status.is_completed()
                    && m.slot_of(participant).is_some()
            })
            .cloned()
            .collect();

        matches.sort_by_key(|m| (m.bracket, m.round, m.position));

        Ok(matches)
    }
}

impl SetStore for MemoryStore {
    fn replace_sets(&self, id: MatchId, sets: &[Set]) -> Result<()> {
        let mut guard = self.inner.sets.write();

        let mut sets = sets.to_vec();
        sets.sort_by_key(|set| set.number);

        guard.insert(id, sets);

        Ok(())
    }

    fn sets_for_match(&self, id: MatchId) -> Result<Vec<Set>> {
        Ok(self.inner.sets.read().get(&id).cloned().unwrap_or_default())
    }

    fn delete_sets(&self, id: MatchId) -> Result<()> {
        self.inner.sets.write().remove(&id);

        Ok(())
    }
}
