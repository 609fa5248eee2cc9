//! Bracket generation.
//!
//! Generation happens in three steps: a pure planning step that lays out
//! every match of the tree, a bulk insert that assigns identities, and a
//! linking pass that wires each match to the match its winner advances
//! into. Afterwards the winners of auto-completed byes are propagated to a
//! fixed point.

use crate::service::BracketService;
use crate::store::{MatchStore, NewMatch, SetStore};
use crate::{Error, Result};

use knockout_core::{
    seeding, BracketType, Match, MatchId, MatchStatus, Outcome, Participant, SystemKind,
    TournamentId,
};

use std::collections::HashMap;

impl<S> BracketService<S>
where
    S: MatchStore + SetStore,
{
    /// Generates the full match tree for `tournament` from the given
    /// participants.
    ///
    /// Round 1 is laid out in seed pairing order; a pairing against a bye
    /// completes immediately with the real participant as winner, and those
    /// winners are pre-placed into the following round. Later rounds are
    /// created as empty pending placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for fewer than 2 participants, a
    /// zero or duplicate seed, or a request for double elimination, which
    /// this engine does not support.
    pub fn generate(
        &self,
        tournament: TournamentId,
        kind: SystemKind,
        participants: Vec<Participant>,
    ) -> Result<Vec<Match>> {
        if kind == SystemKind::DoubleElimination {
            return Err(Error::InvalidInput(
                "double elimination brackets are not supported",
            ));
        }

        log::debug!(
            "Generating bracket for {} with {} participants",
            tournament,
            participants.len()
        );

        let lock = self.locks.get(tournament);
        let _guard = lock.lock();

        let plan = plan_matches(tournament, &participants)?;
        let matches = self.store.create_matches(plan)?;

        self.link_matches(&matches)?;
        self.resolve_byes(tournament)?;

        log::debug!(
            "Generated bracket for {} with {} matches",
            tournament,
            matches.len()
        );

        self.list_matches(tournament)
    }

    /// Wires every non-final match to the match at round + 1, position
    /// ceil(p / 2). Runs after the bulk insert so the links point at stable
    /// identities.
    fn link_matches(&self, matches: &[Match]) -> Result<()> {
        let total_rounds = matches.iter().map(|m| m.round).max().unwrap_or(0);

        let by_coords: HashMap<(u64, u64), MatchId> = matches
            .iter()
            .map(|m| ((m.round, m.position), m.id))
            .collect();

        for r#match in matches {
            // The final keeps its `None` link.
            if r#match.round == total_rounds {
                continue;
            }

            let next = by_coords
                .get(&(
                    r#match.round + 1,
                    seeding::next_match_position(r#match.position),
                ))
                .copied();

            self.store.update_next_match(r#match.id, next)?;
        }

        Ok(())
    }

    /// Propagates the winner of every completed match into its next match
    /// until no slot changes anymore.
    ///
    /// A single pass handles the common case of round-1 byes; the rescan
    /// loop covers brackets where consecutive rounds resolve without a real
    /// contest.
    fn resolve_byes(&self, tournament: TournamentId) -> Result<()> {
        loop {
            let matches = self.store.matches_for_tournament(tournament)?;

            let by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id, m)).collect();

            let mut changed = false;
            for r#match in &matches {
                if !r#match.status.is_completed() {
                    continue;
                }

                let winner = match r#match.winner() {
                    Some(winner) => winner.clone(),
                    None => continue,
                };
                let next_id = match r#match.next_match {
                    Some(id) => id,
                    None => continue,
                };

                let slot = seeding::next_match_slot(r#match.position);
                let occupied = by_id
                    .get(&next_id)
                    .map_or(true, |next| next.slots[slot].is_some());
                if occupied {
                    continue;
                }

                self.advance_winner(r#match, winner)?;
                changed = true;
            }

            if !changed {
                return Ok(());
            }
        }
    }
}

/// Lays out every match of the bracket, without identities or links.
///
/// Participants are sorted by seed ascending and keyed by their rank after
/// sorting, so gaps in the raw seeds do not leave holes in the bracket.
/// Ranks beyond the participant count are byes.
fn plan_matches(tournament: TournamentId, participants: &[Participant]) -> Result<Vec<NewMatch>> {
    if participants.len() < 2 {
        return Err(Error::InvalidInput("at least 2 participants are required"));
    }

    let mut sorted: Vec<&Participant> = participants.iter().collect();
    for participant in &sorted {
        if participant.seed == 0 {
            return Err(Error::InvalidInput("seeds start at 1"));
        }
    }
    sorted.sort_by_key(|p| p.seed);
    if sorted.windows(2).any(|w| w[0].seed == w[1].seed) {
        return Err(Error::InvalidInput("duplicate seed"));
    }

    let by_rank: HashMap<u64, &Participant> = sorted
        .iter()
        .enumerate()
        .map(|(i, p)| ((i + 1) as u64, *p))
        .collect();

    let size = seeding::bracket_size(participants.len() as u64);
    let rounds = seeding::total_rounds(size);

    let mut matches = Vec::with_capacity((size - 1) as usize);

    for (i, (a, b)) in seeding::seed_pairings(size).into_iter().enumerate() {
        let slots = [
            by_rank.get(&a).map(|p| (*p).clone()),
            by_rank.get(&b).map(|p| (*p).clone()),
        ];

        let (status, outcome) = match (&slots[0], &slots[1]) {
            (Some(_), Some(_)) => (MatchStatus::Ready, Outcome::Undecided),
            // A bye completes immediately in favor of the real participant.
            (Some(p), None) | (None, Some(p)) => {
                (MatchStatus::Completed, Outcome::Decided { winner: p.id })
            }
            // Cannot occur: pairing seeds sum to size + 1, so at most one
            // side of a pairing is beyond the participant count.
            (None, None) => (MatchStatus::Pending, Outcome::Undecided),
        };

        matches.push(NewMatch {
            tournament_id: tournament,
            bracket: BracketType::Winners,
            round: 1,
            position: (i + 1) as u64,
            slots,
            status,
            outcome,
        });
    }

    for round in 2..=rounds {
        for position in 1..=seeding::matches_in_round(size, round) {
            matches.push(NewMatch {
                tournament_id: tournament,
                bracket: BracketType::Winners,
                round,
                position,
                slots: [None, None],
                status: MatchStatus::Pending,
                outcome: Outcome::Undecided,
            });
        }
    }

    Ok(matches)
}
