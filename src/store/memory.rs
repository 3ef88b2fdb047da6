//! In-memory store: all documents behind one `RwLock`, batches validated then applied.

use super::{BracketStore, RosterProvider, Versioned, Write, WriteBatch};
use crate::models::{
    GameMatch, MatchId, ParticipantRef, Tournament, TournamentError, TournamentId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// `(tournament, round, match_number)`: at most one match per bracket position.
type SlotKey = (TournamentId, u32, u32);

#[derive(Default)]
struct Inner {
    tournaments: HashMap<TournamentId, Versioned<Tournament>>,
    matches: HashMap<MatchId, Versioned<GameMatch>>,
    slots: HashMap<SlotKey, MatchId>,
    rosters: HashMap<TournamentId, Vec<ParticipantRef>>,
}

/// Process-local [`BracketStore`] and [`RosterProvider`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

fn slot_of(m: &GameMatch) -> SlotKey {
    (m.tournament_id, m.round, m.match_number)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, TournamentError> {
        self.inner
            .read()
            .map_err(|_| TournamentError::Storage("lock error".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, TournamentError> {
        self.inner
            .write()
            .map_err(|_| TournamentError::Storage("lock error".into()))
    }

    /// Every tournament, newest first.
    pub fn tournaments(&self) -> Result<Vec<Tournament>, TournamentError> {
        let g = self.read()?;
        let mut all: Vec<_> = g.tournaments.values().map(|v| v.doc.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

/// Check a batch against the current state without touching it.
fn validate(inner: &Inner, writes: &[Write]) -> Result<(), TournamentError> {
    let mut new_tournaments = HashSet::new();
    let mut touched_tournaments = HashSet::new();
    let mut new_matches = HashSet::new();
    let mut touched_matches = HashSet::new();
    let mut new_slots = HashSet::new();
    let mut enrolled = HashSet::new();

    for w in writes {
        match w {
            Write::CreateTournament(t) => {
                if inner.tournaments.contains_key(&t.id) || !new_tournaments.insert(t.id) {
                    return Err(TournamentError::ConcurrencyConflict);
                }
            }
            Write::PutTournament {
                doc,
                expected_version,
            } => {
                let stored = inner
                    .tournaments
                    .get(&doc.id)
                    .ok_or(TournamentError::TournamentNotFound(doc.id))?;
                if stored.version != *expected_version || !touched_tournaments.insert(doc.id) {
                    log::debug!(
                        "stale tournament write {} (expected v{}, stored v{})",
                        doc.id,
                        expected_version,
                        stored.version
                    );
                    return Err(TournamentError::ConcurrencyConflict);
                }
            }
            Write::CreateMatch(m) => {
                let slot = slot_of(m);
                if inner.matches.contains_key(&m.id)
                    || inner.slots.contains_key(&slot)
                    || !new_matches.insert(m.id)
                    || !new_slots.insert(slot)
                {
                    log::debug!(
                        "match slot round {} #{} already taken in {}",
                        m.round,
                        m.match_number,
                        m.tournament_id
                    );
                    return Err(TournamentError::ConcurrencyConflict);
                }
                let known = inner.tournaments.contains_key(&m.tournament_id)
                    || new_tournaments.contains(&m.tournament_id);
                if !known {
                    return Err(TournamentError::TournamentNotFound(m.tournament_id));
                }
            }
            Write::PutMatch {
                doc,
                expected_version,
            } => {
                let stored = inner
                    .matches
                    .get(&doc.id)
                    .ok_or(TournamentError::MatchNotFound(doc.id))?;
                if stored.version != *expected_version || !touched_matches.insert(doc.id) {
                    return Err(TournamentError::ConcurrencyConflict);
                }
                if slot_of(&stored.doc) != slot_of(doc) {
                    return Err(TournamentError::InvalidState("a match cannot change position"));
                }
            }
            Write::Enroll {
                tournament_id,
                participant,
            } => {
                let known = inner.tournaments.contains_key(tournament_id)
                    || new_tournaments.contains(tournament_id);
                if !known {
                    return Err(TournamentError::TournamentNotFound(*tournament_id));
                }
                let already = inner
                    .rosters
                    .get(tournament_id)
                    .is_some_and(|r| r.iter().any(|p| p.id == participant.id));
                if already || !enrolled.insert((*tournament_id, participant.id)) {
                    return Err(TournamentError::DuplicateParticipant(
                        participant.username.clone(),
                    ));
                }
            }
        }
    }
    Ok(())
}

impl BracketStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> Result<Versioned<Tournament>, TournamentError> {
        self.read()?
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn game_match(&self, id: MatchId) -> Result<Versioned<GameMatch>, TournamentError> {
        self.read()?
            .matches
            .get(&id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(id))
    }

    fn matches(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<Versioned<GameMatch>>, TournamentError> {
        let g = self.read()?;
        Ok(g.matches
            .values()
            .filter(|m| m.doc.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), TournamentError> {
        let writes = batch.into_writes();
        let mut g = self.write()?;
        validate(&g, &writes)?;

        for w in writes {
            match w {
                Write::CreateTournament(doc) => {
                    g.rosters.entry(doc.id).or_default();
                    g.tournaments.insert(doc.id, Versioned { version: 1, doc });
                }
                Write::PutTournament { doc, .. } => {
                    if let Some(stored) = g.tournaments.get_mut(&doc.id) {
                        stored.version += 1;
                        stored.doc = doc;
                    }
                }
                Write::CreateMatch(doc) => {
                    g.slots.insert(slot_of(&doc), doc.id);
                    g.matches.insert(doc.id, Versioned { version: 1, doc });
                }
                Write::PutMatch { doc, .. } => {
                    if let Some(stored) = g.matches.get_mut(&doc.id) {
                        stored.version += 1;
                        stored.doc = doc;
                    }
                }
                Write::Enroll {
                    tournament_id,
                    participant,
                } => {
                    g.rosters.entry(tournament_id).or_default().push(participant);
                }
            }
        }
        Ok(())
    }
}

impl RosterProvider for MemoryStore {
    fn roster(&self, tournament_id: TournamentId) -> Result<Vec<ParticipantRef>, TournamentError> {
        let g = self.read()?;
        if !g.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::TournamentNotFound(tournament_id));
        }
        Ok(g.rosters.get(&tournament_id).cloned().unwrap_or_default())
    }
}
