//! Persistence seams: versioned documents and atomic conditional write batches.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    GameMatch, MatchId, ParticipantRef, Tournament, TournamentError, TournamentId,
};

/// A stored document and the version it was read at. Every write bumps the version.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub doc: T,
}

/// One write inside a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    /// Fails if the id already exists.
    CreateTournament(Tournament),
    /// Fails with a conflict unless the stored version is still `expected_version`.
    PutTournament {
        doc: Tournament,
        expected_version: u64,
    },
    /// Fails with a conflict if the id or its `(tournament, round, match_number)` slot is taken.
    CreateMatch(GameMatch),
    PutMatch {
        doc: GameMatch,
        expected_version: u64,
    },
    /// Append a confirmed participant to a tournament's roster.
    Enroll {
        tournament_id: TournamentId,
        participant: ParticipantRef,
    },
}

/// Writes applied all-or-nothing by [`BracketStore::commit`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_tournament(&mut self, doc: Tournament) -> &mut Self {
        self.writes.push(Write::CreateTournament(doc));
        self
    }

    /// Replace a tournament read at `read`'s version.
    pub fn put_tournament(&mut self, doc: Tournament, read: &Versioned<Tournament>) -> &mut Self {
        self.writes.push(Write::PutTournament {
            doc,
            expected_version: read.version,
        });
        self
    }

    pub fn create_match(&mut self, doc: GameMatch) -> &mut Self {
        self.writes.push(Write::CreateMatch(doc));
        self
    }

    /// Replace a match read at `expected_version`.
    pub fn put_match(&mut self, doc: GameMatch, expected_version: u64) -> &mut Self {
        self.writes.push(Write::PutMatch {
            doc,
            expected_version,
        });
        self
    }

    pub fn enroll(&mut self, tournament_id: TournamentId, participant: ParticipantRef) -> &mut Self {
        self.writes.push(Write::Enroll {
            tournament_id,
            participant,
        });
        self
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Document store for tournaments and matches.
pub trait BracketStore: Send + Sync {
    fn tournament(&self, id: TournamentId) -> Result<Versioned<Tournament>, TournamentError>;

    fn game_match(&self, id: MatchId) -> Result<Versioned<GameMatch>, TournamentError>;

    /// All matches of a tournament, in no particular order.
    fn matches(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<Versioned<GameMatch>>, TournamentError>;

    /// Apply every write or none. A stale version or a taken slot yields
    /// [`TournamentError::ConcurrencyConflict`].
    fn commit(&self, batch: WriteBatch) -> Result<(), TournamentError>;
}

/// Source of confirmed (paid) entrants for a tournament.
pub trait RosterProvider: Send + Sync {
    fn roster(&self, tournament_id: TournamentId) -> Result<Vec<ParticipantRef>, TournamentError>;
}
