//! Data structures for the bracket engine: participants, matches, tournament state.

mod game;
mod participant;
mod tournament;

pub use game::{GameMatch, MatchId, MatchStatus, Slot};
pub use participant::{ParticipantId, ParticipantRef};
pub use tournament::{
    Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
