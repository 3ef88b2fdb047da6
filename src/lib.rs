//! Esports tournament platform: single-elimination bracket engine with models,
//! bracket logic, a versioned store, and a service layer for the web API.

pub mod config;
pub mod logic;
pub mod models;
pub mod notify;
pub mod service;
pub mod store;

pub use config::{EngineConfig, ServerConfig};
pub use logic::{
    advance_round, bracket_size, finalize, generate_bracket, group_by_round, report_result,
    total_rounds, BracketRound, BracketView, ByePolicy, GeneratedBracket, ResultOutcome,
};
pub use models::{
    GameMatch, MatchId, MatchStatus, ParticipantId, ParticipantRef, Slot, Tournament,
    TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
pub use notify::{BracketEvent, ChannelSink, LogSink, NotificationSink};
pub use service::BracketService;
pub use store::{BracketStore, MemoryStore, RosterProvider, Versioned, WriteBatch};
