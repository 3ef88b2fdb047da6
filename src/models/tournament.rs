//! Tournament, TournamentStatus, and the engine's error type.

use crate::models::game::MatchId;
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament and bracket operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Wrong status or format for this action, or the bracket already exists.
    #[error("Invalid state for this action: {0}")]
    InvalidState(&'static str),
    /// Fewer than two entrants on the roster.
    #[error("Need at least 2 participants to generate a bracket (have {have})")]
    InsufficientParticipants { have: usize },
    /// Tie or negative score.
    #[error("Invalid score: {0}")]
    InvalidScore(&'static str),
    /// A result was already recorded for this match.
    #[error("Match {0} is already completed")]
    AlreadyCompleted(MatchId),
    /// A concurrent write won; re-read and retry.
    #[error("Concurrent update detected, please retry")]
    ConcurrencyConflict,
    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    /// The same participant appears twice on the roster, or the username is taken.
    #[error("Participant {0} is already enrolled")]
    DuplicateParticipant(String),
    #[error("Tournament is full ({max} participants)")]
    TournamentFull { max: u32 },
    /// Roster import could not be parsed.
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),
    /// The persistence layer failed (e.g. a poisoned lock).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TournamentError {
    /// Only optimistic-lock losses are safe to retry without operator input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TournamentError::ConcurrencyConflict)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Competition format. Only `Bracket` tournaments get a single-elimination tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    Bracket,
    League,
}

/// Tournament lifecycle, in order. `Completed` is only reached through finalization.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentStatus {
    #[default]
    RegistrationOpen,
    Upcoming,
    Live,
    Completed,
}

/// Tournament-level state owned by the state controller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub max_participants: u32,
    pub current_participants: u32,
    /// Flips false -> true once, when round 1 is written.
    pub bracket_generated: bool,
    /// 0 until the bracket is generated.
    pub current_round: u32,
    pub total_rounds: u32,
    pub winner_id: Option<ParticipantId>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a tournament open for registration with no participants.
    pub fn new(name: impl Into<String>, format: TournamentFormat, max_participants: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            status: TournamentStatus::RegistrationOpen,
            max_participants,
            current_participants: 0,
            bracket_generated: false,
            current_round: 0,
            total_rounds: 0,
            winner_id: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Operator transition: registration-open -> upcoming -> live, forward only.
    pub fn set_status(&mut self, status: TournamentStatus) -> Result<(), TournamentError> {
        if status == TournamentStatus::Completed {
            return Err(TournamentError::InvalidState(
                "a tournament is completed only by its final match",
            ));
        }
        if status <= self.status {
            return Err(TournamentError::InvalidState("status can only move forward"));
        }
        self.status = status;
        Ok(())
    }

    /// Count one more confirmed entrant (only while registration is open).
    pub fn register_participant(&mut self) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::RegistrationOpen {
            return Err(TournamentError::InvalidState("registration is closed"));
        }
        if self.current_participants >= self.max_participants {
            return Err(TournamentError::TournamentFull {
                max: self.max_participants,
            });
        }
        self.current_participants += 1;
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }
}
