//! Match (game) records of a single-elimination bracket.

use crate::models::participant::ParticipantId;
use crate::models::tournament::{TournamentError, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match a player sits on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    One,
    Two,
}

/// Lifecycle of a match: `Pending -> Completed`, one way.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Completed,
}

/// A single bracket match. A missing `player_2_id` is a bye.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-indexed round.
    pub round: u32,
    /// 1-indexed position within the round.
    pub match_number: u32,
    pub player_1_id: ParticipantId,
    pub player_2_id: Option<ParticipantId>,
    pub player_1_score: Option<u32>,
    pub player_2_score: Option<u32>,
    pub winner_id: Option<ParticipantId>,
    pub status: MatchStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    /// Create a pending match. Pass `None` as `player_2` for a bye.
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        match_number: u32,
        player_1: ParticipantId,
        player_2: Option<ParticipantId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            player_1_id: player_1,
            player_2_id: player_2,
            player_1_score: None,
            player_2_score: None,
            winner_id: None,
            status: MatchStatus::Pending,
            completed_at: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player_2_id.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Match number of the other half of this match's pairing.
    pub fn sibling_number(&self) -> u32 {
        if self.match_number % 2 == 1 {
            self.match_number + 1
        } else {
            self.match_number - 1
        }
    }

    /// Match number this match's winner plays in next round.
    pub fn next_match_number(&self) -> u32 {
        self.match_number.div_ceil(2)
    }

    /// Side the winner takes in the next round (lower feeder number is player 1).
    pub fn next_slot(&self) -> Slot {
        if self.match_number % 2 == 1 {
            Slot::One
        } else {
            Slot::Two
        }
    }

    /// Resolve a bye: the sole participant wins without a score.
    pub fn complete_bye(&mut self, now: DateTime<Utc>) -> Result<ParticipantId, TournamentError> {
        if self.is_completed() {
            return Err(TournamentError::AlreadyCompleted(self.id));
        }
        if !self.is_bye() {
            return Err(TournamentError::InvalidState("match has two players and needs a score"));
        }
        self.winner_id = Some(self.player_1_id);
        self.status = MatchStatus::Completed;
        self.completed_at = Some(now);
        Ok(self.player_1_id)
    }

    /// Record final scores and mark the match completed. Returns the winner.
    ///
    /// Scores must be non-negative and unequal; elimination play has no draws.
    pub fn record_scores(
        &mut self,
        score_1: i64,
        score_2: i64,
        now: DateTime<Utc>,
    ) -> Result<ParticipantId, TournamentError> {
        if self.is_completed() {
            return Err(TournamentError::AlreadyCompleted(self.id));
        }
        let opponent = self
            .player_2_id
            .ok_or(TournamentError::InvalidState("bye matches resolve without a score"))?;
        let (score_1, score_2) = match (u32::try_from(score_1), u32::try_from(score_2)) {
            (Ok(a), Ok(b)) => (a, b),
            _ => {
                return Err(TournamentError::InvalidScore(
                    "scores must be non-negative integers",
                ))
            }
        };
        if score_1 == score_2 {
            return Err(TournamentError::InvalidScore("draws are not allowed in elimination play"));
        }
        let winner = if score_1 > score_2 {
            self.player_1_id
        } else {
            opponent
        };
        self.player_1_score = Some(score_1);
        self.player_2_score = Some(score_2);
        self.winner_id = Some(winner);
        self.status = MatchStatus::Completed;
        self.completed_at = Some(now);
        Ok(winner)
    }
}
