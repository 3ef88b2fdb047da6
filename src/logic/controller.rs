//! Tournament state controller: round bookkeeping and finalization.

use crate::logic::seeding::matches_in_round;
use crate::models::{GameMatch, ParticipantId, Tournament, TournamentError, TournamentStatus};
use chrono::{DateTime, Utc};

fn ensure_in_progress(tournament: &Tournament) -> Result<(), TournamentError> {
    if !tournament.bracket_generated {
        return Err(TournamentError::InvalidState("bracket has not been generated"));
    }
    if tournament.is_completed() {
        return Err(TournamentError::InvalidState("tournament is already completed"));
    }
    Ok(())
}

/// Move `current_round` forward by one if the current round is finished.
///
/// Requires every match of the current round to be completed and the whole
/// next round to exist. Never creates matches. Returns whether it advanced.
pub fn advance_round(
    tournament: &mut Tournament,
    matches: &[GameMatch],
) -> Result<bool, TournamentError> {
    ensure_in_progress(tournament)?;
    let round = tournament.current_round;
    if round >= tournament.total_rounds {
        return Ok(false);
    }

    let mut played = 0;
    let mut next = 0;
    for m in matches.iter().filter(|m| m.tournament_id == tournament.id) {
        if m.round == round {
            if !m.is_completed() {
                return Ok(false);
            }
            played += 1;
        } else if m.round == round + 1 {
            next += 1;
        }
    }
    if played != matches_in_round(tournament.total_rounds, round)
        || next != matches_in_round(tournament.total_rounds, round + 1)
    {
        return Ok(false);
    }

    tournament.current_round = round + 1;
    Ok(true)
}

/// Close the tournament with its champion. Terminal.
pub fn finalize(
    tournament: &mut Tournament,
    winner_id: ParticipantId,
    now: DateTime<Utc>,
) -> Result<(), TournamentError> {
    ensure_in_progress(tournament)?;
    tournament.status = TournamentStatus::Completed;
    tournament.winner_id = Some(winner_id);
    tournament.completed_at = Some(now);
    Ok(())
}
