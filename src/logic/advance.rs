//! Round advancement: record a result and push winners into the next round.

use crate::logic::controller::{advance_round, finalize};
use crate::models::{GameMatch, MatchId, ParticipantId, Slot, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a completed match set in motion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Advancement {
    /// Next-round match created by this result; at most one.
    pub created: Vec<GameMatch>,
    /// Set when the completed match was the final.
    pub champion: Option<ParticipantId>,
}

/// Result of reporting a score.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResultOutcome {
    /// The reported match, now completed.
    #[serde(rename = "match")]
    pub updated: GameMatch,
    pub created: Vec<GameMatch>,
    pub champion: Option<ParticipantId>,
    pub round_advanced: bool,
}

/// Push the winner of `matches[completed]` forward.
///
/// Creates the next-round match once both feeders are completed. A missing or
/// pending sibling means the other half of the pairing is still being played,
/// so nothing happens yet. If the next match already exists this is a no-op.
/// Reaching the final round yields the champion.
pub(crate) fn propagate_winner(
    tournament: &Tournament,
    matches: &mut Vec<GameMatch>,
    completed: usize,
) -> Result<Advancement, TournamentError> {
    let mut advancement = Advancement::default();
    let m = &matches[completed];
    let winner = m
        .winner_id
        .ok_or(TournamentError::InvalidState("completed match has no winner"))?;
    if m.round >= tournament.total_rounds {
        advancement.champion = Some(winner);
        return Ok(advancement);
    }

    let (round, sibling_number) = (m.round, m.sibling_number());
    let (next_round, next_number, slot) = (m.round + 1, m.next_match_number(), m.next_slot());

    let exists = matches
        .iter()
        .any(|x| x.round == next_round && x.match_number == next_number);
    if exists {
        return Ok(advancement);
    }

    let sibling = matches
        .iter()
        .find(|x| x.round == round && x.match_number == sibling_number);
    let other = match sibling {
        Some(s) if s.is_completed() => s
            .winner_id
            .ok_or(TournamentError::InvalidState("completed match has no winner"))?,
        _ => return Ok(advancement),
    };
    let (p1, p2) = match slot {
        Slot::One => (winner, other),
        Slot::Two => (other, winner),
    };

    let next = GameMatch::new(tournament.id, next_round, next_number, p1, Some(p2));
    matches.push(next.clone());
    advancement.created.push(next);
    Ok(advancement)
}

/// Run round bookkeeping until the current round is no longer complete.
pub(crate) fn settle_rounds(
    tournament: &mut Tournament,
    matches: &[GameMatch],
) -> Result<bool, TournamentError> {
    let mut advanced = false;
    while advance_round(tournament, matches)? {
        advanced = true;
    }
    Ok(advanced)
}

/// Record a final score for a pending two-player match and advance the bracket.
///
/// `matches` is the tournament's full match list; created next-round matches
/// are appended to it. On the final match the tournament is finalized.
/// Nothing is mutated when an error is returned.
pub fn report_result(
    tournament: &mut Tournament,
    matches: &mut Vec<GameMatch>,
    match_id: MatchId,
    score_a: i64,
    score_b: i64,
    now: DateTime<Utc>,
) -> Result<ResultOutcome, TournamentError> {
    let idx = matches
        .iter()
        .position(|m| m.id == match_id && m.tournament_id == tournament.id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if matches[idx].is_completed() {
        return Err(TournamentError::AlreadyCompleted(match_id));
    }
    if !tournament.bracket_generated {
        return Err(TournamentError::InvalidState("bracket has not been generated"));
    }
    if tournament.is_completed() {
        return Err(TournamentError::InvalidState("tournament is already completed"));
    }

    let mut next_tournament = tournament.clone();
    let mut next_matches = matches.clone();
    next_matches[idx].record_scores(score_a, score_b, now)?;

    let advancement = propagate_winner(&next_tournament, &mut next_matches, idx)?;
    let round_advanced = match advancement.champion {
        Some(champion) => {
            finalize(&mut next_tournament, champion, now)?;
            false
        }
        None => settle_rounds(&mut next_tournament, &next_matches)?,
    };

    let updated = next_matches[idx].clone();
    *tournament = next_tournament;
    *matches = next_matches;

    Ok(ResultOutcome {
        updated,
        created: advancement.created,
        champion: advancement.champion,
        round_advanced,
    })
}
