//! Bracket generation: roster -> seeded round 1 with byes resolved.

use crate::logic::advance::{propagate_winner, settle_rounds};
use crate::logic::roster::seed_order;
use crate::logic::seeding::{pair_round_one, total_rounds, ByePolicy};
use crate::models::{
    GameMatch, ParticipantRef, Tournament, TournamentError, TournamentFormat, TournamentStatus,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

/// Matches written by generation and the bracket depth.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GeneratedBracket {
    pub matches: Vec<GameMatch>,
    pub total_rounds: u32,
}

/// Check that `tournament` may have its bracket generated now.
pub fn ensure_can_generate(tournament: &Tournament) -> Result<(), TournamentError> {
    if tournament.format != TournamentFormat::Bracket {
        return Err(TournamentError::InvalidState(
            "only Bracket format tournaments have a bracket",
        ));
    }
    if tournament.bracket_generated {
        return Err(TournamentError::InvalidState("bracket already generated"));
    }
    if tournament.status != TournamentStatus::Live {
        return Err(TournamentError::InvalidState("tournament must be live"));
    }
    Ok(())
}

/// Generate the bracket for a live Bracket-format tournament.
///
/// 1. Shuffle the roster into seed order.
/// 2. Pair into `next_power_of_two(n) / 2` round-1 matches; the top seeds get byes.
/// 3. Complete bye matches and propagate them, so next-round matches fed by two
///    byes already exist.
/// 4. Set `total_rounds`, `current_round = 1`, `bracket_generated = true`.
///
/// On error `tournament` is left untouched.
pub fn generate_bracket<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    roster: &[ParticipantRef],
    policy: ByePolicy,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<GeneratedBracket, TournamentError> {
    ensure_can_generate(tournament)?;
    if roster.len() < 2 {
        return Err(TournamentError::InsufficientParticipants { have: roster.len() });
    }

    let seeds = seed_order(roster, rng)?;
    let rounds = total_rounds(seeds.len());
    let participants = u32::try_from(seeds.len())
        .map_err(|_| TournamentError::InvalidRoster("too many participants".into()))?;

    let mut next = tournament.clone();
    next.current_participants = participants;
    next.total_rounds = rounds;
    next.current_round = 1;
    next.bracket_generated = true;

    let mut matches = pair_round_one(next.id, &seeds, policy);
    let round_one = matches.len();
    for idx in 0..round_one {
        if !matches[idx].is_bye() {
            continue;
        }
        matches[idx].complete_bye(now)?;
        propagate_winner(&next, &mut matches, idx)?;
    }
    settle_rounds(&mut next, &matches)?;

    *tournament = next;
    Ok(GeneratedBracket {
        matches,
        total_rounds: rounds,
    })
}
