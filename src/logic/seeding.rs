//! Bracket sizing and round-1 pairing, including bye placement.

use crate::models::{GameMatch, ParticipantId, TournamentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where round-1 byes go. Bye recipients are always the top seeds; the policy
/// only decides which matches they occupy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByePolicy {
    /// Byes fill matches 1..=byes.
    #[default]
    TopSeeds,
    /// Byes are spaced evenly across the round.
    Spread,
}

impl FromStr for ByePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-seeds" | "top_seeds" | "top" => Ok(ByePolicy::TopSeeds),
            "spread" | "even" => Ok(ByePolicy::Spread),
            other => Err(format!("unknown bye policy '{}'", other)),
        }
    }
}

impl fmt::Display for ByePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByePolicy::TopSeeds => write!(f, "top-seeds"),
            ByePolicy::Spread => write!(f, "spread"),
        }
    }
}

/// Slots in the first round: the next power of two at or above `participants`.
pub fn bracket_size(participants: usize) -> usize {
    participants.max(1).next_power_of_two()
}

/// Rounds needed to reduce `participants` to one champion.
pub fn total_rounds(participants: usize) -> u32 {
    bracket_size(participants).trailing_zeros()
}

/// Matches a full round `round` contains in a bracket of `total_rounds` rounds.
pub fn matches_in_round(total_rounds: u32, round: u32) -> usize {
    if round == 0 || round > total_rounds {
        return 0;
    }
    1usize << (total_rounds - round)
}

/// 0-indexed round-1 match positions that receive a bye.
pub fn bye_positions(policy: ByePolicy, match_count: usize, byes: usize) -> Vec<usize> {
    debug_assert!(byes < match_count);
    match policy {
        ByePolicy::TopSeeds => (0..byes).collect(),
        ByePolicy::Spread => (0..byes).map(|k| k * match_count / byes).collect(),
    }
}

/// Pair seeds (index 0 = seed 1) into round-1 matches numbered 1..=bracket_size/2.
///
/// The first `byes` seeds get a bye each; the rest are paired consecutively
/// into the remaining matches in order. Bye matches are returned pending.
pub fn pair_round_one(
    tournament_id: TournamentId,
    seeds: &[ParticipantId],
    policy: ByePolicy,
) -> Vec<GameMatch> {
    let size = bracket_size(seeds.len());
    let match_count = size / 2;
    let byes = size - seeds.len();

    let mut is_bye = vec![false; match_count];
    for pos in bye_positions(policy, match_count, byes) {
        is_bye[pos] = true;
    }

    let (bye_seeds, paired_seeds) = seeds.split_at(byes);
    let mut bye_seeds = bye_seeds.iter().copied();
    let mut pairs = paired_seeds.chunks_exact(2);

    let mut matches = Vec::with_capacity(match_count);
    for (idx, bye) in is_bye.into_iter().enumerate() {
        let number = idx as u32 + 1;
        let m = if bye {
            bye_seeds
                .next()
                .map(|p| GameMatch::new(tournament_id, 1, number, p, None))
        } else {
            pairs
                .next()
                .map(|pair| GameMatch::new(tournament_id, 1, number, pair[0], Some(pair[1])))
        };
        if let Some(m) = m {
            matches.push(m);
        }
    }
    matches
}
