//! Read-side view: matches grouped by round for rendering.

use crate::models::{GameMatch, Tournament};
use serde::Serialize;
use std::collections::BTreeMap;

/// One layer of the bracket, matches in `match_number` order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketRound {
    pub round: u32,
    pub matches: Vec<GameMatch>,
}

/// Tournament plus its bracket, rounds ascending.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketView {
    pub tournament: Tournament,
    pub rounds: Vec<BracketRound>,
}

/// Group matches by round (ascending), each round sorted by match number.
pub fn group_by_round(matches: Vec<GameMatch>) -> Vec<BracketRound> {
    let mut by_round: BTreeMap<u32, Vec<GameMatch>> = BTreeMap::new();
    for m in matches {
        by_round.entry(m.round).or_default().push(m);
    }
    by_round
        .into_iter()
        .map(|(round, mut matches)| {
            matches.sort_by_key(|m| m.match_number);
            BracketRound { round, matches }
        })
        .collect()
}
