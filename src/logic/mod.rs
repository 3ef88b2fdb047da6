//! Bracket business logic: roster seeding, generation, advancement, state control.

mod advance;
mod bracket;
mod controller;
mod generate;
mod roster;
mod seeding;

pub use advance::{report_result, Advancement, ResultOutcome};
pub use bracket::{group_by_round, BracketRound, BracketView};
pub use controller::{advance_round, finalize};
pub use generate::{ensure_can_generate, generate_bracket, GeneratedBracket};
pub use roster::{parse_roster_csv, seed_order};
pub use seeding::{
    bracket_size, bye_positions, matches_in_round, pair_round_one, total_rounds, ByePolicy,
};
