//! Participant roster: CSV import and the randomized seed order used for the draw.

use crate::models::{ParticipantId, ParticipantRef, TournamentError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::io;

#[derive(Deserialize)]
struct RosterRow {
    username: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

/// Parse a roster CSV with a `username[,avatar_url]` header into fresh participants.
pub fn parse_roster_csv<R: io::Read>(reader: R) -> Result<Vec<ParticipantRef>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut participants = Vec::new();
    for (line, row) in rdr.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(|e| TournamentError::InvalidRoster(e.to_string()))?;
        if row.username.is_empty() {
            // +2: header line, then 1-indexed rows
            return Err(TournamentError::InvalidRoster(format!(
                "empty username on line {}",
                line + 2
            )));
        }
        let mut participant = ParticipantRef::new(row.username);
        if let Some(avatar) = row.avatar_url.filter(|a| !a.is_empty()) {
            participant = participant.with_avatar(avatar);
        }
        participants.push(participant);
    }
    Ok(participants)
}

/// Resolve the roster to ids and shuffle them into seed order (index 0 = seed 1).
///
/// Rejects a roster that lists the same participant twice.
pub fn seed_order<R: Rng + ?Sized>(
    roster: &[ParticipantRef],
    rng: &mut R,
) -> Result<Vec<ParticipantId>, TournamentError> {
    let mut seen = HashSet::with_capacity(roster.len());
    let mut ids = Vec::with_capacity(roster.len());
    for p in roster {
        if !seen.insert(p.id) {
            return Err(TournamentError::DuplicateParticipant(p.id.to_string()));
        }
        ids.push(p.id);
    }
    ids.shuffle(rng);
    Ok(ids)
}
