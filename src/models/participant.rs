//! Participant references: the opaque entrant token the engine pairs and advances.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in matches and as the champion id).
pub type ParticipantId = Uuid;

/// An entrant resolved from the roster: id plus display profile.
///
/// Bracket logic only ever looks at `id`; the profile is carried for rendering.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub id: ParticipantId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ParticipantRef {
    /// Create a participant with a fresh id and no avatar.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}
