//! Fire-and-forget bracket events for downstream alerts.

use crate::models::{MatchId, ParticipantId, TournamentId};
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BracketEvent {
    BracketGenerated {
        tournament_id: TournamentId,
        total_rounds: u32,
    },
    MatchResultRecorded {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: ParticipantId,
    },
    RoundAdvanced {
        tournament_id: TournamentId,
        round: u32,
    },
    TournamentCompleted {
        tournament_id: TournamentId,
        winner_id: ParticipantId,
    },
}

/// Receives events after a write commits. Must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: BracketEvent);
}

/// Writes each event to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, event: BracketEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("event {}", json),
            Err(_) => log::info!("event {:?}", event),
        }
    }
}

/// Forwards events to an unbounded tokio channel; dropped silently if the receiver is gone.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: UnboundedSender<BracketEvent>,
}

impl ChannelSink {
    /// A sink plus the receiving end the caller drains.
    pub fn channel() -> (Self, UnboundedReceiver<BracketEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, event: BracketEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("notification receiver closed; event dropped");
        }
    }
}
