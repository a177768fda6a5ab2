use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerId;

/// Why a round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    /// Exactly one fighter is still on the platform.
    LastStanding,
    /// Every remaining fighter fell in the same frame.
    Draw,
    /// The round clock ran out.
    Timeout,
}

/// Discrete events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A countdown began on the named arena.
    CountdownStarted { round: u32, arena: String },
    /// The countdown finished; fighters may move.
    RoundStarted { round: u32, arena: String },
    /// A fighter fell off. `knocked_out_by` is the last player to hit them.
    PlayerEliminated {
        player_id: PlayerId,
        knocked_out_by: Option<PlayerId>,
    },
    RoundEnded {
        round: u32,
        reason: RoundEndReason,
        winner: Option<PlayerId>,
    },
    MatchEnded { winner: PlayerId },
}

impl GameEvent {
    /// Whether this event closes a round.
    pub fn is_round_end(&self) -> bool {
        matches!(self, Self::RoundEnded { .. })
    }
}
