use serde::{Deserialize, Serialize};

use crate::{Heading, Position};

/// Stable per-user identifier handed in by the transport layer.
pub type PlayerId = String;

/// Credit granted every [`BONUS_INTERVAL`]th completed turn.
pub const TURN_BONUS: i64 = 9;
pub const BONUS_INTERVAL: u32 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Playing,
    /// A record that exists but is not in the game. Stale records in
    /// the store are treated the same as absent ones.
    Idle,
}

/// One player's persisted state.
///
/// The record exists from the start command until elimination, at
/// which point it is deleted rather than flagged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub heading: Heading,
    pub wallet: i64,
    pub turns_played: u32,
    #[serde(default)]
    pub skip_next_turn: bool,
    pub status: PlayerStatus,
}

impl Player {
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    /// Whether the periodic bonus is due for the turn that was just
    /// completed. Never true before the first turn.
    pub fn bonus_due(&self) -> bool {
        self.turns_played > 0 && self.turns_played % BONUS_INTERVAL == 0
    }
}
