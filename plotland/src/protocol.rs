use serde::{Deserialize, Serialize};

use crate::{PlayerId, Position};

/// The synchronous result of one player action, handed back to the
/// transport layer for delivery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reply {
    /// Message for the acting player.
    pub message: String,
    /// Messages for everyone else, delivered best-effort.
    pub notices: Vec<Notice>,
}

impl Reply {
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notices: Vec::new(),
        }
    }
}

/// An outbound message to players other than the acting one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Addressed to a single player, e.g. a rent payment receipt.
    Direct { player: PlayerId, text: String },
    /// For every active player except `except`.
    Broadcast { except: PlayerId, text: String },
}

/// One entry in the sell list shown to a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellOffer {
    pub position: Position,
    /// What the bank would pay right now.
    pub estimated_price: i64,
}
