use serde::{Deserialize, Serialize};

use crate::{Heading, PlayerId, Position};

/// Fraction of the purchase price paid out when a plot is sold back
/// to the state: floor of 70%.
const SALE_NUMERATOR: i64 = 7;
const SALE_DENOMINATOR: i64 = 10;

/// Who owns a cell.
///
/// Replaces the `ownerId == 0` sentinel of the chat-bot era.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Unowned, or returned to state ownership after a sale.
    State,
    Player(PlayerId),
}

impl Ownership {
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            Ownership::State => None,
            Ownership::Player(id) => Some(id),
        }
    }

    pub fn is(&self, id: &PlayerId) -> bool {
        self.player() == Some(id)
    }
}

/// Side effect of a special cell, applied after settlement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Rent is recomputed as the sum of `land_cost` over every cell
    /// the landing player owns, overriding this cell's own value.
    TaxOffice,
    /// Send the player back against their current heading.
    GoBack(i32),
    /// Parsed and announced, but grants nothing. Kept as a marker
    /// until the game rules decide what an extra turn means.
    ExtraTurn,
    /// The player's next turn request is consumed without a roll.
    LoseTurn,
}

/// What a special effect does to the landing player, positionally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EffectOutcome {
    pub position: Position,
    pub skip_next_turn: bool,
}

impl Effect {
    /// Resolve the effect for a player standing at `position` facing
    /// `heading`. Tax office has no positional outcome; its charge is
    /// handled by settlement and this is never called for it.
    pub fn apply(self, position: Position, heading: Heading, size: i32) -> EffectOutcome {
        match self {
            Effect::GoBack(distance) => EffectOutcome {
                position: position.retreated(heading, distance, size),
                skip_next_turn: false,
            },
            Effect::LoseTurn => EffectOutcome {
                position,
                skip_next_turn: true,
            },
            Effect::TaxOffice | Effect::ExtraTurn => EffectOutcome {
                position,
                skip_next_turn: false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Normal,
    Special(Effect),
}

/// One plot on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub owner: Ownership,
    /// 0 means the cell can never be bought or sold.
    pub purchase_price: i64,
    /// Rent charged on landing. Negative values are a payout to the
    /// landing player.
    pub land_cost: i64,
    pub kind: CellKind,
    /// Flavor text shown when a special cell triggers.
    #[serde(default)]
    pub message: String,
}

impl Cell {
    pub fn sellable(&self) -> bool {
        self.purchase_price > 0
    }

    /// What the bank pays when this plot is sold back to the state.
    pub fn sale_value(&self) -> i64 {
        self.purchase_price * SALE_NUMERATOR / SALE_DENOMINATOR
    }

    pub fn effect(&self) -> Option<Effect> {
        match self.kind {
            CellKind::Normal => None,
            CellKind::Special(effect) => Some(effect),
        }
    }

    pub fn is_tax_office(&self) -> bool {
        self.effect() == Some(Effect::TaxOffice)
    }
}
