use std::collections::BTreeMap;

use plotland::{Cell, Ownership, Player, PlayerId, Position};

/// The persistence seam consumed by the game service.
///
/// Implementations must make [`Store::adjust_bank`] an atomic
/// increment (the bank counter is raced by concurrent buys and
/// sells) and [`Store::update_cell`] a compare-and-set on the owner,
/// so ownership is re-validated immediately before the write.
pub trait Store: Send + Sync {
    fn player(&self, id: &PlayerId) -> Result<Option<Player>, StoreError>;

    fn put_player(&self, player: &Player) -> Result<(), StoreError>;

    fn delete_player(&self, id: &PlayerId) -> Result<(), StoreError>;

    /// All player records, for broadcast targeting.
    fn players(&self) -> Result<BTreeMap<PlayerId, Player>, StoreError>;

    fn cell(&self, position: Position) -> Result<Option<Cell>, StoreError>;

    fn cells(&self) -> Result<BTreeMap<Position, Cell>, StoreError>;

    /// Transfer ownership of a cell, conditional on its current
    /// owner still being `expected`. `land_cost`, when given, is
    /// written in the same update.
    fn update_cell(
        &self,
        position: Position,
        expected: &Ownership,
        owner: Ownership,
        land_cost: Option<i64>,
    ) -> Result<(), StoreError>;

    /// Atomically apply `delta` to the bank balance and return the
    /// result. The balance is explicitly allowed to go negative.
    fn adjust_bank(&self, delta: i64) -> Result<i64, StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// A transient fault of the backing store.
    Unavailable(String),
    /// The conditional ownership write found a different owner.
    OwnershipConflict { position: Position },
    CellMissing { position: Position },
}

impl std::error::Error for StoreError {}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(reason) => {
                write!(f, "The game store is unavailable: {}", reason)
            }
            StoreError::OwnershipConflict { position } => {
                write!(f, "Ownership of cell {} changed underneath the update", position)
            }
            StoreError::CellMissing { position } => {
                write!(f, "Cell {} does not exist in the store", position)
            }
        }
    }
}
