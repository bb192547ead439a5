use std::collections::BTreeMap;

use crate::{Cell, PlayerId, Position};

/// Extra rent added per orthogonally adjacent cell with the same
/// owner, applied once when a plot is bought.
pub const ADJACENCY_BONUS: i64 = 2;

/// A read snapshot of the whole board.
///
/// The store is the source of truth; this type exists for the
/// cross-cutting computations that need to see every cell at once
/// (tax totals, adjacency bonuses, sale listings).
#[derive(Clone, Debug)]
pub struct Board {
    size: i32,
    cells: BTreeMap<Position, Cell>,
}

impl Board {
    pub fn new(size: i32, cells: BTreeMap<Position, Cell>) -> Self {
        Self { size, cells }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.cells.get(&position)
    }

    /// Every cell currently owned by `player`, in key order.
    pub fn owned_by<'a>(
        &'a self,
        player: &'a PlayerId,
    ) -> impl Iterator<Item = (Position, &'a Cell)> {
        self.cells
            .iter()
            .filter(move |(_, cell)| cell.owner.is(player))
            .map(|(&position, cell)| (position, cell))
    }

    /// Cells that `player` could sell, i.e. owned with a nonzero
    /// purchase price.
    pub fn sellable_by<'a>(
        &'a self,
        player: &'a PlayerId,
    ) -> impl Iterator<Item = (Position, &'a Cell)> {
        self.owned_by(player).filter(|(_, cell)| cell.sellable())
    }

    /// The tax-office charge: the sum of `land_cost` over every cell
    /// owned by `player`, regardless of the office's own rent value.
    pub fn tax_total(&self, player: &PlayerId) -> i64 {
        self.owned_by(player).map(|(_, cell)| cell.land_cost).sum()
    }

    /// Rent increase earned by buying `position`: [`ADJACENCY_BONUS`]
    /// per in-bounds orthogonal neighbor already owned by `player`.
    pub fn adjacency_bonus(&self, position: Position, player: &PlayerId) -> i64 {
        position
            .neighbors()
            .into_iter()
            .filter(|n| n.in_bounds(self.size))
            .filter(|n| self.cell(*n).is_some_and(|cell| cell.owner.is(player)))
            .count() as i64
            * ADJACENCY_BONUS
    }
}
