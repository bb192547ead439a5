use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use plotland::{Cell, Ownership, Player, PlayerId, Position};

use crate::store::{Store, StoreError};

/// In-memory reference implementation of [`Store`].
///
/// Players and cells sit behind mutexes; the bank is a single atomic
/// counter so concurrent money movement never read-modify-writes.
#[derive(Debug)]
pub struct MemoryStore {
    players: Mutex<BTreeMap<PlayerId, Player>>,
    cells: Mutex<BTreeMap<Position, Cell>>,
    bank: AtomicI64,
}

impl MemoryStore {
    pub fn new(initial_bank: i64) -> Self {
        Self {
            players: Mutex::new(BTreeMap::new()),
            cells: Mutex::new(BTreeMap::new()),
            bank: AtomicI64::new(initial_bank),
        }
    }

    /// World setup: place a cell. Not part of the [`Store`] trait
    /// because the game never creates cells at runtime.
    pub fn put_cell(&self, position: Position, cell: Cell) {
        self.cells.lock().unwrap().insert(position, cell);
    }

    pub fn bank_balance(&self) -> i64 {
        self.bank.load(Ordering::SeqCst)
    }
}

impl Store for MemoryStore {
    fn player(&self, id: &PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.players.lock().unwrap().get(id).cloned())
    }

    fn put_player(&self, player: &Player) -> Result<(), StoreError> {
        self.players
            .lock()
            .unwrap()
            .insert(player.id.clone(), player.clone());
        Ok(())
    }

    fn delete_player(&self, id: &PlayerId) -> Result<(), StoreError> {
        self.players.lock().unwrap().remove(id);
        Ok(())
    }

    fn players(&self) -> Result<BTreeMap<PlayerId, Player>, StoreError> {
        Ok(self.players.lock().unwrap().clone())
    }

    fn cell(&self, position: Position) -> Result<Option<Cell>, StoreError> {
        Ok(self.cells.lock().unwrap().get(&position).cloned())
    }

    fn cells(&self) -> Result<BTreeMap<Position, Cell>, StoreError> {
        Ok(self.cells.lock().unwrap().clone())
    }

    fn update_cell(
        &self,
        position: Position,
        expected: &Ownership,
        owner: Ownership,
        land_cost: Option<i64>,
    ) -> Result<(), StoreError> {
        let mut cells = self.cells.lock().unwrap();
        let cell = cells
            .get_mut(&position)
            .ok_or(StoreError::CellMissing { position })?;
        if cell.owner != *expected {
            return Err(StoreError::OwnershipConflict { position });
        }
        cell.owner = owner;
        if let Some(land_cost) = land_cost {
            cell.land_cost = land_cost;
        }
        Ok(())
    }

    fn adjust_bank(&self, delta: i64) -> Result<i64, StoreError> {
        Ok(self.bank.fetch_add(delta, Ordering::SeqCst) + delta)
    }
}

#[cfg(test)]
mod tests {
    use plotland::CellKind;

    use super::*;

    fn state_cell() -> Cell {
        Cell {
            owner: Ownership::State,
            purchase_price: 100,
            land_cost: 10,
            kind: CellKind::Normal,
            message: String::new(),
        }
    }

    #[test]
    fn bank_may_go_negative() {
        let store = MemoryStore::new(50);
        assert_eq!(store.adjust_bank(-120), Ok(-70));
        assert_eq!(store.bank_balance(), -70);
        assert_eq!(store.adjust_bank(20), Ok(-50));
    }

    #[test]
    fn update_cell_is_conditional_on_the_owner() {
        let store = MemoryStore::new(0);
        let position = Position::new(1, 1);
        store.put_cell(position, state_cell());

        let p1 = Ownership::Player("p1".to_string());
        let p2 = Ownership::Player("p2".to_string());

        store
            .update_cell(position, &Ownership::State, p1.clone(), Some(14))
            .unwrap();
        // Second buyer expected the state to still own it.
        assert_eq!(
            store.update_cell(position, &Ownership::State, p2, None),
            Err(StoreError::OwnershipConflict { position })
        );

        let cell = store.cell(position).unwrap().unwrap();
        assert_eq!(cell.owner, p1);
        assert_eq!(cell.land_cost, 14);
    }

    #[test]
    fn update_cell_requires_the_cell_to_exist() {
        let store = MemoryStore::new(0);
        let position = Position::new(9, 9);
        assert_eq!(
            store.update_cell(position, &Ownership::State, Ownership::State, None),
            Err(StoreError::CellMissing { position })
        );
    }
}
