use crate::{Board, Cell, Ownership, PlayerId};

/// Where a landing charge is routed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payee {
    Owner(PlayerId),
    Bank,
}

/// The outcome of landing on a cell, before any money moves.
///
/// The service applies this plan against the store; assessment itself
/// is pure and touches nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// The player landed on their own plot. No charge.
    SelfOwned,
    /// Nothing to pay or receive. `tax` distinguishes a tax office
    /// visit with no holdings from plain neutral ground, for display.
    Free { tax: bool },
    /// `amount` is debited from the landing player and credited to
    /// `payee`. A negative amount is a bonus flowing the other way.
    Charge {
        amount: i64,
        payee: Payee,
        tax: bool,
    },
}

/// Assess what landing on `cell` costs `player`.
///
/// A tax office overrides the cell's own rent with the sum of
/// `land_cost` across every cell the player owns, which is why the
/// whole board is needed here.
pub fn assess(board: &Board, cell: &Cell, player: &PlayerId) -> Settlement {
    if cell.owner.is(player) {
        return Settlement::SelfOwned;
    }

    let tax = cell.is_tax_office();
    let amount = if tax {
        board.tax_total(player)
    } else {
        cell.land_cost
    };

    if amount == 0 {
        return Settlement::Free { tax };
    }

    let payee = match &cell.owner {
        Ownership::State => Payee::Bank,
        Ownership::Player(id) => Payee::Owner(id.clone()),
    };
    Settlement::Charge { amount, payee, tax }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{CellKind, Effect, Position};

    fn cell(owner: Ownership, land_cost: i64, kind: CellKind) -> Cell {
        Cell {
            owner,
            purchase_price: 100,
            land_cost,
            kind,
            message: String::new(),
        }
    }

    fn board_owned_by_p1(costs: &[i64]) -> Board {
        let mut cells = BTreeMap::new();
        for (i, &land_cost) in costs.iter().enumerate() {
            cells.insert(
                Position::new(i as i32 + 1, 1),
                cell(Ownership::Player("p1".to_string()), land_cost, CellKind::Normal),
            );
        }
        Board::new(5, cells)
    }

    #[test]
    fn own_plot_is_free() {
        let board = board_owned_by_p1(&[]);
        let own = cell(Ownership::Player("p1".to_string()), 50, CellKind::Normal);
        assert_eq!(assess(&board, &own, &"p1".to_string()), Settlement::SelfOwned);
    }

    #[test]
    fn rent_goes_to_the_owning_player() {
        let board = board_owned_by_p1(&[]);
        let theirs = cell(Ownership::Player("p2".to_string()), 50, CellKind::Normal);
        assert_eq!(
            assess(&board, &theirs, &"p1".to_string()),
            Settlement::Charge {
                amount: 50,
                payee: Payee::Owner("p2".to_string()),
                tax: false,
            }
        );
    }

    #[test]
    fn negative_rent_is_a_bonus_from_the_bank() {
        let board = board_owned_by_p1(&[]);
        let bonus = cell(Ownership::State, -25, CellKind::Normal);
        assert_eq!(
            assess(&board, &bonus, &"p1".to_string()),
            Settlement::Charge {
                amount: -25,
                payee: Payee::Bank,
                tax: false,
            }
        );
    }

    #[test]
    fn tax_office_overrides_its_own_rent() {
        let board = board_owned_by_p1(&[12, 8]);
        // The office's stored land_cost must be ignored.
        let office = cell(Ownership::State, 999, CellKind::Special(Effect::TaxOffice));
        assert_eq!(
            assess(&board, &office, &"p1".to_string()),
            Settlement::Charge {
                amount: 20,
                payee: Payee::Bank,
                tax: true,
            }
        );
    }

    #[test]
    fn tax_office_is_free_without_holdings() {
        let board = board_owned_by_p1(&[]);
        let office = cell(Ownership::State, 999, CellKind::Special(Effect::TaxOffice));
        assert_eq!(
            assess(&board, &office, &"p1".to_string()),
            Settlement::Free { tax: true }
        );
    }

    #[test]
    fn neutral_ground_is_free() {
        let board = board_owned_by_p1(&[]);
        let neutral = cell(Ownership::State, 0, CellKind::Normal);
        assert_eq!(
            assess(&board, &neutral, &"p1".to_string()),
            Settlement::Free { tax: false }
        );
    }
}
