use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use plotland::{Cell, CellKind, Effect, Heading, Ownership, Position};

/// Immutable game constants, loaded once at startup and passed
/// explicitly wherever they are needed.
///
/// Every field is required; a config file with a missing key fails
/// deserialization and the engine refuses to start.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    pub board_size: i32,
    pub initial_wallet: i64,
    pub initial_position: Position,
    pub initial_heading: Heading,
    pub initial_bank_balance: i64,
}

impl GameConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: GameConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.board_size < 1 {
            anyhow::bail!("board_size must be at least 1, got {}", self.board_size);
        }
        if !self.initial_position.in_bounds(self.board_size) {
            anyhow::bail!(
                "initial_position {} is outside the {1}x{1} board",
                self.initial_position,
                self.board_size,
            );
        }
        Ok(())
    }
}

impl Default for GameConfig {
    /// The fallback constants the original deployment seeds when no
    /// configuration exists yet.
    fn default() -> Self {
        Self {
            board_size: 3,
            initial_wallet: 300,
            initial_position: Position::new(2, 2),
            initial_heading: Heading::North,
            initial_bank_balance: 1000,
        }
    }
}

/// The world layout, created once at setup time. Cells are never
/// added or removed while the game runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardSetup {
    pub cells: Vec<CellSetup>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CellSetup {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub purchase_price: i64,
    #[serde(default)]
    pub land_cost: i64,
    #[serde(default)]
    pub special: Option<Effect>,
    #[serde(default)]
    pub message: String,
}

impl BoardSetup {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// A small 3x3 world for local play and tests: a couple of
    /// purchasable plots, a bonus cell, and one of each special.
    pub fn demo() -> Self {
        let plot = |x, y, price, rent| CellSetup {
            x,
            y,
            purchase_price: price,
            land_cost: rent,
            special: None,
            message: String::new(),
        };
        let special = |x, y, effect, message: &str| CellSetup {
            x,
            y,
            purchase_price: 0,
            land_cost: 0,
            special: Some(effect),
            message: message.to_string(),
        };
        Self {
            cells: vec![
                plot(1, 1, 100, 20),
                plot(2, 1, 80, 15),
                plot(1, 2, 120, 25),
                plot(2, 2, 0, 0),
                plot(3, 2, 90, 18),
                plot(1, 3, 0, -12),
                special(3, 1, Effect::TaxOffice, "You walked into the tax office!"),
                special(
                    2,
                    3,
                    Effect::GoBack(2),
                    "A dead end. You trudge back the way you came.",
                ),
                special(
                    3,
                    3,
                    Effect::LoseTurn,
                    "Quicksand! You will sit out your next turn.",
                ),
            ],
        }
    }

    pub fn build(&self) -> BTreeMap<Position, Cell> {
        self.cells
            .iter()
            .map(|setup| {
                (
                    Position::new(setup.x, setup.y),
                    Cell {
                        owner: Ownership::State,
                        purchase_price: setup.purchase_price,
                        land_cost: setup.land_cost,
                        kind: match setup.special {
                            None => CellKind::Normal,
                            Some(effect) => CellKind::Special(effect),
                        },
                        message: setup.message.clone(),
                    },
                )
            })
            .collect()
    }
}
