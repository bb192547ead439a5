use serde::{Deserialize, Serialize};

/// A coordinate on the board, with both axes in `[1, size]`.
///
/// Doubles as the key for board cells, replacing stringly
/// `"x_y"` identifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self, size: i32) -> bool {
        (1..=size).contains(&self.x) && (1..=size).contains(&self.y)
    }

    /// Clamp each axis independently into `[1, size]`.
    ///
    /// Overshooting the edge stops the player at the boundary rather
    /// than wrapping around. This is a rule of the game, not a fixup.
    pub fn clamped(self, size: i32) -> Self {
        Self {
            x: self.x.clamp(1, size),
            y: self.y.clamp(1, size),
        }
    }

    /// Move `steps` cells along `heading`, clamped to the board.
    pub fn advanced(self, heading: Heading, steps: i32, size: i32) -> Self {
        let (dx, dy) = heading.vector();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
        .clamped(size)
    }

    /// Move `distance` cells *against* `heading`, clamped to the board.
    ///
    /// Used by the go-back cell effect.
    pub fn retreated(self, heading: Heading, distance: i32, size: i32) -> Self {
        let (dx, dy) = heading.vector();
        Self {
            x: self.x - dx * distance,
            y: self.y - dy * distance,
        }
        .clamped(size)
    }

    /// The four orthogonal neighbors, without bounds filtering.
    pub fn neighbors(self) -> [Position; 4] {
        [
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
        ]
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four compass headings a player can face.
///
/// North is +y, east is +x.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub fn vector(self) -> (i32, i32) {
        match self {
            Heading::North => (0, 1),
            Heading::East => (1, 0),
            Heading::South => (0, -1),
            Heading::West => (-1, 0),
        }
    }

    /// The heading after applying a turn choice.
    pub fn turned(self, turn: Turn) -> Heading {
        match turn {
            Turn::Straight => self,
            Turn::Right => self.clockwise(),
            Turn::Left => self.clockwise().opposite(),
            Turn::Back => self.opposite(),
        }
    }

    fn clockwise(self) -> Heading {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    fn opposite(self) -> Heading {
        self.clockwise().clockwise()
    }

    pub fn arrow(self) -> char {
        match self {
            Heading::North => '⬆',
            Heading::East => '➡',
            Heading::South => '⬇',
            Heading::West => '⬅',
        }
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Heading::North => "NORTH",
            Heading::East => "EAST",
            Heading::South => "SOUTH",
            Heading::West => "WEST",
        };
        write!(f, "{} {}", name, self.arrow())
    }
}

/// Roll the step die: one or two cells per move.
pub fn roll_steps<R: rand::Rng>(rng: &mut R) -> i32 {
    rng.gen_range(1..=2)
}

/// The turn choice rolled at the start of a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Turn {
    Right,
    Left,
    Straight,
    Back,
}

impl Turn {
    pub const ALL: [Turn; 4] = [Turn::Right, Turn::Left, Turn::Straight, Turn::Back];

    /// A uniformly random turn choice.
    pub fn roll<R: rand::Rng>(rng: &mut R) -> Turn {
        Turn::ALL[rng.gen_range(0..Turn::ALL.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            Turn::Right => "right",
            Turn::Left => "left",
            Turn::Straight => "straight ahead",
            Turn::Back => "around",
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::BoardedPosition;

    quickcheck! {
        fn turn_table_is_total(heading: Heading, turn: Turn) -> bool {
            let new = heading.turned(turn);
            [Heading::North, Heading::East, Heading::South, Heading::West].contains(&new)
        }

        fn back_twice_is_identity(heading: Heading) -> bool {
            heading.turned(Turn::Back).turned(Turn::Back) == heading
        }

        fn left_is_inverse_of_right(heading: Heading) -> bool {
            heading.turned(Turn::Right).turned(Turn::Left) == heading
        }

        fn movement_stays_in_bounds(start: BoardedPosition, heading: Heading, extra_steps: u8) -> bool {
            let BoardedPosition { position, size } = start;
            let steps = 1 + (extra_steps % 2) as i32;
            position.advanced(heading, steps, size).in_bounds(size)
                && position.retreated(heading, steps, size).in_bounds(size)
        }
    }

    #[test]
    fn straight_north_moves_up() {
        let pos = Position::new(2, 2);
        let heading = Heading::North.turned(Turn::Straight);
        assert_eq!(heading, Heading::North);
        assert_eq!(pos.advanced(heading, 1, 3), Position::new(2, 3));
    }

    #[test]
    fn clamps_at_western_edge() {
        // boardSize = 3, already on the edge, two steps west
        let pos = Position::new(1, 1);
        assert_eq!(pos.advanced(Heading::West, 2, 3), Position::new(1, 1));
    }

    #[test]
    fn clamps_partially_when_overshooting() {
        let pos = Position::new(2, 2);
        assert_eq!(pos.advanced(Heading::North, 2, 3), Position::new(2, 3));
    }

    #[test]
    fn retreat_clamps_like_advance() {
        let pos = Position::new(1, 2);
        assert_eq!(pos.retreated(Heading::East, 5, 3), Position::new(1, 2));
    }
}
