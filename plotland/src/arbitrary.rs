use quickcheck::{Arbitrary, Gen};

use crate::{Heading, Position, Turn};

/// A position together with a board size that contains it.
#[derive(Clone, Debug)]
pub struct BoardedPosition {
    pub position: Position,
    pub size: i32,
}

impl Arbitrary for BoardedPosition {
    fn arbitrary(g: &mut Gen) -> Self {
        let size = 1 + (u8::arbitrary(g) % 8) as i32;
        let position = Position {
            x: 1 + (u8::arbitrary(g) as i32) % size,
            y: 1 + (u8::arbitrary(g) as i32) % size,
        };
        BoardedPosition { position, size }
    }
}

impl Arbitrary for Heading {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&[Heading::North, Heading::East, Heading::South, Heading::West])
            .unwrap()
    }
}

impl Arbitrary for Turn {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&Turn::ALL).unwrap()
    }
}
