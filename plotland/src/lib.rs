pub use board::*;
pub use cell::*;
pub use grid::*;
pub use player::*;
pub use protocol::*;
pub use settle::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod cell;
mod grid;
mod player;
mod protocol;
mod settle;
