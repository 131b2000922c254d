use serde::{Deserialize, Serialize};

mod error;
mod generate;
mod map;
mod session;

#[cfg(any(test, feature = "test-helpers"))]
pub mod loader;

pub use error::*;
pub use generate::*;
pub use map::*;
pub use session::*;

pub type MovementCost = usize;
pub type RGB = (u8, u8, u8);

/// 不可通行地形的移動成本
pub const MAX_MOVEMENT_COST: MovementCost = 999;
/// 每回合行動點數
pub const MAX_TURN_POINTS: MovementCost = 3;
/// 每回合移動次數上限
pub const MAX_MOVES_PER_TURN: usize = 3;

#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}
