mod cadence;
mod grid;

pub use cadence::{SpawnCadence, BOARD_TICK, SPAWN_PERIOD};
pub use grid::{
    Cell, MoveOutcome, MoveRejection, SpawnOutcome, TileBoard, BOARD_CELLS, BOARD_SIDE,
};
