//! Tile board state.
//!
//! Twenty-five cells in row-major order, each empty or holding a positive
//! value. Tiles appear through [`TileBoard::spawn_tile`] (manually or from the
//! spawn cadence) and grow when two equal tiles are merged with
//! [`TileBoard::move_tile`].

use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cadence::SpawnCadence;
use crate::events::Event;

pub const BOARD_SIDE: usize = 5;
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;

/// Spawned tiles may exceed 1 only once some tile has reached this value.
const SPAWN_UNLOCK_VALUE: u32 = 3;

pub type Cell = Option<u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SpawnOutcome {
    Spawned { index: usize, value: u32 },
    /// No empty cell was left; the board is unchanged.
    BoardFull,
}

impl SpawnOutcome {
    pub fn event(&self, spawn_count: u64) -> Event {
        match *self {
            SpawnOutcome::Spawned { index, value } => Event::TileSpawned {
                index,
                value,
                spawn_count,
                at: Utc::now(),
            },
            SpawnOutcome::BoardFull => Event::BoardFull {
                spawn_count,
                at: Utc::now(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    OutOfRange,
    SameCell,
    EmptySource,
    ValueMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Target was empty; the tile moved without changing.
    Relocated { from: usize, to: usize, value: u32 },
    /// Target held the same value; it now holds `value` (the old value + 1).
    Merged { from: usize, to: usize, value: u32 },
    /// Nothing changed.
    Rejected {
        from: usize,
        to: usize,
        reason: MoveRejection,
    },
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, MoveOutcome::Rejected { .. })
    }

    pub fn event(&self) -> Event {
        let at = Utc::now();
        match *self {
            MoveOutcome::Relocated { from, to, value } => Event::TileMoved { from, to, value, at },
            MoveOutcome::Merged { from, to, value } => Event::TilesMerged { from, to, value, at },
            MoveOutcome::Rejected { from, to, reason } => Event::MoveRejected {
                from,
                to,
                reason,
                at,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileBoard {
    cells: [Cell; BOARD_CELLS],
    /// Spawn attempts since the last reset, including attempts on a full board.
    spawn_count: u64,
    cadence: SpawnCadence,
}

impl TileBoard {
    /// Empty board with the default ten second spawn cadence.
    pub fn new() -> Self {
        Self::with_cadence(SpawnCadence::default())
    }

    pub fn with_cadence(cadence: SpawnCadence) -> Self {
        Self {
            cells: [None; BOARD_CELLS],
            spawn_count: 0,
            cadence,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells.get(index).copied().flatten()
    }

    pub fn spawn_count(&self) -> u64 {
        self.spawn_count
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn empty_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.is_none().then_some(i))
            .collect()
    }

    /// Largest tile on the board, `None` when empty.
    pub fn max_value(&self) -> Option<u32> {
        self.cells.iter().flatten().copied().max()
    }

    pub fn cadence(&self) -> &SpawnCadence {
        &self.cadence
    }

    /// Progress towards the next automatic spawn, 0.0 ..= 100.0.
    pub fn progress_pct(&self) -> f64 {
        self.cadence.progress_pct()
    }

    pub fn snapshot(&self) -> Event {
        Event::BoardSnapshot {
            cells: self.cells.to_vec(),
            spawn_count: self.spawn_count,
            max_value: self.max_value(),
            progress_pct: self.progress_pct(),
            elapsed_ms: self.cadence.elapsed().as_millis() as u64,
            period_ms: self.cadence.period().as_millis() as u64,
            at: Utc::now(),
        }
    }

    /// Rows of the board for text rendering; `.` marks an empty cell.
    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .chunks(BOARD_SIDE)
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Some(v) => format!("{v:>3}"),
                        None => "  .".to_string(),
                    })
                    .collect::<String>()
            })
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Place a new tile on a random empty cell.
    ///
    /// Every call counts as a spawn and restarts the cadence, even when the
    /// board is full and nothing is placed.
    pub fn spawn_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SpawnOutcome {
        self.spawn_count += 1;
        self.cadence.reset();

        let empty = self.empty_indices();
        let Some(&index) = empty.choose(rng) else {
            info!(spawn_count = self.spawn_count, "board full, spawn skipped");
            return SpawnOutcome::BoardFull;
        };

        let unlocked = self.cells.iter().flatten().any(|v| *v >= SPAWN_UNLOCK_VALUE);
        let value = if unlocked {
            rng.gen_range(1..=SPAWN_UNLOCK_VALUE)
        } else {
            1
        };
        self.cells[index] = Some(value);
        debug!(index, value, spawn_count = self.spawn_count, "tile spawned");
        SpawnOutcome::Spawned { index, value }
    }

    /// Move the tile at `source` onto `target`.
    pub fn move_tile(&mut self, source: usize, target: usize) -> MoveOutcome {
        let rejected = |reason| MoveOutcome::Rejected {
            from: source,
            to: target,
            reason,
        };

        if source >= BOARD_CELLS || target >= BOARD_CELLS {
            return rejected(MoveRejection::OutOfRange);
        }
        if source == target {
            return rejected(MoveRejection::SameCell);
        }
        let Some(value) = self.cells[source] else {
            return rejected(MoveRejection::EmptySource);
        };

        let outcome = match self.cells[target] {
            None => {
                self.cells[target] = Some(value);
                MoveOutcome::Relocated {
                    from: source,
                    to: target,
                    value,
                }
            }
            Some(existing) if existing == value => {
                let merged = value.saturating_add(1);
                self.cells[target] = Some(merged);
                MoveOutcome::Merged {
                    from: source,
                    to: target,
                    value: merged,
                }
            }
            Some(_) => return rejected(MoveRejection::ValueMismatch),
        };
        self.cells[source] = None;
        debug!(?outcome, "tile moved");
        outcome
    }

    /// Feed elapsed time to the spawn cadence, spawning when it is due.
    pub fn advance<R: Rng + ?Sized>(&mut self, elapsed: Duration, rng: &mut R) -> Option<SpawnOutcome> {
        if self.cadence.advance(elapsed) {
            Some(self.spawn_tile(rng))
        } else {
            None
        }
    }

    /// Clear every cell, the spawn counter and the cadence.
    pub fn reset(&mut self) -> Event {
        self.cells = [None; BOARD_CELLS];
        self.spawn_count = 0;
        self.cadence.reset();
        debug!("board reset");
        Event::BoardReset { at: Utc::now() }
    }
}

impl Default for TileBoard {
    fn default() -> Self {
        Self::new()
    }
}
