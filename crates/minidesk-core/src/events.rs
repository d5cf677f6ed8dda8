use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{Cell, MoveRejection};
use crate::cost::{CostBreakdown, CostInputs};
use crate::timer::{Durations, Mode};

/// Every state change of a widget produces an Event.
/// The presentation layer prints or polls them; snapshots carry full state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // ── Interval timer ───────────────────────────────────────────────
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// An interval ran out. The timer is paused on `next_mode`.
    TimerCompleted {
        mode: Mode,
        next_mode: Mode,
        completed_focus: u32,
        at: DateTime<Utc>,
    },
    ModeSelected {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        mode: Mode,
        minutes: u32,
        /// Remaining time was reloaded from the new duration.
        resynced: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        mode: Mode,
        label: String,
        description: String,
        rest: bool,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
        progress_ratio: f64,
        completed_focus: u32,
        durations: Durations,
        at: DateTime<Utc>,
    },

    // ── Tile board ───────────────────────────────────────────────────
    TileSpawned {
        index: usize,
        value: u32,
        spawn_count: u64,
        at: DateTime<Utc>,
    },
    /// A spawn was attempted on a full board; nothing changed.
    BoardFull {
        spawn_count: u64,
        at: DateTime<Utc>,
    },
    TileMoved {
        from: usize,
        to: usize,
        value: u32,
        at: DateTime<Utc>,
    },
    TilesMerged {
        from: usize,
        to: usize,
        value: u32,
        at: DateTime<Utc>,
    },
    MoveRejected {
        from: usize,
        to: usize,
        reason: MoveRejection,
        at: DateTime<Utc>,
    },
    BoardReset {
        at: DateTime<Utc>,
    },
    BoardSnapshot {
        cells: Vec<Cell>,
        spawn_count: u64,
        max_value: Option<u32>,
        progress_pct: f64,
        elapsed_ms: u64,
        period_ms: u64,
        at: DateTime<Utc>,
    },

    // ── Cost model ───────────────────────────────────────────────────
    CostSnapshot {
        inputs: CostInputs,
        months: u32,
        monthly_income: f64,
        breakdown: CostBreakdown,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant, as written in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::ModeSelected { .. } => "mode_selected",
            Event::DurationChanged { .. } => "duration_changed",
            Event::TimerReset { .. } => "timer_reset",
            Event::TimerSnapshot { .. } => "timer_snapshot",
            Event::TileSpawned { .. } => "tile_spawned",
            Event::BoardFull { .. } => "board_full",
            Event::TileMoved { .. } => "tile_moved",
            Event::TilesMerged { .. } => "tiles_merged",
            Event::MoveRejected { .. } => "move_rejected",
            Event::BoardReset { .. } => "board_reset",
            Event::BoardSnapshot { .. } => "board_snapshot",
            Event::CostSnapshot { .. } => "cost_snapshot",
        }
    }
}
