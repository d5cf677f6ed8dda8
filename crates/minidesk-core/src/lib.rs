//! # minidesk Core Library
//!
//! State machines behind three small desk widgets, kept free of any
//! rendering concern. A presentation layer (the `minidesk` CLI in this
//! workspace) polls snapshots and dispatches intents.
//!
//! ## Architecture
//!
//! - **Cost model**: pure derivation of monthly and total living costs
//! - **Tile board**: 5x5 merge game with a periodic spawn cadence
//! - **Interval timer**: focus/rest countdown cycling modes at zero
//! - **Drivers**: cancellable tokio tickers that feed the board and the
//!   timer from a real clock
//!
//! The widgets are plain owned values with mutator methods. They never read
//! the clock and take their random source as a parameter, so every
//! transition is deterministic under test.
//!
//! ## Key Components
//!
//! - [`CostModel`]: living-cost calculator
//! - [`TileBoard`]: tile grid and spawn policy
//! - [`IntervalTimer`]: countdown state machine
//! - [`TimerDriver`] / [`BoardDriver`]: clock-driven composition
//! - [`Config`]: application configuration management

pub mod board;
pub mod config;
pub mod cost;
pub mod driver;
pub mod error;
pub mod events;
pub mod timer;

pub use board::{MoveOutcome, MoveRejection, SpawnCadence, SpawnOutcome, TileBoard};
pub use config::Config;
pub use cost::{Balance, CostBreakdown, CostField, CostInputs, CostModel};
pub use driver::{BoardDriver, TickHandle, TimerDriver};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use timer::{Durations, IntervalTimer, Mode};
