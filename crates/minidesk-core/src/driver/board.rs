use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;

use super::lock;
use super::ticker::{spawn_periodic, TickHandle};
use crate::board::{TileBoard, BOARD_TICK};
use crate::events::Event;

struct BoardShared<R> {
    board: TileBoard,
    rng: R,
    generation: u64,
    ticker: Option<TickHandle>,
}

/// Owns a [`TileBoard`] with its random source and feeds the spawn cadence
/// from a periodic ticker.
///
/// Automatic spawns are sent on the channel returned from
/// [`BoardDriver::new`]; user commands return their event directly.
/// Must be used from within a tokio runtime.
pub struct BoardDriver<R> {
    shared: Arc<Mutex<BoardShared<R>>>,
    events: mpsc::UnboundedSender<Event>,
    tick: Duration,
}

impl<R> BoardDriver<R>
where
    R: Rng + Send + 'static,
{
    /// Driver ticking every [`BOARD_TICK`]. The cadence is not started.
    pub fn new(board: TileBoard, rng: R) -> (Self, mpsc::UnboundedReceiver<Event>) {
        Self::with_tick(board, rng, BOARD_TICK)
    }

    pub fn with_tick(
        board: TileBoard,
        rng: R,
        tick: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let driver = Self {
            shared: Arc::new(Mutex::new(BoardShared {
                board,
                rng,
                generation: 0,
                ticker: None,
            })),
            events,
            tick: tick.max(Duration::from_millis(1)),
        };
        (driver, rx)
    }

    pub fn read<T>(&self, f: impl FnOnce(&TileBoard) -> T) -> T {
        f(&lock(&self.shared).board)
    }

    pub fn snapshot(&self) -> Event {
        self.read(TileBoard::snapshot)
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.shared)
            .ticker
            .as_ref()
            .is_some_and(TickHandle::is_active)
    }

    /// Start (or restart) the spawn cadence.
    pub fn start(&self) {
        let mut shared = lock(&self.shared);
        stop_ticker(&mut shared);
        let generation = shared.generation;
        shared.ticker = Some(self.spawn_ticker(generation));
        debug!(generation, "board ticker started");
    }

    pub fn stop(&self) {
        let mut shared = lock(&self.shared);
        stop_ticker(&mut shared);
    }

    /// Spawn now. Restarts the cadence progress like an automatic spawn.
    pub fn spawn_tile(&self) -> Event {
        let mut guard = lock(&self.shared);
        let shared = &mut *guard;
        let outcome = shared.board.spawn_tile(&mut shared.rng);
        outcome.event(shared.board.spawn_count())
    }

    pub fn move_tile(&self, source: usize, target: usize) -> Event {
        lock(&self.shared).board.move_tile(source, target).event()
    }

    /// Clear the board. A running cadence is restarted from zero.
    pub fn reset(&self) -> Event {
        let was_ticking = self.is_ticking();
        self.stop();
        let event = lock(&self.shared).board.reset();
        if was_ticking {
            self.start();
        }
        event
    }

    fn spawn_ticker(&self, generation: u64) -> TickHandle {
        let weak: Weak<Mutex<BoardShared<R>>> = Arc::downgrade(&self.shared);
        let events = self.events.clone();
        let tick = self.tick;

        spawn_periodic(tick, move || {
            let Some(shared) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let mut guard = lock(&shared);
            if guard.generation != generation {
                return ControlFlow::Break(());
            }
            let state = &mut *guard;
            if let Some(outcome) = state.board.advance(tick, &mut state.rng) {
                let _ = events.send(outcome.event(state.board.spawn_count()));
            }
            ControlFlow::Continue(())
        })
    }
}

impl<R> Drop for BoardDriver<R> {
    fn drop(&mut self) {
        let mut shared = lock(&self.shared);
        stop_ticker(&mut shared);
    }
}

fn stop_ticker<R>(shared: &mut BoardShared<R>) {
    if let Some(handle) = shared.ticker.take() {
        shared.generation += 1;
        handle.cancel();
        debug!(generation = shared.generation, "board ticker stopped");
    }
}
