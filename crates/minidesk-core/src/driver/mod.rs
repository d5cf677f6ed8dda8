//! Clock-driven composition of the widgets.
//!
//! The widgets themselves only expose pure entry points (`tick()`,
//! `advance()`). The drivers here own a widget behind a mutex together with a
//! cancellable periodic task, and check a generation counter under that
//! mutex so a stopped ticker never mutates state, even if its tick was
//! already due.

mod board;
mod ticker;
mod timer;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use board::BoardDriver;
pub use ticker::{spawn_periodic, TickHandle};
pub use timer::{TimerDriver, TIMER_TICK};

/// Widget state stays consistent across a panicking holder, so poisoning is
/// ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
