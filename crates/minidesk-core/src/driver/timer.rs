use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::lock;
use super::ticker::{spawn_periodic, TickHandle};
use crate::events::Event;
use crate::timer::{IntervalTimer, Mode};

/// Wall-clock period between timer ticks.
pub const TIMER_TICK: Duration = Duration::from_secs(1);

struct TimerShared {
    timer: IntervalTimer,
    /// Bumped whenever the ticker is stopped; stale tickers see a mismatch
    /// under the lock and exit without touching the timer.
    generation: u64,
    /// Handle tagged with the generation it was spawned for.
    ticker: Option<(u64, TickHandle)>,
}

impl TimerShared {
    /// A ticker whose tick already ended the interval has a stale generation
    /// even while its task is still unwinding.
    fn has_live_ticker(&self) -> bool {
        self.ticker.as_ref().is_some_and(|(generation, handle)| {
            *generation == self.generation && handle.is_active()
        })
    }
}

/// Owns an [`IntervalTimer`] and a one second ticker that runs exactly while
/// the timer is running.
///
/// Commands return their event directly. Events produced by ticks (interval
/// completion) are sent on the channel returned from [`TimerDriver::new`].
/// Must be used from within a tokio runtime.
pub struct TimerDriver {
    shared: Arc<Mutex<TimerShared>>,
    events: mpsc::UnboundedSender<Event>,
    period: Duration,
}

impl TimerDriver {
    pub fn new(timer: IntervalTimer) -> (Self, mpsc::UnboundedReceiver<Event>) {
        Self::with_period(timer, TIMER_TICK)
    }

    pub fn with_period(
        timer: IntervalTimer,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let driver = Self {
            shared: Arc::new(Mutex::new(TimerShared {
                timer,
                generation: 0,
                ticker: None,
            })),
            events,
            period,
        };
        let running = driver.read(IntervalTimer::is_running);
        if running {
            driver.apply(|_| ());
        }
        (driver, rx)
    }

    /// Read the timer under the lock.
    pub fn read<T>(&self, f: impl FnOnce(&IntervalTimer) -> T) -> T {
        f(&lock(&self.shared).timer)
    }

    pub fn snapshot(&self) -> Event {
        self.read(IntervalTimer::snapshot)
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.shared).has_live_ticker()
    }

    pub fn toggle_run(&self) -> Event {
        self.apply(IntervalTimer::toggle_run)
    }

    pub fn start(&self) -> Option<Event> {
        self.apply(IntervalTimer::start)
    }

    pub fn pause(&self) -> Option<Event> {
        self.apply(IntervalTimer::pause)
    }

    pub fn select_mode(&self, mode: Mode) -> Event {
        self.apply(|t| t.select_mode(mode))
    }

    pub fn set_duration(&self, mode: Mode, minutes: i64) -> Event {
        self.apply(|t| t.set_duration(mode, minutes))
    }

    pub fn reset(&self) -> Event {
        self.apply(IntervalTimer::reset)
    }

    /// Stop ticking without changing the timer state.
    pub fn shutdown(&self) {
        let mut shared = lock(&self.shared);
        stop_ticker(&mut shared);
    }

    /// Run a mutation, then start or stop the ticker to match `is_running`.
    fn apply<T>(&self, f: impl FnOnce(&mut IntervalTimer) -> T) -> T {
        let mut shared = lock(&self.shared);
        let out = f(&mut shared.timer);
        let running = shared.timer.is_running();

        if running && !shared.has_live_ticker() {
            stop_ticker(&mut shared);
            let generation = shared.generation;
            shared.ticker = Some((generation, self.spawn_ticker(generation)));
            debug!(generation, "timer ticker started");
        } else if !running {
            stop_ticker(&mut shared);
        }
        out
    }

    fn spawn_ticker(&self, generation: u64) -> TickHandle {
        let weak: Weak<Mutex<TimerShared>> = Arc::downgrade(&self.shared);
        let events = self.events.clone();

        spawn_periodic(self.period, move || {
            let Some(shared) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let mut shared = lock(&shared);
            if shared.generation != generation || !shared.timer.is_running() {
                return ControlFlow::Break(());
            }
            if let Some(event) = shared.timer.tick() {
                let _ = events.send(event);
            }
            if shared.timer.is_running() {
                ControlFlow::Continue(())
            } else {
                shared.generation += 1;
                ControlFlow::Break(())
            }
        })
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn stop_ticker(shared: &mut TimerShared) {
    if let Some((_, handle)) = shared.ticker.take() {
        shared.generation += 1;
        handle.cancel();
        debug!(generation = shared.generation, "timer ticker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Durations;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn ticks_only_while_running() {
        let (driver, _rx) = TimerDriver::new(IntervalTimer::default());
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(driver.read(IntervalTimer::remaining_secs), 1500);
        assert!(!driver.is_ticking());

        driver.toggle_run();
        assert!(driver.is_ticking());
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(driver.read(IntervalTimer::remaining_secs), 1497);

        driver.toggle_run();
        assert!(!driver.is_ticking());
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.read(IntervalTimer::remaining_secs), 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_duplicate_ticks() {
        let (driver, _rx) = TimerDriver::new(IntervalTimer::default());
        driver.toggle_run();
        time::sleep(Duration::from_millis(1_500)).await;
        driver.pause();
        driver.start();
        driver.start();
        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(driver.read(IntervalTimer::remaining_secs), 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn select_mode_stops_ticker() {
        let (driver, _rx) = TimerDriver::new(IntervalTimer::default());
        driver.toggle_run();
        driver.select_mode(Mode::ShortRest);
        assert!(!driver.is_ticking());
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(driver.read(IntervalTimer::remaining_secs), 300);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_stops_ticker_and_reports_once() {
        let mut timer = IntervalTimer::default();
        timer.set_duration(Mode::Focus, 1);
        let (driver, mut rx) = TimerDriver::new(timer);
        driver.toggle_run();

        time::sleep(Duration::from_millis(60_500)).await;
        match rx.try_recv() {
            Ok(Event::TimerCompleted { mode, next_mode, completed_focus, .. }) => {
                assert_eq!(mode, Mode::Focus);
                assert_eq!(next_mode, Mode::ShortRest);
                assert_eq!(completed_focus, 1);
            }
            other => panic!("Expected TimerCompleted, got {other:?}"),
        }
        assert!(!driver.is_ticking());

        time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(driver.read(IntervalTimer::remaining_secs), 300);
        assert!(!driver.read(IntervalTimer::is_running));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn restart_right_after_expiry_keeps_ticking() {
        for _ in 0..50 {
            let timer = IntervalTimer::new(Durations::new(1, 1, 1));
            let (driver, mut rx) = TimerDriver::with_period(timer, Duration::from_millis(1));
            driver.toggle_run();

            let completed = time::timeout(Duration::from_secs(5), rx.recv()).await;
            assert!(matches!(completed, Ok(Some(Event::TimerCompleted { .. }))));

            driver.toggle_run();
            assert!(driver.read(IntervalTimer::is_running));
            assert!(driver.is_ticking());
            time::timeout(Duration::from_secs(2), async {
                while driver.read(IntervalTimer::remaining_secs) == 60 {
                    time::sleep(Duration::from_millis(2)).await;
                }
            })
            .await
            .expect("timer stopped counting down after restart");
            driver.shutdown();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tick_waiting_on_the_lock_is_discarded_after_shutdown() {
        let (driver, _rx) =
            TimerDriver::with_period(IntervalTimer::default(), Duration::from_millis(1));
        driver.toggle_run();
        time::sleep(Duration::from_millis(20)).await;

        let remaining = {
            let mut shared = lock(&driver.shared);
            // Hold the lock across several periods so a tick is blocked on it.
            std::thread::sleep(Duration::from_millis(10));
            stop_ticker(&mut shared);
            shared.timer.remaining_secs()
        };
        assert!(remaining < 1500);

        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(driver.read(IntervalTimer::remaining_secs), remaining);
        assert!(driver.read(IntervalTimer::is_running));
        assert!(!driver.is_ticking());
    }
}
