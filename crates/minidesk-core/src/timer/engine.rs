//! Interval timer implementation.
//!
//! The timer is a tick-driven state machine. It does not use internal
//! threads or read the clock - the caller invokes `tick()` once per second
//! while the timer runs (see [`crate::driver::TimerDriver`]).
//!
//! ## State Transitions
//!
//! ```text
//! (focus | short-rest | long-rest) x (running | paused)
//!
//! focus     --expire--> short-rest  (or long-rest every Nth completed focus)
//! *-rest    --expire--> focus
//! ```
//!
//! Expiry always leaves the timer paused; the next interval must be started
//! explicitly.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::default();
//! timer.toggle_run();
//! // Once per second:
//! if let Some(event) = timer.tick() { /* interval finished */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use super::mode::{Durations, Mode};
use crate::events::Event;

/// Every Nth completed focus session is followed by a long rest.
pub const DEFAULT_LONG_REST_EVERY: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTimer {
    mode: Mode,
    durations: Durations,
    /// Remaining time of the current interval in seconds.
    remaining_secs: u64,
    running: bool,
    completed_focus: u32,
    #[serde(
        default = "default_long_rest_every",
        deserialize_with = "deserialize_long_rest_every"
    )]
    long_rest_every: u32,
}

fn default_long_rest_every() -> u32 {
    DEFAULT_LONG_REST_EVERY
}

fn deserialize_long_rest_every<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(|every| every.max(1))
}

impl IntervalTimer {
    /// Paused timer in focus mode with the full focus duration remaining.
    pub fn new(durations: Durations) -> Self {
        Self {
            mode: Mode::Focus,
            remaining_secs: durations.secs(Mode::Focus),
            durations,
            running: false,
            completed_focus: 0,
            long_rest_every: DEFAULT_LONG_REST_EVERY,
        }
    }

    /// Values below one are treated as one (every focus earns a long rest).
    pub fn with_long_rest_every(mut self, every: u32) -> Self {
        self.long_rest_every = every.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    pub fn long_rest_every(&self) -> u32 {
        self.long_rest_every
    }

    /// Full length of the active mode in seconds.
    pub fn total_secs(&self) -> u64 {
        self.durations.secs(self.mode)
    }

    /// Remaining over total for the active mode, 0.0 ..= 1.0.
    pub fn progress_ratio(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (self.remaining_secs as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            mode: self.mode,
            label: self.mode.label().to_string(),
            description: self.mode.description().to_string(),
            rest: self.mode.is_rest(),
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            display: self.format_remaining(),
            progress_ratio: self.progress_ratio(),
            completed_focus: self.completed_focus,
            durations: self.durations,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch to `mode`, pause, and load its full duration.
    pub fn select_mode(&mut self, mode: Mode) -> Event {
        self.mode = mode;
        self.running = false;
        self.remaining_secs = self.total_secs();
        debug!(%mode, "mode selected");
        Event::ModeSelected {
            mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    pub fn toggle_run(&mut self) -> Event {
        if self.running {
            self.pause_now()
        } else {
            self.start_now()
        }
    }

    /// Start if paused; `None` when already running.
    pub fn start(&mut self) -> Option<Event> {
        (!self.running).then(|| self.start_now())
    }

    /// Pause if running; `None` when already paused.
    pub fn pause(&mut self) -> Option<Event> {
        self.running.then(|| self.pause_now())
    }

    /// Advance one second. Returns `Some(Event::TimerCompleted)` when the
    /// interval expires on this tick. No effect while paused.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.expire());
        }
        None
    }

    /// Change a mode's duration. Always accepted; remaining time follows only
    /// when the timer is paused on that mode.
    pub fn set_duration(&mut self, mode: Mode, minutes: i64) -> Event {
        let minutes = self.durations.set(mode, minutes);
        let resynced = !self.running && self.mode == mode;
        if resynced {
            self.remaining_secs = self.total_secs();
        }
        debug!(%mode, minutes, resynced, "duration changed");
        Event::DurationChanged {
            mode,
            minutes,
            resynced,
            at: Utc::now(),
        }
    }

    /// Pause and reload the active mode's duration. The session counter is kept.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.remaining_secs = self.total_secs();
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_now(&mut self) -> Event {
        self.running = true;
        debug!(mode = %self.mode, remaining = self.remaining_secs, "timer started");
        Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    fn pause_now(&mut self) -> Event {
        self.running = false;
        debug!(mode = %self.mode, remaining = self.remaining_secs, "timer paused");
        Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    fn expire(&mut self) -> Event {
        let finished = self.mode;
        self.running = false;

        let next = match finished {
            Mode::Focus => {
                self.completed_focus = self.completed_focus.saturating_add(1);
                if self.completed_focus % self.long_rest_every == 0 {
                    Mode::LongRest
                } else {
                    Mode::ShortRest
                }
            }
            Mode::ShortRest | Mode::LongRest => Mode::Focus,
        };
        self.mode = next;
        self.remaining_secs = self.total_secs();

        info!(
            %finished,
            %next,
            completed_focus = self.completed_focus,
            "interval completed"
        );
        Event::TimerCompleted {
            mode: finished,
            next_mode: next,
            completed_focus: self.completed_focus,
            at: Utc::now(),
        }
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

/// `125` -> `"02:05"`.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_expiry(timer: &mut IntervalTimer) -> Event {
        if !timer.is_running() {
            timer.toggle_run();
        }
        loop {
            if let Some(event) = timer.tick() {
                return event;
            }
        }
    }

    #[test]
    fn default_timer_is_paused_focus() {
        let timer = IntervalTimer::default();
        assert_eq!(timer.mode(), Mode::Focus);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 25 * 60);
        assert_eq!(timer.progress_ratio(), 1.0);
        assert_eq!(timer.format_remaining(), "25:00");
    }

    #[test]
    fn tick_has_no_effect_while_paused() {
        let mut timer = IntervalTimer::default();
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining_secs(), 1500);
    }

    #[test]
    fn focus_expires_after_1500_ticks() {
        let mut timer = IntervalTimer::default();
        timer.toggle_run();
        for _ in 0..1499 {
            assert!(timer.tick().is_none());
        }
        assert_eq!(timer.remaining_secs(), 1);
        match timer.tick() {
            Some(Event::TimerCompleted {
                mode,
                next_mode,
                completed_focus,
                ..
            }) => {
                assert_eq!(mode, Mode::Focus);
                assert_eq!(next_mode, Mode::ShortRest);
                assert_eq!(completed_focus, 1);
            }
            other => panic!("Expected TimerCompleted, got {other:?}"),
        }
        assert!(!timer.is_running());
        assert_eq!(timer.mode(), Mode::ShortRest);
        assert_eq!(timer.remaining_secs(), 5 * 60);
    }

    #[test]
    fn fourth_focus_goes_to_long_rest() {
        let mut timer = IntervalTimer::default();
        let mut rests = Vec::new();
        for _ in 0..4 {
            run_until_expiry(&mut timer);
            rests.push(timer.mode());
            run_until_expiry(&mut timer);
            assert_eq!(timer.mode(), Mode::Focus);
        }
        assert_eq!(
            rests,
            vec![Mode::ShortRest, Mode::ShortRest, Mode::ShortRest, Mode::LongRest]
        );
        assert_eq!(timer.completed_focus(), 4);
    }

    #[test]
    fn custom_long_rest_cadence() {
        let mut timer = IntervalTimer::default().with_long_rest_every(2);
        run_until_expiry(&mut timer);
        assert_eq!(timer.mode(), Mode::ShortRest);
        timer.select_mode(Mode::Focus);
        run_until_expiry(&mut timer);
        assert_eq!(timer.mode(), Mode::LongRest);
    }

    #[test]
    fn select_mode_pauses_and_reloads() {
        let mut timer = IntervalTimer::default();
        timer.toggle_run();
        timer.tick();
        timer.select_mode(Mode::LongRest);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 15 * 60);
    }

    #[test]
    fn duration_edit_resyncs_only_when_paused_on_active_mode() {
        let mut timer = IntervalTimer::default();

        timer.set_duration(Mode::Focus, 30);
        assert_eq!(timer.remaining_secs(), 30 * 60);

        timer.set_duration(Mode::ShortRest, 10);
        assert_eq!(timer.remaining_secs(), 30 * 60);
        assert_eq!(timer.durations().short_rest, 10);

        timer.toggle_run();
        timer.tick();
        timer.set_duration(Mode::Focus, 45);
        assert_eq!(timer.durations().focus, 45);
        assert_eq!(timer.remaining_secs(), 30 * 60 - 1);
    }

    #[test]
    fn duration_edit_is_clamped() {
        let mut timer = IntervalTimer::default();
        match timer.set_duration(Mode::Focus, 500) {
            Event::DurationChanged { minutes, resynced, .. } => {
                assert_eq!(minutes, 60);
                assert!(resynced);
            }
            other => panic!("Expected DurationChanged, got {other:?}"),
        }
        timer.set_duration(Mode::Focus, 0);
        assert_eq!(timer.remaining_secs(), 60);
    }

    #[test]
    fn reset_keeps_session_count() {
        let mut timer = IntervalTimer::default();
        run_until_expiry(&mut timer);
        timer.toggle_run();
        timer.tick();
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 5 * 60);
        assert_eq!(timer.completed_focus(), 1);
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut timer = IntervalTimer::default();
        assert!(timer.pause().is_none());
        assert!(timer.start().is_some());
        assert!(timer.start().is_none());
        assert!(timer.pause().is_some());
    }

    #[test]
    fn progress_ratio_stays_in_range_after_shortening_running_mode() {
        let mut timer = IntervalTimer::default();
        timer.toggle_run();
        timer.set_duration(Mode::Focus, 1);
        assert_eq!(timer.progress_ratio(), 1.0);
    }

    #[test]
    fn deserialized_zero_long_rest_every_is_clamped() {
        let mut json = serde_json::to_value(IntervalTimer::default()).unwrap();
        json["long_rest_every"] = serde_json::json!(0);
        json["durations"]["focus"] = serde_json::json!(1);
        json["remaining_secs"] = serde_json::json!(60);
        let mut timer: IntervalTimer = serde_json::from_value(json).unwrap();
        assert_eq!(timer.long_rest_every(), 1);

        let completed = run_until_expiry(&mut timer);
        assert!(matches!(
            completed,
            Event::TimerCompleted { next_mode: Mode::LongRest, .. }
        ));
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(3600), "60:00");
    }
}
