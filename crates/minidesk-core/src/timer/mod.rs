mod engine;
mod mode;

pub use engine::{format_clock, IntervalTimer, DEFAULT_LONG_REST_EVERY};
pub use mode::{clamp_minutes, Durations, Mode, MAX_DURATION_MIN, MIN_DURATION_MIN};
