use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Time between automatic spawns.
pub const SPAWN_PERIOD: Duration = Duration::from_secs(10);

/// Granularity at which the board driver feeds elapsed time.
pub const BOARD_TICK: Duration = Duration::from_millis(100);

/// Tracks elapsed time since the last spawn.
///
/// Elapsed time is kept in whole milliseconds so repeated small advances do
/// not accumulate floating point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCadence {
    #[serde(deserialize_with = "deserialize_period_ms")]
    period_ms: u64,
    elapsed_ms: u64,
}

fn deserialize_period_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(|ms| ms.max(1))
}

impl SpawnCadence {
    /// A zero period is treated as one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period_ms: (period.as_millis() as u64).max(1),
            elapsed_ms: 0,
        }
    }

    /// Add elapsed time. Returns `true` once the period is complete; the
    /// caller is expected to spawn and then [`reset`](Self::reset).
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let step = elapsed.as_millis() as u64;
        self.elapsed_ms = self.elapsed_ms.saturating_add(step).min(self.period_ms);
        self.is_due()
    }

    pub fn is_due(&self) -> bool {
        self.elapsed_ms >= self.period_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// 0.0 ..= 100.0
    pub fn progress_pct(&self) -> f64 {
        (self.elapsed_ms as f64 / self.period_ms as f64 * 100.0).min(100.0)
    }
}

impl Default for SpawnCadence {
    fn default() -> Self {
        Self::new(SPAWN_PERIOD)
    }
}
