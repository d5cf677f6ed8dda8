//! TOML-based application configuration.
//!
//! Stores the defaults each widget starts from:
//! - Interval timer durations and the long-rest cadence
//! - Tile board spawn period and driver tick
//! - Cost calculator starting amounts
//!
//! Configuration is stored at `~/.config/minidesk/config.toml`. Set
//! `MINIDESK_ENV=dev` to use `~/.config/minidesk-dev/` instead, or
//! `MINIDESK_CONFIG` to point at an explicit file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{SpawnCadence, TileBoard};
use crate::cost::{CostInputs, CostModel};
use crate::error::{ConfigError, CoreError, Result};
use crate::timer::{Durations, IntervalTimer};

/// Interval timer configuration. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus")]
    pub focus: u32,
    #[serde(default = "default_short_rest")]
    pub short_rest: u32,
    #[serde(default = "default_long_rest")]
    pub long_rest: u32,
    #[serde(default = "default_long_rest_every")]
    pub long_rest_every: u32,
}

/// Tile board configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_spawn_period_ms")]
    pub spawn_period_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Cost calculator starting values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_months")]
    pub months: u32,
    #[serde(default = "default_monthly_income")]
    pub monthly_income: f64,
    #[serde(default)]
    pub inputs: CostInputs,
}

/// Application configuration.
///
/// Serialized to/from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub cost: CostConfig,
}

// Default functions
fn default_focus() -> u32 {
    25
}
fn default_short_rest() -> u32 {
    5
}
fn default_long_rest() -> u32 {
    15
}
fn default_long_rest_every() -> u32 {
    crate::timer::DEFAULT_LONG_REST_EVERY
}
fn default_spawn_period_ms() -> u64 {
    crate::board::SPAWN_PERIOD.as_millis() as u64
}
fn default_tick_ms() -> u64 {
    crate::board::BOARD_TICK.as_millis() as u64
}
fn default_months() -> u32 {
    12
}
fn default_monthly_income() -> f64 {
    40.0
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus: default_focus(),
            short_rest: default_short_rest(),
            long_rest: default_long_rest(),
            long_rest_every: default_long_rest_every(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            spawn_period_ms: default_spawn_period_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            months: default_months(),
            monthly_income: default_monthly_income(),
            inputs: CostInputs::default(),
        }
    }
}

/// Returns `~/.config/minidesk[-dev]/` based on MINIDESK_ENV.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINIDESK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("minidesk-dev")
    } else {
        base_dir.join("minidesk")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Config file location, honouring `MINIDESK_CONFIG`.
    pub fn path() -> Result<PathBuf> {
        if let Ok(explicit) = std::env::var("MINIDESK_CONFIG") {
            return Ok(PathBuf::from(explicit));
        }
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the defaults there when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::Config(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config missing, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| {
            CoreError::Config(ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message,
            })
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            warn!(%err, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. The value must parse as the
    /// type already stored under that key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    // ── Widget construction ──────────────────────────────────────────

    pub fn durations(&self) -> Durations {
        Durations::new(
            i64::from(self.timer.focus),
            i64::from(self.timer.short_rest),
            i64::from(self.timer.long_rest),
        )
    }

    pub fn interval_timer(&self) -> IntervalTimer {
        IntervalTimer::new(self.durations()).with_long_rest_every(self.timer.long_rest_every)
    }

    pub fn tile_board(&self) -> TileBoard {
        TileBoard::with_cadence(SpawnCadence::new(Duration::from_millis(
            self.board.spawn_period_ms,
        )))
    }

    /// Board driver tick, at least one millisecond.
    pub fn board_tick(&self) -> Duration {
        Duration::from_millis(self.board.tick_ms.max(1))
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(
            self.cost.inputs,
            f64::from(self.cost.months),
            self.cost.monthly_income,
        )
    }
}
