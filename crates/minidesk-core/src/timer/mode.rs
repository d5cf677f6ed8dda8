use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

pub const MIN_DURATION_MIN: u32 = 1;
pub const MAX_DURATION_MIN: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Focus,
    ShortRest,
    LongRest,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortRest, Mode::LongRest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortRest => "short-rest",
            Mode::LongRest => "long-rest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortRest => "Short Rest",
            Mode::LongRest => "Long Rest",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mode::Focus => "time to concentrate",
            Mode::ShortRest => "a short breather",
            Mode::LongRest => "a longer pause after a full cycle",
        }
    }

    pub fn is_rest(&self) -> bool {
        !matches!(self, Mode::Focus)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "focus" | "pomodoro" => Ok(Mode::Focus),
            "shortrest" | "shortbreak" | "short" => Ok(Mode::ShortRest),
            "longrest" | "longbreak" | "long" => Ok(Mode::LongRest),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

/// Configured length of each mode, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    #[serde(deserialize_with = "deserialize_minutes")]
    pub focus: u32,
    #[serde(deserialize_with = "deserialize_minutes")]
    pub short_rest: u32,
    #[serde(deserialize_with = "deserialize_minutes")]
    pub long_rest: u32,
}

impl Durations {
    /// Build from raw minutes, clamping each to the accepted range.
    pub fn new(focus: i64, short_rest: i64, long_rest: i64) -> Self {
        Self {
            focus: clamp_minutes(focus),
            short_rest: clamp_minutes(short_rest),
            long_rest: clamp_minutes(long_rest),
        }
    }

    pub fn get(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortRest => self.short_rest,
            Mode::LongRest => self.long_rest,
        }
    }

    /// Store clamped minutes for `mode`; returns the stored value.
    pub fn set(&mut self, mode: Mode, minutes: i64) -> u32 {
        let clamped = clamp_minutes(minutes);
        match mode {
            Mode::Focus => self.focus = clamped,
            Mode::ShortRest => self.short_rest = clamped,
            Mode::LongRest => self.long_rest = clamped,
        }
        clamped
    }

    pub fn secs(&self, mode: Mode) -> u64 {
        u64::from(self.get(mode)) * 60
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus: 25,
            short_rest: 5,
            long_rest: 15,
        }
    }
}

pub fn clamp_minutes(minutes: i64) -> u32 {
    minutes.clamp(i64::from(MIN_DURATION_MIN), i64::from(MAX_DURATION_MIN)) as u32
}

fn deserialize_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_minutes)
}
