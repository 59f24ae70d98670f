//! Conversion settings shared by every task in a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a setting falls outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("quality must be between {min} and {max}, got {value}", min = Quality::MIN, max = Quality::MAX)]
    QualityOutOfRange { value: i64 },

    #[error("thread count must be between {min} and {max}, got {value}", min = ThreadCount::MIN, max = ThreadCount::MAX)]
    ThreadCountOutOfRange { value: i64 },

    #[error("expected an integer, got '{value}'")]
    NotAnInteger { value: String },
}

fn parse_integer(s: &str) -> Result<i64, ConfigError> {
    s.trim().parse::<i64>().map_err(|_| ConfigError::NotAnInteger {
        value: s.to_owned(),
    })
}

// ── Quality ───────────────────────────────────────────────────────────────────

/// WebP re-encode fidelity on the 1–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: u8 = 80;

    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::QualityOutOfRange { value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Fidelity as a fraction in `(0, 1]`.
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<i64> for Quality {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

impl FromStr for Quality {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_integer(s)?)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ThreadCount ───────────────────────────────────────────────────────────────

/// Worker pool size, which is also the chunk width of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ThreadCount(u8);

impl ThreadCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;
    pub const DEFAULT: u8 = 4;

    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::ThreadCountOutOfRange { value })
        }
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<i64> for ThreadCount {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThreadCount> for u8 {
    fn from(t: ThreadCount) -> Self {
        t.0
    }
}

impl FromStr for ThreadCount {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_integer(s)?)
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ConversionConfig ──────────────────────────────────────────────────────────

/// Settings applied uniformly to every task of a run.
///
/// Changes take effect at the start of the next run; a run in progress keeps
/// the values it started with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub quality: Quality,
    pub thread_count: ThreadCount,
}

impl ConversionConfig {
    pub fn new(quality: Quality, thread_count: ThreadCount) -> Self {
        Self {
            quality,
            thread_count,
        }
    }
}
