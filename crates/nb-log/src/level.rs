//! Log levels and level specifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered log levels.
///
/// Numeric values are spaced by ten so callers holding a raw number can
/// compare it directly against a threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Fatal,
}

/// Level applied when none is given.
pub const DEFAULT_LEVEL: Level = Level::Warn;

impl Level {
    /// All levels, from most to least verbose.
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// The level's numeric value.
    pub fn value(self) -> u8 {
        match self {
            Level::Trace => 10,
            Level::Debug => 20,
            Level::Info => 30,
            Level::Warn => 40,
            Level::Error => 50,
            Level::Fatal => 60,
        }
    }

    /// The level's lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    /// Level for a numeric value, if recognized.
    pub fn from_value(value: i64) -> Option<Level> {
        Level::ALL
            .iter()
            .copied()
            .find(|level| i64::from(level.value()) == value)
    }

    /// Comma-separated valid names, carried by `Error::InvalidLevel`.
    pub fn valid_names() -> String {
        Level::ALL
            .iter()
            .map(|level| level.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(name: &str) -> Result<Level> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(Error::InvalidLevel {
                given: name.to_string(),
                valid: Level::valid_names(),
            }),
        }
    }
}

/// A level given by name or by numeric value, resolved when used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSpec {
    Named(String),
    Numeric(i64),
}

impl LevelSpec {
    /// Resolve to a concrete level.
    pub fn resolve(&self) -> Result<Level> {
        match self {
            LevelSpec::Named(name) => name.parse(),
            LevelSpec::Numeric(value) => {
                Level::from_value(*value).ok_or_else(|| Error::InvalidLevel {
                    given: value.to_string(),
                    valid: Level::valid_names(),
                })
            }
        }
    }
}

impl From<Level> for LevelSpec {
    fn from(level: Level) -> Self {
        LevelSpec::Numeric(i64::from(level.value()))
    }
}

impl From<&str> for LevelSpec {
    fn from(name: &str) -> Self {
        LevelSpec::Named(name.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(name: String) -> Self {
        LevelSpec::Named(name)
    }
}

impl From<i64> for LevelSpec {
    fn from(value: i64) -> Self {
        LevelSpec::Numeric(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_value_round_trip() {
        for level in Level::ALL {
            assert_eq!(Level::from_value(i64::from(level.value())), Some(level));
        }
        assert_eq!(Level::from_value(35), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("Trace".parse::<Level>().unwrap(), Level::Trace);
    }

    #[test]
    fn test_parse_rejects_unknown_names_with_valid_list() {
        let err = "loud".parse::<Level>().unwrap_err();
        match err {
            Error::InvalidLevel { given, valid } => {
                assert_eq!(given, "loud");
                assert_eq!(valid, "trace, debug, info, warn, error, fatal");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spec_resolution() {
        assert_eq!(LevelSpec::from("debug").resolve().unwrap(), Level::Debug);
        assert_eq!(LevelSpec::from(50).resolve().unwrap(), Level::Error);
        assert!(LevelSpec::from(42).resolve().is_err());
    }

    #[test]
    fn test_default_level_is_warn() {
        assert_eq!(DEFAULT_LEVEL, Level::Warn);
        assert_eq!(Level::default(), Level::Warn);
    }
}
