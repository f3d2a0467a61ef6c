//! Run-time environment mode.

use std::fmt;

/// The environment the CLI believes it is running in.
///
/// Derived once from an environment value; unrecognized values fall back to
/// production. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Production,
    Development,
    Demo,
}

impl Mode {
    /// Parse a raw environment value, defaulting to production.
    pub fn parse(raw: Option<&str>) -> Mode {
        match raw.map(|value| value.to_ascii_lowercase()).as_deref() {
            Some("development") => Mode::Development,
            Some("demo") => Mode::Demo,
            _ => Mode::Production,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Mode::Production)
    }

    pub fn is_development(self) -> bool {
        matches!(self, Mode::Development)
    }

    pub fn is_demo(self) -> bool {
        matches!(self, Mode::Demo)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Production => write!(f, "production"),
            Mode::Development => write!(f, "development"),
            Mode::Demo => write!(f, "demo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_modes() {
        assert_eq!(Mode::parse(Some("production")), Mode::Production);
        assert_eq!(Mode::parse(Some("development")), Mode::Development);
        assert_eq!(Mode::parse(Some("demo")), Mode::Demo);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Mode::parse(Some("DEMO")), Mode::Demo);
        assert_eq!(Mode::parse(Some("Development")), Mode::Development);
    }

    #[test]
    fn test_unrecognized_defaults_to_production() {
        assert_eq!(Mode::parse(Some("staging")), Mode::Production);
        assert_eq!(Mode::parse(None), Mode::Production);
    }

    #[test]
    fn test_predicates() {
        assert!(Mode::Production.is_production());
        assert!(!Mode::Production.is_demo());
        assert!(Mode::Development.is_development());
        assert!(Mode::Demo.is_demo());
    }
}
