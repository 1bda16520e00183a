use std::fmt;

use crate::clock::Clock;
use crate::error::{Result, StoreError};

/// Reserved store entry holding the current pointer.
pub const CURRENT_ENTRY: &str = "current";

/// Name of a stored connection profile.
///
/// Names are used directly as file names inside the store directory, so they
/// must be a single path segment. A leading `.` is reserved for temporary
/// files written during atomic puts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        match Self::check(&value) {
            Ok(()) => Ok(Self(value)),
            Err(reason) => Err(StoreError::InvalidName { name: value, reason }),
        }
    }

    /// Generate a `pg<unix-millis>` name.
    pub fn generate(clock: &dyn Clock) -> Self {
        Self(format!("pg{}", clock.unix_millis()))
    }

    /// Returns true if `value` can name a profile file.
    pub fn is_valid(value: &str) -> bool {
        Self::check(value).is_ok()
    }

    fn check(value: &str) -> std::result::Result<(), &'static str> {
        if value.is_empty() {
            return Err("name is empty");
        }
        if value == CURRENT_ENTRY {
            return Err("\"current\" is reserved for the current pointer");
        }
        if value.starts_with('.') {
            return Err("names may not start with '.'");
        }
        if value.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
            return Err("names must be a single path segment");
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::str::FromStr for ProfileName {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    #[test]
    fn generated_name_uses_unix_millis() {
        let clock = FixedClock::from_millis(1_700_000_000_123).unwrap();
        assert_eq!(ProfileName::generate(&clock).as_str(), "pg1700000000123");
    }

    #[test]
    fn rejects_reserved_and_unsafe_names() {
        assert!(ProfileName::new("current").is_err());
        assert!(ProfileName::new("").is_err());
        assert!(ProfileName::new(".").is_err());
        assert!(ProfileName::new("..").is_err());
        assert!(ProfileName::new(".tmpX1").is_err());
        assert!(ProfileName::new("../escape").is_err());
        assert!(ProfileName::new("foo\\bar").is_err());
        assert!(ProfileName::new("bad\0name").is_err());
    }

    #[test]
    fn accepts_ordinary_names() {
        let name = ProfileName::new("staging-db").unwrap();
        assert_eq!(name.as_str(), "staging-db");
        assert!(ProfileName::is_valid("Current"));
    }

    #[test]
    fn invalid_name_error_carries_reason() {
        let err = ProfileName::new("current").unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
