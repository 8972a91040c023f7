//! Language versions used to gate constructs.
//!
//! ## Notes
//! - Gating is a plain ordered comparison: a construct introduced in version `v` is attempted only when the
//!   caller-supplied minimum version is `>= v`. There is no feature-flag system.
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::version::LanguageVersion;
//!
//! let v: LanguageVersion = "3.20".parse().unwrap();
//! assert!(v >= LanguageVersion::FUNCTION_TYPES);
//! assert!(v < LanguageVersion::DICTIONARY);
//! ```

use std::fmt;
use std::str::FromStr;

/// A `(major, minor)` language version, ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageVersion {
    pub major: u16,
    pub minor: u16,
}

impl LanguageVersion {
    /// Baseline grammar; everything without an explicit version belongs here.
    pub const BASE: LanguageVersion = LanguageVersion::new(1, 0);
    /// `TRY ... CATCH` blocks and `DYNAMIC ARRAY`.
    pub const DYNAMIC_ARRAYS: LanguageVersion = LanguageVersion::new(2, 0);
    /// `IMPORT FGL`, `PUBLIC`/`PRIVATE` module members.
    pub const MODULES: LanguageVersion = LanguageVersion::new(2, 32);
    /// `FUNCTION (...) RETURNS ...` used as a type.
    pub const FUNCTION_TYPES: LanguageVersion = LanguageVersion::new(3, 20);
    /// `DICTIONARY OF t`.
    pub const DICTIONARY: LanguageVersion = LanguageVersion::new(4, 0);
    /// Newest version known to this front end.
    pub const LATEST: LanguageVersion = LanguageVersion::new(4, 1);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Return `true` if a construct introduced in `since` may be parsed at this version.
    pub fn supports(self, since: LanguageVersion) -> bool {
        self >= since
    }
}

impl Default for LanguageVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

/// Error returned when a version string is not `MAJOR[.MINOR]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(pub String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid language version '{}': expected MAJOR[.MINOR]", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for LanguageVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());
        let (major, minor) = match s.trim().split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s.trim(), "0"),
        };
        let major = major.parse::<u16>().map_err(|_| err())?;
        // "3.2" and "3.20" both mean minor 20; versions are always written with two minor digits.
        let minor = match minor.len() {
            1 => minor.parse::<u16>().map_err(|_| err())? * 10,
            2 => minor.parse::<u16>().map_err(|_| err())?,
            _ => return Err(err()),
        };
        Ok(LanguageVersion::new(major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_order() {
        assert_eq!("3.20".parse::<LanguageVersion>().unwrap(), LanguageVersion::new(3, 20));
        assert_eq!("3.2".parse::<LanguageVersion>().unwrap(), LanguageVersion::new(3, 20));
        assert_eq!("4".parse::<LanguageVersion>().unwrap(), LanguageVersion::new(4, 0));
        assert!(LanguageVersion::new(3, 10) < LanguageVersion::FUNCTION_TYPES);
        assert!("x.1".parse::<LanguageVersion>().is_err());
    }

    #[test]
    fn test_display_pads_minor() {
        assert_eq!(LanguageVersion::DICTIONARY.to_string(), "4.00");
        assert_eq!(LanguageVersion::FUNCTION_TYPES.to_string(), "3.20");
    }
}
