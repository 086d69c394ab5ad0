// src/version/mod.rs

//! Version handling and constraint satisfaction for indexed packages
//!
//! Versions follow PEP 440, the shape used by nixpkgs package metadata for
//! most language ecosystems. Parsing, ordering and normalized rendering come
//! from `pep440_rs`; comparison pads release segments with zeros, so `1.0`
//! and `1.0.0` are the same version.

mod constraint;

pub use constraint::{Constraint, best_match};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A parsed package version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pep440_rs::Version);

impl Version {
    /// Parse a version string
    ///
    /// Examples:
    /// - "0.11.10" → release [0, 11, 10]
    /// - "3.12.0rc2" → release [3, 12, 0], pre-release rc2
    /// - "v1.0-beta.2" → normalized to "1.0b2"
    /// - "1.0-3" → post-release, rendered "1.0.post3"
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Err(Error::ParseError("Empty version string".to_string()));
        }

        pep440_rs::Version::from_str(text)
            .map(Self)
            .map_err(|e| Error::ParseError(format!("Invalid version '{}': {}", text, e)))
    }

    /// Numeric release segments as written
    pub fn release(&self) -> &[u64] {
        self.0.release()
    }

    /// True for alpha, beta, rc and dev releases
    pub fn is_prerelease(&self) -> bool {
        self.0.any_prerelease()
    }

    /// Exclusive upper bound of the compatible-release range starting here
    ///
    /// Increments the second-most-significant release segment and zeroes the
    /// lower ones: `0.5.2` → `0.6.0`, `1.4` → `1.5`. Returns `None` for a
    /// single-segment release, which has no compatible range, and when the
    /// segment cannot be incremented.
    pub fn compatible_upper_bound(&self) -> Option<Version> {
        let release = self.release();
        if release.len() < 2 {
            return None;
        }

        let mut upper = release.to_vec();
        upper[1] = upper[1].checked_add(1)?;
        for segment in upper.iter_mut().skip(2) {
            *segment = 0;
        }
        Some(Self(
            pep440_rs::Version::new(upper).with_epoch(self.0.epoch()),
        ))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let version = v("0.11.10");
        assert_eq!(version.release(), &[0, 11, 10]);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_parse_prerelease_spellings() {
        assert_eq!(v("3.12.0rc2").to_string(), "3.12.0rc2");
        assert_eq!(v("1.0-alpha.1").to_string(), "1.0a1");
        assert_eq!(v("1.0beta").to_string(), "1.0b0");
        assert!(v("2.0.0-pre3").is_prerelease());
    }

    #[test]
    fn test_parse_post_and_dev() {
        assert_eq!(v("1.0.post2").to_string(), "1.0.post2");
        assert_eq!(v("1.0-3").to_string(), "1.0.post3");
        assert!(!v("1.0.post2").is_prerelease());
        assert!(v("2.0.dev4").is_prerelease());
        assert!(v("2.0rc1.dev1").is_prerelease());
    }

    #[test]
    fn test_parse_leading_v_and_whitespace() {
        assert_eq!(v(" v1.2.3 "), v("1.2.3"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "   ", "abc", "1..2", "1.x.3", "1.0-foo", "unstable-2024-01-01"] {
            let err = Version::parse(bad).unwrap_err();
            assert!(matches!(err, Error::ParseError(_)), "{bad} should fail");
        }
    }

    #[test]
    fn test_parse_error_names_input() {
        let err = Version::parse("1.2.3-foo").unwrap_err().to_string();
        assert!(err.contains("1.2.3-foo"));
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("10.0") > v("9.0"));
        assert!(v("0.11.10") > v("0.11.9"));
    }

    #[test]
    fn test_zero_padding_equality() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1.0").cmp(&v("1.0.0")), Ordering::Equal);

        use std::collections::HashSet;
        let set: HashSet<Version> = [v("1.0"), v("1.0.0")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_phase_ordering() {
        let ordered = [
            "1.0.dev1", "1.0a1.dev1", "1.0a1", "1.0b2", "1.0rc1", "1.0", "1.0.post1.dev1",
            "1.0.post1", "1.1.dev1",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_display_is_normalized() {
        for text in ["0.5.2", "3.12.0rc2", "1.0.post2", "2.0.dev4", "1.0a1.dev1", "v1.0-beta.2"] {
            let rendered = v(text).to_string();
            assert_eq!(v(&rendered), v(text));
            assert_eq!(v(&rendered).to_string(), rendered);
        }
        assert_eq!(v("v1.0-beta.2").to_string(), "1.0b2");
    }

    #[test]
    fn test_compatible_upper_bound() {
        assert_eq!(v("0.5.2").compatible_upper_bound(), Some(v("0.6.0")));
        assert_eq!(v("1.4").compatible_upper_bound(), Some(v("1.5")));
        assert_eq!(v("2.3.4.5").compatible_upper_bound(), Some(v("2.4.0.0")));
        assert_eq!(v("7").compatible_upper_bound(), None);
    }

    #[test]
    fn test_compatible_upper_bound_at_segment_limit() {
        let top = v(&format!("1.{}", u64::MAX));
        assert_eq!(top.compatible_upper_bound(), None);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("0.11.10")).unwrap();
        assert_eq!(json, "\"0.11.10\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("0.11.10"));
    }
}
