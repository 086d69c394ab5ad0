// src/version/constraint.rs

//! Version constraints and best-match selection

use super::Version;
use crate::error::{Error, Result};
use std::fmt;

/// Version constraint operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Any version is acceptable; the newest wins
    Any,
    /// `==`
    Exact(Version),
    /// `>=`
    Minimum(Version),
    /// `~=`, the half-open range up to the next minor release
    Compatible(Version),
    /// `>`
    Greater(Version),
    /// `<`
    Below(Version),
    /// `<=`
    Maximum(Version),
    /// `!=`
    NotEqual(Version),
    /// Every inner constraint must hold (`>=1.0,<2.0`)
    All(Vec<Constraint>),
}

impl Constraint {
    /// Parse a constraint expression
    ///
    /// Examples:
    /// - "" or "*" → Any
    /// - "==0.5.0" → Exact(0.5.0)
    /// - ">= 1.2" → Minimum(1.2)
    /// - "~=0.5.2" → Compatible(0.5.2), i.e. [0.5.2, 0.6.0)
    /// - ">=1.0, <2.0" → All([Minimum(1.0), Below(2.0)])
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "*" {
            return Ok(Constraint::Any);
        }

        if s.contains(',') {
            let parts = s
                .split(',')
                .map(|part| {
                    let part = part.trim();
                    if part.is_empty() {
                        return Err(Error::ConstraintError(format!(
                            "Empty clause in constraint '{}'",
                            s
                        )));
                    }
                    Self::parse(part)
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Constraint::All(parts));
        }

        if s.starts_with("===") {
            return Err(Error::ConstraintError(format!(
                "Arbitrary equality is not supported: '{}'",
                s
            )));
        }

        let (op, rest) = split_operator(s).ok_or_else(|| {
            Error::ConstraintError(format!(
                "Missing operator in constraint '{}' (expected ==, >=, ~=, >, <, <= or !=)",
                s
            ))
        })?;

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(Error::ConstraintError(format!(
                "Missing version after '{}' in constraint '{}'",
                op, s
            )));
        }

        let version = Version::parse(rest)
            .map_err(|e| Error::ConstraintError(format!("Constraint '{}': {}", s, e)))?;

        match op {
            "==" => Ok(Constraint::Exact(version)),
            ">=" => Ok(Constraint::Minimum(version)),
            "~=" => {
                if version.release().len() < 2 {
                    return Err(Error::ConstraintError(format!(
                        "Compatible release '{}' needs at least two release segments",
                        s
                    )));
                }
                if version.compatible_upper_bound().is_none() {
                    return Err(Error::ConstraintError(format!(
                        "Compatible release '{}' has no next minor version",
                        s
                    )));
                }
                Ok(Constraint::Compatible(version))
            }
            "!=" => Ok(Constraint::NotEqual(version)),
            "<=" => Ok(Constraint::Maximum(version)),
            ">" => Ok(Constraint::Greater(version)),
            _ => Ok(Constraint::Below(version)),
        }
    }

    /// Check if a version satisfies this constraint
    pub fn satisfies(&self, version: &Version) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Exact(v) => version == v,
            Constraint::Minimum(v) => version >= v,
            Constraint::Compatible(v) => {
                version >= v
                    && v
                        .compatible_upper_bound()
                        .is_some_and(|upper| *version < upper)
            }
            Constraint::Greater(v) => version > v,
            Constraint::Below(v) => version < v,
            Constraint::Maximum(v) => version <= v,
            Constraint::NotEqual(v) => version != v,
            Constraint::All(parts) => parts.iter().all(|c| c.satisfies(version)),
        }
    }

    /// Whether pre-release and dev versions may be picked
    ///
    /// Only when the constraint itself names a pre-release version.
    pub fn allows_prereleases(&self) -> bool {
        match self {
            Constraint::Any => false,
            Constraint::Exact(v)
            | Constraint::Minimum(v)
            | Constraint::Compatible(v)
            | Constraint::Greater(v)
            | Constraint::Below(v)
            | Constraint::Maximum(v)
            | Constraint::NotEqual(v) => v.is_prerelease(),
            Constraint::All(parts) => parts.iter().any(Constraint::allows_prereleases),
        }
    }
}

/// Split the leading comparison operator off a constraint
fn split_operator(s: &str) -> Option<(&'static str, &str)> {
    // Two-character operators first so ">=" is not read as ">"
    const OPERATORS: [&str; 7] = ["==", ">=", "<=", "~=", "!=", ">", "<"];
    OPERATORS
        .iter()
        .find_map(|op| s.strip_prefix(op).map(|rest| (*op, rest)))
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Any => write!(f, "*"),
            Constraint::Exact(v) => write!(f, "=={}", v),
            Constraint::Minimum(v) => write!(f, ">={}", v),
            Constraint::Compatible(v) => write!(f, "~={}", v),
            Constraint::Greater(v) => write!(f, ">{}", v),
            Constraint::Below(v) => write!(f, "<{}", v),
            Constraint::Maximum(v) => write!(f, "<={}", v),
            Constraint::NotEqual(v) => write!(f, "!={}", v),
            Constraint::All(parts) => {
                let rendered: Vec<String> = parts.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", rendered.join(","))
            }
        }
    }
}

/// Pick the greatest version satisfying the constraint
///
/// Pre-releases are skipped unless the constraint names one. Returns `None`
/// when no candidate matches.
pub fn best_match<'a, I>(constraint: &Constraint, versions: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    let prereleases = constraint.allows_prereleases();
    versions
        .into_iter()
        .filter(|v| prereleases || !v.is_prerelease())
        .filter(|v| constraint.satisfies(v))
        .max()
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(Constraint::parse("").unwrap(), Constraint::Any);
        assert_eq!(Constraint::parse("*").unwrap(), Constraint::Any);
        assert_eq!(Constraint::parse("==0.5.0").unwrap(), Constraint::Exact(v("0.5.0")));
        assert_eq!(Constraint::parse(">= 1.2").unwrap(), Constraint::Minimum(v("1.2")));
        assert_eq!(Constraint::parse("~=0.5.2").unwrap(), Constraint::Compatible(v("0.5.2")));
        assert_eq!(Constraint::parse(">1").unwrap(), Constraint::Greater(v("1")));
        assert_eq!(Constraint::parse("<2").unwrap(), Constraint::Below(v("2")));
        assert_eq!(Constraint::parse("<=2").unwrap(), Constraint::Maximum(v("2")));
        assert_eq!(Constraint::parse("!=2").unwrap(), Constraint::NotEqual(v("2")));
    }

    #[test]
    fn test_parse_conjunction() {
        let c = Constraint::parse(">=1.0, <2.0").unwrap();
        assert_eq!(
            c,
            Constraint::All(vec![Constraint::Minimum(v("1.0")), Constraint::Below(v("2.0"))])
        );
        assert!(c.satisfies(&v("1.5")));
        assert!(!c.satisfies(&v("2.0")));
        assert!(!c.satisfies(&v("0.9")));
    }

    #[test]
    fn test_parse_errors() {
        let overflow = format!("~=1.{}", u64::MAX);
        for bad in ["1.0", "==", "~=1", "=>1.0", "===1.0", ">=1.0,", "==1.x", overflow.as_str()] {
            let err = Constraint::parse(bad).unwrap_err();
            assert!(matches!(err, Error::ConstraintError(_)), "{bad} should fail");
        }
    }

    #[test]
    fn test_compatible_release_range() {
        let c = Constraint::parse("~=0.5.2").unwrap();
        assert!(!c.satisfies(&v("0.5.1")));
        assert!(c.satisfies(&v("0.5.2")));
        assert!(c.satisfies(&v("0.5.99")));
        assert!(!c.satisfies(&v("0.6.0")));
    }

    #[test]
    fn test_compatible_two_segments_bumps_minor() {
        let c = Constraint::parse("~=1.4").unwrap();
        for (x, expected) in [("1.3.9", false), ("1.4", true), ("1.4.7", true), ("1.5", false), ("2.0", false)] {
            assert_eq!(c.satisfies(&v(x)), expected, "~=1.4 vs {x}");
        }
    }

    #[test]
    fn test_exact_uses_padded_equality() {
        let c = Constraint::parse("==1.0").unwrap();
        assert!(c.satisfies(&v("1.0.0")));
        assert!(!c.satisfies(&v("1.0.1")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::parse(">= 1.2.0").unwrap().to_string(), ">=1.2.0");
        assert_eq!(Constraint::parse(">=1.0, <2.0").unwrap().to_string(), ">=1.0,<2.0");
        assert_eq!(Constraint::Any.to_string(), "*");
    }

    #[test]
    fn test_best_match_picks_greatest() {
        let versions = [v("0.5.0"), v("0.6.0"), v("0.5.3"), v("0.4.9")];
        assert_eq!(best_match(&Constraint::Any, &versions), Some(v("0.6.0")));
        assert_eq!(
            best_match(&Constraint::parse("~=0.5.0").unwrap(), &versions),
            Some(v("0.5.3"))
        );
        assert_eq!(best_match(&Constraint::parse(">=1.0").unwrap(), &versions), None);
    }

    #[test]
    fn test_best_match_empty_set() {
        let versions: Vec<Version> = Vec::new();
        assert_eq!(best_match(&Constraint::Any, &versions), None);
    }

    #[test]
    fn test_best_match_skips_prereleases() {
        let versions = [v("3.12.5"), v("3.13.0rc1"), v("3.14.0.dev2")];
        assert_eq!(best_match(&Constraint::Any, &versions), Some(v("3.12.5")));
        assert_eq!(
            best_match(&Constraint::parse(">=3.12").unwrap(), &versions),
            Some(v("3.12.5"))
        );
        assert_eq!(best_match(&Constraint::parse(">=3.13").unwrap(), &versions), None);
    }

    #[test]
    fn test_best_match_prerelease_when_named() {
        let versions = [v("3.12.5"), v("3.13.0rc1"), v("3.13.0rc2")];
        assert_eq!(
            best_match(&Constraint::parse(">=3.13.0rc1").unwrap(), &versions),
            Some(v("3.13.0rc2"))
        );
        assert_eq!(
            best_match(&Constraint::parse("==3.13.0rc1").unwrap(), &versions),
            Some(v("3.13.0rc1"))
        );
        assert!(Constraint::parse(">=1.0, <2.0b1").unwrap().allows_prereleases());
        assert!(!Constraint::parse("~=3.12").unwrap().allows_prereleases());
    }
}
