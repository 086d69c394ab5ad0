// src/resolver/request.rs

//! Package specifiers and resolution requests

use crate::error::{Error, Result};
use crate::version::Constraint;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Default bound on the number of packages in one request
pub const MAX_PACKAGES: usize = 50;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._+\-]*$").unwrap());

/// Characters that start a comparison operator
const OPERATOR_CHARS: &[char] = &['=', '<', '>', '!', '~'];

/// A requested package and the versions it accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub constraint: Constraint,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }

    /// Parse `name`, `name==1.0`, `name>=1.0`, `name~=0.5.2`, ...
    ///
    /// A bare name accepts any version and prefers the newest.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, constraint_text) = match s.find(OPERATOR_CHARS) {
            Some(pos) => (s[..pos].trim(), &s[pos..]),
            None => (s, ""),
        };

        if name.is_empty() {
            return Err(Error::ParseError(format!(
                "Missing package name in specifier '{}'",
                s
            )));
        }
        if !NAME_RE.is_match(name) {
            return Err(Error::ParseError(format!(
                "Invalid package name '{}' in specifier '{}'",
                name, s
            )));
        }

        Ok(Self {
            name: name.to_string(),
            constraint: Constraint::parse(constraint_text)?,
        })
    }
}

impl FromStr for PackageSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PackageSpec::parse(s)
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            Constraint::Any => write!(f, "{}", self.name),
            ref constraint => write!(f, "{}{}", self.name, constraint),
        }
    }
}

/// Ordered list of package specifiers resolved together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    specs: Vec<PackageSpec>,
}

impl Request {
    pub fn new(specs: Vec<PackageSpec>) -> Self {
        Self { specs }
    }

    /// Parse each raw specifier; the whole request fails on the first bad one
    pub fn parse<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = raw
            .into_iter()
            .map(|s| PackageSpec::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { specs })
    }

    /// Parse a `;`-separated list such as `uv~=0.5.0;ruff`
    pub fn parse_list(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::ParseError("No packages requested".to_string()));
        }
        Self::parse(s.split(';'))
    }

    pub fn specs(&self) -> &[PackageSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    #[test]
    fn test_parse_bare_name() {
        let spec = PackageSpec::parse("ruff").unwrap();
        assert_eq!(spec.name, "ruff");
        assert_eq!(spec.constraint, Constraint::Any);
        assert_eq!(spec.to_string(), "ruff");
    }

    #[test]
    fn test_parse_with_operator() {
        let spec = PackageSpec::parse("uv~=0.5.0").unwrap();
        assert_eq!(spec.name, "uv");
        assert_eq!(
            spec.constraint,
            Constraint::Compatible(Version::parse("0.5.0").unwrap())
        );
        assert_eq!(spec.to_string(), "uv~=0.5.0");

        let spec = PackageSpec::parse(" python3 >= 3.11 ").unwrap();
        assert_eq!(spec.name, "python3");
        assert_eq!(
            spec.constraint,
            Constraint::Minimum(Version::parse("3.11").unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        for bad in ["", ">=1.0", "foo bar", "pkg[extra]", "-dash"] {
            let err = PackageSpec::parse(bad).unwrap_err();
            assert!(matches!(err, Error::ParseError(_)), "{bad:?} should fail");
        }
    }

    #[test]
    fn test_parse_rejects_bad_constraint() {
        let err = PackageSpec::parse("uv~=0").unwrap_err();
        assert!(matches!(err, Error::ConstraintError(_)));
    }

    #[test]
    fn test_parse_list() {
        let request = Request::parse_list("uv~=0.5.0;ruff;nodejs==20.0.0").unwrap();
        let names: Vec<&str> = request.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["uv", "ruff", "nodejs"]);
        assert_eq!(request.len(), 3);
    }

    #[test]
    fn test_parse_list_rejects_whole_request() {
        assert!(Request::parse_list("uv;ruff==abc").is_err());
        assert!(Request::parse_list("").is_err());
        assert!(Request::parse_list("uv;;ruff").is_err());
    }
}
