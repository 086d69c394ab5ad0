// src/error.rs

//! Error types shared by the index, ingestion pipeline and resolver

use thiserror::Error;

/// Errors produced by the wooper library
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed version text or package specifier
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Malformed constraint expression
    #[error("Invalid constraint: {0}")]
    ConstraintError(String),

    /// Requested name is an alias root for several concrete packages
    #[error("Ambiguous package `{name}`: use {}", format_candidates(.candidates))]
    AmbiguousPackage {
        name: String,
        candidates: Vec<String>,
    },

    /// The same package was requested twice
    #[error("Duplicate package: {0}")]
    DuplicatePackage(String),

    /// No indexed revision ever offered a matching version
    #[error("No revision offers a matching version of package {0}")]
    NoSatisfyingRevision(String),

    /// Request exceeds the pair bound
    #[error("Too many packages: {count} requested (max {max})")]
    TooManyPackages { count: usize, max: usize },

    /// Build history source could not be read; safe to retry with the same cursor
    #[error("Build source unavailable: {0}")]
    SourceUnavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Store or client initialization failed
    #[error("Initialization error: {0}")]
    InitError(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

fn format_candidates(candidates: &[String]) -> String {
    let quoted: Vec<String> = candidates.iter().map(|c| format!("`{c}`")).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => "a concrete package name".to_string(),
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_names_candidates() {
        let err = Error::AmbiguousPackage {
            name: "python".to_string(),
            candidates: vec!["python2".to_string(), "python3".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous package `python`: use `python2` or `python3`"
        );
    }

    #[test]
    fn test_too_many_packages_message() {
        let err = Error::TooManyPackages { count: 51, max: 50 };
        assert_eq!(err.to_string(), "Too many packages: 51 requested (max 50)");
    }
}
