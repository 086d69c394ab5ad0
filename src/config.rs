// src/config.rs
//! Configuration file parsing
//!
//! Supports an optional TOML file with the following sections:
//! - [database] - Index database location
//! - [resolver] - Request size bound and per-pair candidate cap
//! - [ingest] - Build feed location, batching and retries
//! - [aliases] - Extra ambiguous package roots
//!
//! `WOOPER_DB` overrides the database path from the file; command-line
//! flags override both.

use crate::error::{Error, Result};
use crate::ingest::DEFAULT_RETRIES;
use crate::resolver::{AliasTable, DEFAULT_CANDIDATE_CAP, MAX_PACKAGES, MAX_PAIRS, ResolverOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding the database path
pub const DB_ENV: &str = "WOOPER_DB";

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "WOOPER_CONFIG";

/// Default index database location
pub const DEFAULT_DB_PATH: &str = "/var/lib/wooper/index.db";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WooperConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub ingest: IngestSection,

    /// Alias root -> concrete packages, added to the built-in table
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// Database configuration section
#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

/// Resolver configuration section
#[derive(Debug, Deserialize)]
pub struct ResolverSection {
    /// Largest accepted request
    #[serde(default = "default_max_packages")]
    pub max_packages: usize,

    /// Covering revisions kept per requested package
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            max_packages: default_max_packages(),
            candidate_cap: default_candidate_cap(),
        }
    }
}

fn default_max_packages() -> usize {
    MAX_PACKAGES
}

fn default_candidate_cap() -> usize {
    DEFAULT_CANDIDATE_CAP
}

/// Ingestion configuration section
#[derive(Debug, Deserialize)]
pub struct IngestSection {
    /// Paged JSON build feed
    #[serde(default)]
    pub feed_url: Option<String>,

    /// Name the feed cursor is stored under (defaults to the feed URL)
    #[serde(default)]
    pub source_name: Option<String>,

    /// Stop a run after this many batches (0 = no limit)
    #[serde(default)]
    pub max_batches: usize,

    /// Attempts per feed page
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            feed_url: None,
            source_name: None,
            max_batches: 0,
            retries: default_retries(),
        }
    }
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

impl WooperConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: WooperConfig = toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: WooperConfig =
            toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the file named by `WOOPER_CONFIG`, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(env_path) => Self::load(Path::new(&env_path)),
                None => Ok(Self::default()),
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.resolver.max_packages == 0 || self.resolver.max_packages > MAX_PAIRS {
            return Err(Error::ConfigError(format!(
                "resolver.max_packages must be between 1 and {}",
                MAX_PAIRS
            )));
        }
        if self.resolver.candidate_cap == 0 {
            return Err(Error::ConfigError(
                "resolver.candidate_cap must be at least 1".to_string(),
            ));
        }
        if self.ingest.retries == 0 {
            return Err(Error::ConfigError(
                "ingest.retries must be at least 1".to_string(),
            ));
        }
        for (root, candidates) in &self.aliases {
            if candidates.is_empty() {
                return Err(Error::ConfigError(format!(
                    "aliases.{} must list at least one package",
                    root
                )));
            }
        }
        Ok(())
    }

    /// Database path after applying `WOOPER_DB` and an explicit override
    pub fn db_path(&self, cli_override: Option<&str>) -> String {
        if let Some(path) = cli_override {
            return path.to_string();
        }
        match std::env::var(DB_ENV) {
            Ok(path) if !path.is_empty() => path,
            _ => self.database.path.clone(),
        }
    }

    /// Resolver options with configured aliases merged into the defaults
    pub fn resolver_options(&self) -> ResolverOptions {
        let mut aliases = AliasTable::default();
        for (root, candidates) in &self.aliases {
            aliases.insert(root.clone(), candidates.iter().cloned());
        }
        ResolverOptions {
            max_packages: self.resolver.max_packages,
            candidate_cap: self.resolver.candidate_cap,
            aliases,
        }
    }

    /// Batch cap for one ingestion run, if any
    pub fn max_batches(&self) -> Option<usize> {
        (self.ingest.max_batches > 0).then_some(self.ingest.max_batches)
    }
}
