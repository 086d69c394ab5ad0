// src/resolver/alias.rs

//! Names that must be spelled out explicitly
//!
//! Some attribute names in nixpkgs are alias roots for several concrete
//! packages (`python` could mean `python2` or `python3`). Requests naming
//! one are rejected before the index is consulted.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Alias roots and the concrete packages each stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    roots: BTreeMap<String, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::empty().with_root("python", ["python2", "python3"])
    }
}

impl AliasTable {
    /// A table with no alias roots
    pub fn empty() -> Self {
        Self {
            roots: BTreeMap::new(),
        }
    }

    pub fn with_root<I, S>(mut self, root: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(root, candidates);
        self
    }

    pub fn insert<I, S>(&mut self, root: impl Into<String>, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots
            .insert(root.into(), candidates.into_iter().map(Into::into).collect());
    }

    pub fn candidates(&self, name: &str) -> Option<&[String]> {
        self.roots.get(name).map(Vec::as_slice)
    }

    /// Fail with `AmbiguousPackage` if `name` is an alias root
    pub fn check(&self, name: &str) -> Result<()> {
        match self.roots.get(name) {
            Some(candidates) => Err(Error::AmbiguousPackage {
                name: name.to_string(),
                candidates: candidates.clone(),
            }),
            None => Ok(()),
        }
    }
}
