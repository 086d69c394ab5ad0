// src/resolver/mod.rs

//! Revision resolution
//!
//! Given a request such as `uv~=0.5.0;ruff`, find a small set of nixpkgs
//! revisions that together provide every requested package.
//!
//! For each (package, constraint) pair the resolver first fixes a target
//! version: the highest version satisfying the constraint among everything
//! the index has ever recorded for that package. A revision covers the pair
//! when it offers exactly that target. Coverage is then handed to the cover
//! search in [`cover`], and every pair is finally pinned to the most recent
//! chosen revision that covers it.

mod alias;
mod cover;
mod request;

pub use alias::AliasTable;
pub use cover::{MAX_PAIRS, Strategy};
pub use request::{MAX_PACKAGES, PackageSpec, Request};

use crate::error::{Error, Result};
use crate::index::{PackageIndex, Revision};
use crate::version::{Constraint, Version, best_match};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Default number of covering revisions considered per pair
pub const DEFAULT_CANDIDATE_CAP: usize = 256;

/// Tunables for a [`Resolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Largest request accepted
    pub max_packages: usize,
    /// Most recent covering revisions per pair offered to the cover search
    ///
    /// A revision covering every pair is considered regardless of the cap.
    pub candidate_cap: usize,
    pub aliases: AliasTable,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_packages: MAX_PACKAGES,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            aliases: AliasTable::default(),
        }
    }
}

/// A requested pair pinned to a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub package: String,
    #[serde(serialize_with = "serialize_display")]
    pub constraint: Constraint,
    pub version: Version,
    pub revision: Revision,
}

fn serialize_display<S: serde::Serializer>(
    value: &Constraint,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Result of resolving a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// One entry per requested pair, in request order
    pub assignments: Vec<Assignment>,
    pub strategy: Strategy,
}

impl Solution {
    /// Distinct revisions in order of first use by the request
    pub fn revisions(&self) -> Vec<&Revision> {
        let mut seen = HashSet::new();
        self.assignments
            .iter()
            .map(|a| &a.revision)
            .filter(|r| seen.insert(r.id.as_str()))
            .collect()
    }

    pub fn revision_count(&self) -> usize {
        self.revisions().len()
    }

    /// The assignment for a requested package
    pub fn assignment(&self, package: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.package == package)
    }

    /// True when no smaller set of revisions can exist
    ///
    /// A single revision is trivially minimal. Two revisions are minimal
    /// once the single-revision check has failed.
    pub fn is_certified_minimal(&self) -> bool {
        match self.strategy {
            Strategy::SingleRevision => true,
            Strategy::GreedyCover { .. } => self.revision_count() <= 2,
        }
    }
}

/// Resolves requests against a package index
pub struct Resolver<'a> {
    index: &'a dyn PackageIndex,
    options: ResolverOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a dyn PackageIndex) -> Self {
        Self::with_options(index, ResolverOptions::default())
    }

    pub fn with_options(index: &'a dyn PackageIndex, options: ResolverOptions) -> Self {
        Self { index, options }
    }

    /// Parse raw specifiers into a request, checking the size bound before
    /// any specifier is parsed
    pub fn parse_request<I, S>(&self, raw: I) -> Result<Request>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = raw.into_iter().collect();
        self.check_size(raw.len())?;
        Request::parse(raw)
    }

    /// Resolve every pair of `request` to a revision
    pub fn resolve(&self, request: &Request) -> Result<Solution> {
        self.validate(request)?;

        let specs = request.specs();
        let mut targets = Vec::with_capacity(specs.len());
        let mut covering = Vec::with_capacity(specs.len());

        for spec in specs {
            let (target, revisions) = self.covering_revisions(spec)?;
            debug!(
                "{}: target {} offered by {} revision(s)",
                spec,
                target,
                revisions.len()
            );
            targets.push(target);
            covering.push(revisions);
        }

        let candidates = cover::build_candidates(&covering, self.options.candidate_cap);
        let cover = cover::solve(&candidates, specs.len())
            .map_err(|pair| Error::NoSatisfyingRevision(specs[pair].name.clone()))?;

        let assignments: Vec<Assignment> = specs
            .iter()
            .zip(targets)
            .zip(&cover.assignment)
            .map(|((spec, version), &idx)| Assignment {
                package: spec.name.clone(),
                constraint: spec.constraint.clone(),
                version,
                revision: candidates[idx].revision.clone(),
            })
            .collect();

        let solution = Solution {
            assignments,
            strategy: cover.strategy,
        };
        info!(
            "Resolved {} package(s) to {} revision(s) ({:?})",
            specs.len(),
            solution.revision_count(),
            solution.strategy
        );
        Ok(solution)
    }

    /// Resolve one package to the most recent revision offering its best
    /// matching version
    ///
    /// Returns `None` when no recorded version satisfies the constraint.
    pub fn resolve_one(&self, spec: &PackageSpec) -> Result<Option<Assignment>> {
        self.options.aliases.check(&spec.name)?;

        let versions = self.index.versions_of(&spec.name)?;
        let Some(target) = best_match(&spec.constraint, versions.iter().map(|(_, v)| v)) else {
            return Ok(None);
        };

        Ok(versions
            .into_iter()
            .find(|(_, version)| *version == target)
            .map(|(revision, _)| Assignment {
                package: spec.name.clone(),
                constraint: spec.constraint.clone(),
                version: target,
                revision,
            }))
    }

    /// Checks that need no index access
    fn validate(&self, request: &Request) -> Result<()> {
        if request.is_empty() {
            return Err(Error::ParseError("No packages requested".to_string()));
        }

        self.check_size(request.len())?;

        let mut seen = HashSet::new();
        for spec in request.specs() {
            self.options.aliases.check(&spec.name)?;
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::DuplicatePackage(spec.name.clone()));
            }
        }

        Ok(())
    }

    fn check_size(&self, count: usize) -> Result<()> {
        let max = self.options.max_packages.min(MAX_PAIRS);
        if count > max {
            return Err(Error::TooManyPackages { count, max });
        }
        Ok(())
    }

    /// Target version for a pair and every revision offering it, newest first
    fn covering_revisions(&self, spec: &PackageSpec) -> Result<(Version, Vec<Revision>)> {
        let versions = self.index.versions_of(&spec.name)?;
        let target = best_match(&spec.constraint, versions.iter().map(|(_, v)| v))
            .ok_or_else(|| Error::NoSatisfyingRevision(spec.name.clone()))?;

        let mut seen = HashSet::new();
        let revisions: Vec<Revision> = versions
            .into_iter()
            .filter(|(_, version)| *version == target)
            .map(|(revision, _)| revision)
            .filter(|revision| seen.insert(revision.id.clone()))
            .collect();

        if revisions.len() > self.options.candidate_cap {
            debug!(
                "{}: considering the newest {} of {} covering revisions",
                spec.name,
                self.options.candidate_cap,
                revisions.len()
            );
        }

        Ok((target, revisions))
    }
}
