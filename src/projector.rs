// src/projector.rs

//! Grouping of a solution by revision
//!
//! Renderers (flake inputs, shell snippets, JSON) want one block per
//! revision listing the packages taken from it. Groups follow the order in
//! which the request first uses each revision, and are named `nixpkgs-0`,
//! `nixpkgs-1`, ...

use crate::index::Revision;
use crate::resolver::Solution;
use crate::version::Version;
use serde::Serialize;

/// Prefix of generated input names
pub const INPUT_PREFIX: &str = "nixpkgs";

/// A package taken from a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedPackage {
    pub name: String,
    pub version: Version,
}

/// Packages that come from one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionGroup {
    pub revision: Revision,
    /// Name for this revision as a flake input
    pub input: String,
    /// Packages in request order
    pub packages: Vec<PinnedPackage>,
}

/// Group the assignments of `solution` by revision
pub fn project(solution: &Solution) -> Vec<RevisionGroup> {
    let mut groups: Vec<RevisionGroup> = Vec::new();

    for assignment in &solution.assignments {
        let package = PinnedPackage {
            name: assignment.package.clone(),
            version: assignment.version.clone(),
        };

        match groups
            .iter_mut()
            .find(|g| g.revision.id == assignment.revision.id)
        {
            Some(group) => group.packages.push(package),
            None => {
                let input = format!("{}-{}", INPUT_PREFIX, groups.len());
                groups.push(RevisionGroup {
                    revision: assignment.revision.clone(),
                    input,
                    packages: vec![package],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Assignment, Strategy};
    use crate::version::Constraint;

    fn assignment(package: &str, version: &str, rev: &str, ts: i64) -> Assignment {
        Assignment {
            package: package.to_string(),
            constraint: Constraint::Any,
            version: Version::parse(version).unwrap(),
            revision: Revision::new(rev, ts),
        }
    }

    #[test]
    fn test_groups_follow_first_use() {
        let solution = Solution {
            assignments: vec![
                assignment("uv", "0.5.0", "r1", 100),
                assignment("ruff", "0.11.10", "r2", 200),
                assignment("nodejs", "20.0.0", "r1", 100),
            ],
            strategy: Strategy::GreedyCover { merges: 0 },
        };

        let groups = project(&solution);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].revision.id, "r1");
        assert_eq!(groups[0].input, "nixpkgs-0");
        let names: Vec<&str> = groups[0].packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["uv", "nodejs"]);

        assert_eq!(groups[1].revision.id, "r2");
        assert_eq!(groups[1].input, "nixpkgs-1");
        assert_eq!(groups[1].packages[0].version.to_string(), "0.11.10");
    }

    #[test]
    fn test_serializes_for_renderers() {
        let solution = Solution {
            assignments: vec![assignment("ruff", "0.11.10", "r2", 200)],
            strategy: Strategy::SingleRevision,
        };
        let json = serde_json::to_value(project(&solution)).unwrap();
        assert_eq!(json[0]["input"], "nixpkgs-0");
        assert_eq!(json[0]["revision"]["id"], "r2");
        assert_eq!(json[0]["packages"][0]["name"], "ruff");
        assert_eq!(json[0]["packages"][0]["version"], "0.11.10");
    }

    #[test]
    fn test_empty_solution() {
        let solution = Solution {
            assignments: Vec::new(),
            strategy: Strategy::SingleRevision,
        };
        assert!(project(&solution).is_empty());
    }
}
