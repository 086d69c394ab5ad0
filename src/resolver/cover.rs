// src/resolver/cover.rs

//! Minimum revision cover
//!
//! Each requested pair is covered by some set of revisions. Picking the
//! fewest revisions that together cover every pair is set cover, so the
//! resolver does not promise an optimum. It runs:
//!
//! 1. A single-revision check: if one revision covers everything, that is
//!    provably minimal.
//! 2. Greedy selection: repeatedly take the revision covering the most
//!    still-uncovered pairs.
//! 3. Local merge: while two selected revisions can be replaced by one,
//!    replace them.
//!
//! Pairs are tracked as bits of a `u64`, so at most [`MAX_PAIRS`] pairs fit
//! in one problem.

use crate::db::models::Revision;
use serde::Serialize;
use std::collections::HashMap;

/// Upper bound on pairs in one cover problem
pub const MAX_PAIRS: usize = 64;

/// Bitset of pair indices
pub(crate) type PairSet = u64;

/// How a solution was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// One revision covers every pair
    SingleRevision,
    /// Greedy selection followed by `merges` successful local merges
    GreedyCover { merges: usize },
}

/// A revision and the pairs it covers
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub revision: Revision,
    pub covers: PairSet,
}

/// Outcome of a cover search: for every pair, the index of its candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cover {
    pub assignment: Vec<usize>,
    pub strategy: Strategy,
}

pub(crate) fn full_set(pair_count: usize) -> PairSet {
    if pair_count >= MAX_PAIRS {
        PairSet::MAX
    } else {
        (1 << pair_count) - 1
    }
}

/// Turn per-pair covering revisions into candidates ordered by recency
///
/// `covering` holds, for every pair, all revisions offering its target,
/// newest first. Only the newest `cap` revisions of each pair enter the
/// pool, plus the newest revision covering every pair if one exists, so the
/// single-revision check never depends on the cap. Coverage bits always
/// come from the complete lists: a revision cut from one pair's list still
/// covers that pair when another pair brings it into the pool.
///
/// The result is sorted newest first, then by identifier, so "lower index"
/// means "preferred on a tie".
pub(crate) fn build_candidates(covering: &[Vec<Revision>], cap: usize) -> Vec<Candidate> {
    let all = full_set(covering.len());

    let mut covers: HashMap<&str, PairSet> = HashMap::new();
    for (pair, revisions) in covering.iter().enumerate() {
        for revision in revisions {
            *covers.entry(revision.id.as_str()).or_default() |= 1 << pair;
        }
    }

    let mut pool: HashMap<&str, &Revision> = HashMap::new();
    for revisions in covering {
        for revision in revisions.iter().take(cap.max(1)) {
            pool.entry(revision.id.as_str()).or_insert(revision);
        }
    }
    if let Some(single) = covering.first().and_then(|revisions| {
        revisions
            .iter()
            .filter(|r| covers.get(r.id.as_str()) == Some(&all))
            .min_by(|a, b| a.recency_cmp(b))
    }) {
        pool.entry(single.id.as_str()).or_insert(single);
    }

    let mut candidates: Vec<Candidate> = pool
        .into_values()
        .map(|revision| Candidate {
            covers: covers.get(revision.id.as_str()).copied().unwrap_or_default(),
            revision: revision.clone(),
        })
        .collect();

    candidates.sort_by(|a, b| a.revision.recency_cmp(&b.revision));
    candidates
}

/// Find a small set of candidates covering all `pair_count` pairs
///
/// Fails with the index of the first pair no candidate covers.
pub(crate) fn solve(candidates: &[Candidate], pair_count: usize) -> Result<Cover, usize> {
    let all = full_set(pair_count);

    if let Some(single) = candidates.iter().position(|c| c.covers & all == all) {
        return Ok(Cover {
            assignment: vec![single; pair_count],
            strategy: Strategy::SingleRevision,
        });
    }

    let mut selected = greedy(candidates, all)?;
    let merges = local_merge(candidates, &mut selected);

    Ok(Cover {
        assignment: assign(candidates, &selected, pair_count),
        strategy: Strategy::GreedyCover { merges },
    })
}

fn greedy(candidates: &[Candidate], all: PairSet) -> Result<Vec<usize>, usize> {
    let mut uncovered = all;
    let mut selected = Vec::new();

    while uncovered != 0 {
        let mut best: Option<(usize, u32)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let gain = (candidate.covers & uncovered).count_ones();
            // Strictly greater keeps the earlier, more recent candidate on ties
            if gain > 0 && best.is_none_or(|(_, best_gain)| gain > best_gain) {
                best = Some((idx, gain));
            }
        }

        match best {
            Some((idx, _)) => {
                selected.push(idx);
                uncovered &= !candidates[idx].covers;
            }
            None => return Err(uncovered.trailing_zeros() as usize),
        }
    }

    Ok(selected)
}

/// Replace pairs of selected candidates by a single one while possible
///
/// Every merge shrinks the selection, so the loop runs at most
/// `selected.len()` times.
fn local_merge(candidates: &[Candidate], selected: &mut Vec<usize>) -> usize {
    let mut merges = 0;

    'search: loop {
        for i in 0..selected.len() {
            for j in (i + 1)..selected.len() {
                let (a, b) = (selected[i], selected[j]);
                let others = selected
                    .iter()
                    .filter(|&&idx| idx != a && idx != b)
                    .fold(0, |acc, &idx| acc | candidates[idx].covers);
                let needed = (candidates[a].covers | candidates[b].covers) & !others;

                let replacement = if needed == 0 {
                    None
                } else {
                    match candidates.iter().position(|c| c.covers & needed == needed) {
                        Some(idx) => Some(idx),
                        None => continue,
                    }
                };

                selected.retain(|&idx| idx != a && idx != b);
                if let Some(idx) = replacement
                    && !selected.contains(&idx)
                {
                    selected.push(idx);
                }
                merges += 1;
                continue 'search;
            }
        }
        break;
    }

    merges
}

/// Give each pair the most recent selected candidate that covers it
fn assign(candidates: &[Candidate], selected: &[usize], pair_count: usize) -> Vec<usize> {
    let mut ordered = selected.to_vec();
    ordered.sort_unstable();

    (0..pair_count)
        .map(|pair| {
            ordered
                .iter()
                .copied()
                .find(|&idx| candidates[idx].covers & (1 << pair) != 0)
                .unwrap_or_default()
        })
        .collect()
}
