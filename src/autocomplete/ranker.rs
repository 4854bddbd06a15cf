//! Ordering of matches, with one-level expansion of matched directories.

use super::matcher::{Match, Tier};
use super::walker::Candidate;

/// A candidate in its final position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    /// Traversal rank (index into the walked candidates).
    pub candidate: usize,
    pub tier: Tier,
    /// Listed because its parent directory matched rather than on its own.
    pub inherited: bool,
}

/// Order `matches` by `(tier, tie-break key)` and expand directories.
///
/// Each matched directory is followed immediately by its direct children in
/// traversal order, every child carrying the directory's tier. A candidate is
/// emitted only the first time it comes up, so its best position wins.
/// Expansion does not recurse into child directories.
pub fn rank(candidates: &[Candidate], mut matches: Vec<Match>) -> Vec<Ranked> {
    matches.sort_by_key(Match::sort_key);

    let children = child_index(candidates);
    let mut emitted = vec![false; candidates.len()];
    let mut ranked = Vec::with_capacity(matches.len());

    for found in &matches {
        if !emitted[found.candidate] {
            emitted[found.candidate] = true;
            ranked.push(Ranked {
                candidate: found.candidate,
                tier: found.tier,
                inherited: false,
            });
        }

        if !candidates[found.candidate].is_dir() {
            continue;
        }
        for &child in &children[found.candidate] {
            if emitted[child] {
                continue;
            }
            emitted[child] = true;
            ranked.push(Ranked {
                candidate: child,
                tier: found.tier,
                inherited: true,
            });
        }
    }

    ranked
}

/// Direct children of every candidate, in traversal order.
fn child_index(candidates: &[Candidate]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); candidates.len()];
    for candidate in candidates {
        if let Some(parent) = candidate.parent {
            children[parent].push(candidate.rank);
        }
    }
    children
}
