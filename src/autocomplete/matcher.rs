//! Tiered matching of a [`Query`] against walked candidates.
//!
//! Tiers are tried best-first and the first one that qualifies wins:
//!
//! | Tier | Rule |
//! |------|------|
//! | [`Tier::Exact`] | the whole query equals the relative path (file extension optional) |
//! | [`Tier::Name`] | the active component equals the name or file stem |
//! | [`Tier::Prefix`] | the active component is a prefix of the name |
//! | [`Tier::Subsequence`] | the active component's characters appear in order in the stem |
//!
//! Anchors are matched against the ancestor segments directly above the name
//! (prefix matching for the name and prefix tiers, subsequence matching for the
//! subsequence tier). Matching is case-sensitive.

use super::query::Query;
use super::walker::{Candidate, EntryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Exact = 0,
    Name = 1,
    Prefix = 2,
    Subsequence = 3,
}

impl Tier {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

/// How much of the path a subsequence match used.
///
/// `Spanning` means the active component started in the parent directory's
/// name and finished in the file stem; it sorts ahead of `Local`. Every
/// non-subsequence match is `Local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Span {
    Spanning,
    Local,
}

/// Orders matches that share a tier. Field order is comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TieBreakKey {
    pub span: Span,
    /// Segment count; shallower entries first.
    pub depth: usize,
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Traversal rank of the matched candidate.
    pub candidate: usize,
    pub tier: Tier,
    pub key: TieBreakKey,
}

impl Match {
    pub const fn sort_key(&self) -> (Tier, TieBreakKey) {
        (self.tier, self.key)
    }
}

/// Match every candidate, keeping those that qualify for some tier.
pub fn match_all(query: &Query, candidates: &[Candidate]) -> Vec<Match> {
    candidates
        .iter()
        .filter_map(|candidate| match_candidate(query, candidate))
        .collect()
}

pub fn match_candidate(query: &Query, candidate: &Candidate) -> Option<Match> {
    let segments: Vec<&str> = candidate.path.split('/').collect();
    let (&name, ancestors) = segments.split_last()?;
    let stem = match candidate.kind {
        EntryKind::File => file_stem(name),
        EntryKind::Directory => name,
    };
    let active = query.active();
    let anchors = query.anchors();
    let rooted = query.is_rooted();

    let found = |tier, span| Match {
        candidate: candidate.rank,
        tier,
        key: TieBreakKey {
            span,
            depth: segments.len(),
            rank: candidate.rank,
        },
    };

    if !active.is_empty() && is_exact(query, candidate, stem) {
        return Some(found(Tier::Exact, Span::Local));
    }

    let prefix_anchors = || anchors_align(anchors, ancestors, rooted, is_segment_prefix);

    if !active.is_empty() && (active == name || active == stem) && prefix_anchors() {
        return Some(found(Tier::Name, Span::Local));
    }

    // A listing (`dir/`) names the directory it lists, so the segment before
    // the slash must equal the parent rather than prefix it.
    let lists_parent = || {
        !query.is_listing()
            || anchors
                .last()
                .zip(ancestors.last())
                .is_none_or(|(anchor, parent)| anchor == parent)
    };

    if name.starts_with(active) && prefix_anchors() && lists_parent() {
        return Some(found(Tier::Prefix, Span::Local));
    }

    if active.is_empty() {
        return None;
    }

    if candidate.kind == EntryKind::File && spans_parent(active, stem, ancestors, anchors, rooted) {
        return Some(found(Tier::Subsequence, Span::Spanning));
    }

    if is_subsequence(active, stem) && anchors_align(anchors, ancestors, rooted, is_subsequence) {
        return Some(found(Tier::Subsequence, Span::Local));
    }

    None
}

fn is_exact(query: &Query, candidate: &Candidate, stem: &str) -> bool {
    let joined = query.joined();
    if joined == candidate.path {
        return true;
    }
    if candidate.kind != EntryKind::File {
        return false;
    }
    let name_len = candidate.name().len();
    let dir = &candidate.path[..candidate.path.len() - name_len];
    joined.len() == dir.len() + stem.len() && joined.starts_with(dir) && joined.ends_with(stem)
}

/// Match anchors, right to left, against the ancestor segments ending at the
/// immediate parent. A rooted query must consume every ancestor.
fn anchors_align(
    anchors: &[String],
    ancestors: &[&str],
    rooted: bool,
    matches: fn(&str, &str) -> bool,
) -> bool {
    if anchors.len() > ancestors.len() || (rooted && anchors.len() != ancestors.len()) {
        return false;
    }
    let aligned = &ancestors[ancestors.len() - anchors.len()..];
    anchors
        .iter()
        .zip(aligned)
        .all(|(anchor, segment)| matches(anchor, segment))
}

/// Try the spanning form: the active component begins as a subsequence of the
/// parent directory's name and ends as a subsequence of the stem, with a
/// non-empty part on each side.
fn spans_parent(
    active: &str,
    stem: &str,
    ancestors: &[&str],
    anchors: &[String],
    rooted: bool,
) -> bool {
    let Some((parent, above)) = ancestors.split_last() else {
        return false;
    };
    let chars: Vec<char> = active.chars().collect();
    if chars.len() < 2 {
        return false;
    }

    // Taking as much as possible from the parent leaves the easiest tail.
    let split = subsequence_prefix_len(&chars, parent).min(chars.len() - 1);
    if split == 0 {
        return false;
    }
    let tail: String = chars[split..].iter().collect();
    is_subsequence(&tail, stem) && anchors_align(anchors, above, rooted, is_subsequence)
}

fn is_segment_prefix(anchor: &str, segment: &str) -> bool {
    segment.starts_with(anchor)
}

/// Whether `needle`'s characters occur in `haystack` in order.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars();
    needle
        .chars()
        .all(|wanted| remaining.by_ref().any(|ch| ch == wanted))
}

/// Length of the longest prefix of `needle` that is a subsequence of `haystack`.
fn subsequence_prefix_len(needle: &[char], haystack: &str) -> usize {
    let mut matched = 0;
    for ch in haystack.chars() {
        if matched == needle.len() {
            break;
        }
        if ch == needle[matched] {
            matched += 1;
        }
    }
    matched
}

/// File name without its final extension. Dotfiles keep their full name.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}
