//! Exclusion rules applied while walking the workspace.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::walker::EntryKind;
use crate::error::{Error, Result};

/// Version-control metadata that is never offered as a completion.
pub const VCS_DIRECTORIES: &[&str] = &[".git", ".hg", ".svn", ".bzr", "_darcs", "CVS"];

/// Decides whether a walked entry is excluded. Excluded directories are not descended into.
pub trait IgnorePredicate {
    /// `rel_path` is root-relative and `/`-separated.
    fn is_ignored(&self, rel_path: &str, kind: EntryKind) -> bool;
}

impl<F> IgnorePredicate for F
where
    F: Fn(&str, EntryKind) -> bool,
{
    fn is_ignored(&self, rel_path: &str, kind: EntryKind) -> bool {
        self(rel_path, kind)
    }
}

/// VCS metadata plus gitignore-syntax patterns from the workspace's
/// `.gitignore` files and from configuration.
///
/// A `.gitignore` applies to the directory holding it and everything below;
/// the deepest file with a matching line decides. Configured patterns are
/// consulted first, so a configured `!pattern` can re-include an entry.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    root: PathBuf,
    respect_gitignore: bool,
    configured: Gitignore,
    /// Per-directory `.gitignore` matchers keyed by root-relative directory,
    /// loaded the first time an entry of that directory is checked.
    gitignores: RefCell<HashMap<String, Option<Gitignore>>>,
}

impl IgnoreRules {
    /// Rules that only exclude VCS metadata.
    pub fn vcs_only() -> Self {
        Self {
            root: PathBuf::new(),
            respect_gitignore: false,
            configured: Gitignore::empty(),
            gitignores: RefCell::default(),
        }
    }

    /// Build the rules for `root`.
    ///
    /// An invalid configured pattern is a configuration error. Problems in a
    /// workspace `.gitignore` are tolerated: the valid lines still apply.
    pub fn new(root: &Path, patterns: &[String], respect_gitignore: bool) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            respect_gitignore,
            configured: configured_matcher(root, patterns)?,
            gitignores: RefCell::default(),
        })
    }

    /// Check configured patterns without touching the filesystem.
    pub fn validate_patterns(patterns: &[String]) -> Result<()> {
        configured_matcher(Path::new(""), patterns).map(|_| ())
    }

    fn gitignore_verdict(&self, rel_path: &str, is_dir: bool) -> Match<()> {
        let mut dir = parent_of(rel_path);
        loop {
            let local = rel_path
                .strip_prefix(dir)
                .map_or(rel_path, |rest| rest.trim_start_matches('/'));
            let verdict = self.with_gitignore(dir, |gitignore| {
                match gitignore.matched(local, is_dir) {
                    Match::None => Match::None,
                    Match::Ignore(_) => Match::Ignore(()),
                    Match::Whitelist(_) => Match::Whitelist(()),
                }
            });
            if !verdict.is_none() || dir.is_empty() {
                return verdict;
            }
            dir = parent_of(dir);
        }
    }

    fn with_gitignore<F>(&self, dir: &str, check: F) -> Match<()>
    where
        F: FnOnce(&Gitignore) -> Match<()>,
    {
        let mut cache = self.gitignores.borrow_mut();
        let loaded = cache
            .entry(dir.to_string())
            .or_insert_with(|| load_gitignore(&self.root.join(dir)));
        loaded.as_ref().map_or(Match::None, check)
    }
}

impl IgnorePredicate for IgnoreRules {
    fn is_ignored(&self, rel_path: &str, kind: EntryKind) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        if VCS_DIRECTORIES.contains(&name) {
            return true;
        }
        let is_dir = kind == EntryKind::Directory;
        match self.configured.matched(rel_path, is_dir) {
            Match::Ignore(_) => return true,
            Match::Whitelist(_) => return false,
            Match::None => {}
        }
        self.respect_gitignore && self.gitignore_verdict(rel_path, is_dir).is_ignore()
    }
}

/// Configured patterns are parsed strictly: an unclosed `[` is an error here,
/// while a `.gitignore` line keeps git's literal reading.
fn configured_matcher(root: &Path, patterns: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    builder.allow_unclosed_class(false);
    for pattern in patterns {
        builder.add_line(None, pattern).map_err(|err| {
            Error::config(format!("Invalid ignore pattern {pattern:?}: {err}"))
        })?;
    }
    builder
        .build()
        .map_err(|err| Error::config(format!("Failed to build ignore rules: {err}")))
}

fn load_gitignore(dir: &Path) -> Option<Gitignore> {
    let path = dir.join(".gitignore");
    if !path.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(dir);
    if let Some(err) = builder.add(&path) {
        tracing::debug!(
            path = %path.display(),
            error = %err,
            "Ignoring malformed .gitignore lines"
        );
    }
    match builder.build() {
        Ok(gitignore) => Some(gitignore),
        Err(err) => {
            tracing::debug!(
                path = %path.display(),
                error = %err,
                "Skipping unusable .gitignore"
            );
            None
        }
    }
}

fn parent_of(rel_path: &str) -> &str {
    rel_path.rfind('/').map_or("", |idx| &rel_path[..idx])
}
