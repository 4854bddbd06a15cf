//! Path completion for `@`-triggered references in editor input.
//!
//! This module is rendering-agnostic: it takes editor text + cursor position
//! and returns ordered completions plus the range that should be replaced when
//! applying a selection.
//!
//! Nothing is cached between calls. Every request walks the workspace again,
//! parses the fragment under the cursor, matches it tier by tier and ranks the
//! result (see [`matcher`] and [`ranker`]).

mod format;
pub mod ignore_rules;
pub mod matcher;
pub mod query;
pub mod ranker;
pub mod walker;

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use format::format_candidate;
pub use ignore_rules::{IgnorePredicate, IgnoreRules, VCS_DIRECTORIES};
pub use matcher::{Match, Tier};
pub use query::{Parsed, ParsedQuery, Query};
pub use walker::{Candidate, DirectorySource, EntryKind, FsSource, MemoryTree, WalkOptions};

pub const DEFAULT_TRIGGER: char = '@';

/// Resolved engine settings. See [`crate::config::Config`] for the file form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOptions {
    pub trigger: char,
    /// Gitignore-syntax patterns excluded from the walk.
    pub ignore_patterns: Vec<String>,
    /// Honor the workspace root's `.gitignore`.
    pub respect_gitignore: bool,
    pub follow_symlinks: bool,
    /// Truncate the ranked list; `None` keeps everything.
    pub max_results: Option<usize>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER,
            ignore_patterns: Vec::new(),
            respect_gitignore: true,
            follow_symlinks: true,
            max_results: None,
        }
    }
}

impl CompletionOptions {
    pub fn validate(&self) -> Result<()> {
        validate_trigger(self.trigger)?;
        IgnoreRules::validate_patterns(&self.ignore_patterns)
    }
}

pub(crate) fn validate_trigger(trigger: char) -> Result<()> {
    if trigger.is_whitespace() || trigger == '/' || trigger == '\\' {
        return Err(Error::config(format!(
            "Trigger must be a visible character other than '/' and '\\', got {trigger:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Byte range of the `@token` under the cursor (empty at the cursor when
    /// there is nothing to complete).
    pub replace: Range<usize>,
    pub items: Vec<String>,
}

/// Completion engine bound to one workspace root.
#[derive(Debug, Clone)]
pub struct PathCompleter<S = FsSource> {
    root: PathBuf,
    options: CompletionOptions,
    source: S,
}

impl PathCompleter {
    /// Completer over the real filesystem with default options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: CompletionOptions::default(),
            source: FsSource,
        }
    }

    pub fn with_options(root: impl Into<PathBuf>, options: CompletionOptions) -> Result<Self> {
        Self::with_source(root, options, FsSource)
    }
}

impl<S: DirectorySource> PathCompleter<S> {
    /// Completer reading the tree through `source`.
    pub fn with_source(
        root: impl Into<PathBuf>,
        options: CompletionOptions,
        source: S,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            root: root.into(),
            options,
            source,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Ordered completions for `text` with the cursor at character offset `cursor`.
    ///
    /// Text without a trigger before the cursor yields no completions. A cursor
    /// past the end of `text` (by more than one position) is an
    /// [`Error::InvalidInput`].
    pub fn complete(&self, text: &str, cursor: usize) -> Result<Vec<String>> {
        Ok(self.suggest(text, cursor)?.items)
    }

    /// Like [`Self::complete`], also reporting the range a selection replaces.
    pub fn suggest(&self, text: &str, cursor: usize) -> Result<CompletionResponse> {
        let (at, parsed) = self.locate(text, cursor)?;
        let Some(parsed) = parsed else {
            return Ok(CompletionResponse {
                replace: at..at,
                items: Vec::new(),
            });
        };

        let ignore = IgnoreRules::new(
            &self.root,
            &self.options.ignore_patterns,
            self.options.respect_gitignore,
        )?;
        Ok(self.resolve(&parsed, &ignore))
    }

    /// Like [`Self::suggest`] with a host-supplied exclusion predicate in place
    /// of the configured ignore rules.
    pub fn suggest_with_ignore<P>(
        &self,
        text: &str,
        cursor: usize,
        ignore: &P,
    ) -> Result<CompletionResponse>
    where
        P: IgnorePredicate + ?Sized,
    {
        let (at, parsed) = self.locate(text, cursor)?;
        match parsed {
            Some(parsed) => Ok(self.resolve(&parsed, ignore)),
            None => Ok(CompletionResponse {
                replace: at..at,
                items: Vec::new(),
            }),
        }
    }

    fn locate(&self, text: &str, cursor: usize) -> Result<(usize, Option<ParsedQuery>)> {
        let at = query::cursor_byte_offset(text, cursor)?;
        match query::parse_at_byte(text, at, self.options.trigger) {
            Parsed::Found(parsed) => Ok((at, Some(parsed))),
            Parsed::NoTrigger => Ok((at, None)),
        }
    }

    fn resolve<P>(&self, parsed: &ParsedQuery, ignore: &P) -> CompletionResponse
    where
        P: IgnorePredicate + ?Sized,
    {
        let walk_options = WalkOptions {
            follow_symlinks: self.options.follow_symlinks,
        };
        let candidates = walker::walk(&self.root, &self.source, ignore, walk_options);
        let matches = matcher::match_all(&parsed.query, &candidates);
        let match_count = matches.len();
        let ranked = ranker::rank(&candidates, matches);

        let limit = self.options.max_results.unwrap_or(usize::MAX);
        let items: Vec<String> = ranked
            .iter()
            .take(limit)
            .map(|entry| format_candidate(self.options.trigger, &candidates[entry.candidate]))
            .collect();

        tracing::debug!(
            fragment = %parsed.fragment,
            candidates = candidates.len(),
            matches = match_count,
            results = items.len(),
            "Path completion"
        );

        CompletionResponse {
            replace: parsed.replace.clone(),
            items,
        }
    }
}

/// One-shot completion over the real filesystem with default options.
pub fn complete(root: &Path, text: &str, cursor: usize) -> Result<Vec<String>> {
    PathCompleter::new(root).complete(text, cursor)
}
