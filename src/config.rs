//! Configuration loading and management.

use crate::autocomplete::{CompletionOptions, DEFAULT_TRIGGER, validate_trigger};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file contents. Every field is optional; unset fields fall back to
/// the defaults of [`CompletionOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Single character that starts a path reference (default `@`).
    pub trigger: Option<String>,

    /// Extra gitignore-syntax patterns excluded from completion.
    #[serde(alias = "ignorePatterns")]
    pub ignore_patterns: Option<Vec<String>>,

    #[serde(alias = "respectGitignore")]
    pub respect_gitignore: Option<bool>,

    #[serde(alias = "followSymlinks")]
    pub follow_symlinks: Option<bool>,

    #[serde(alias = "maxResults")]
    pub max_results: Option<usize>,
}

impl Config {
    /// Load configuration for a workspace rooted at `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = std::env::var_os("ATCOMPLETE_CONFIG_PATH").map(PathBuf::from);
        Self::load_with_roots(config_path.as_deref(), &Self::global_dir(), root)
    }

    /// Get the global configuration directory.
    pub fn global_dir() -> PathBuf {
        global_dir_from_env(env_lookup)
    }

    /// Get the project configuration directory, relative to the workspace root.
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".atcomplete")
    }

    /// Load settings from a specific path.
    fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse settings file {}: {e}",
                path.display()
            ))
        })?;
        Ok(config)
    }

    /// Load from an explicit file, or merge the global and project files.
    pub fn load_with_roots(
        config_path: Option<&Path>,
        global_dir: &Path,
        root: &Path,
    ) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_path(path);
        }

        let global = Self::load_from_path(&global_dir.join("settings.json"))?;
        let project = Self::load_from_path(&root.join(Self::project_dir()).join("settings.json"))?;
        Ok(Self::merge(global, project))
    }

    /// Merge two configurations, with `other` taking precedence.
    pub fn merge(base: Self, other: Self) -> Self {
        Self {
            trigger: other.trigger.or(base.trigger),
            ignore_patterns: other.ignore_patterns.or(base.ignore_patterns),
            respect_gitignore: other.respect_gitignore.or(base.respect_gitignore),
            follow_symlinks: other.follow_symlinks.or(base.follow_symlinks),
            max_results: other.max_results.or(base.max_results),
        }
    }

    // === Accessor methods with defaults ===

    pub fn trigger(&self) -> Result<char> {
        let Some(raw) = self.trigger.as_deref() else {
            return Ok(DEFAULT_TRIGGER);
        };
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(trigger), None) => {
                validate_trigger(trigger)?;
                Ok(trigger)
            }
            _ => Err(Error::config(format!(
                "Trigger must be exactly one character, got {raw:?}"
            ))),
        }
    }

    pub fn respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(true)
    }

    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(true)
    }

    pub fn max_results(&self) -> Option<usize> {
        match self.max_results {
            Some(0) => {
                tracing::warn!(
                    setting = "max_results",
                    "maxResults of 0 would hide every completion; ignoring"
                );
                None
            }
            other => other,
        }
    }

    /// Validate and resolve into engine options.
    pub fn completion_options(&self) -> Result<CompletionOptions> {
        let options = CompletionOptions {
            trigger: self.trigger()?,
            ignore_patterns: self.ignore_patterns.clone().unwrap_or_default(),
            respect_gitignore: self.respect_gitignore(),
            follow_symlinks: self.follow_symlinks(),
            max_results: self.max_results(),
        };
        options.validate()?;
        Ok(options)
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn global_dir_from_env<F>(get_env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    get_env("ATCOMPLETE_DIR").map_or_else(
        || {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".atcomplete")
        },
        PathBuf::from,
    )
}
