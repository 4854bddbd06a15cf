//! Common test infrastructure for atcomplete integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway workspace on the real filesystem.
pub struct Workspace {
    dir: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create tempdir"),
        }
    }

    /// The tree used throughout the completion scenarios.
    pub fn bloom() -> Self {
        Self::new()
            .file("bloom/acp/entrypoint.py")
            .file("bloom/acp/agent.py")
            .file("bloom/cli/autocompletion/fuzzy.py")
            .file("bloom/cli/autocompletion/completers.py")
            .file("tests/autocompletion/test_fuzzy.py")
            .file("README.md")
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    #[must_use]
    pub fn file(self, rel: &str) -> Self {
        self.write(rel, "")
    }

    #[must_use]
    pub fn write(self, rel: &str, contents: &str) -> Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write file");
        self
    }

    #[must_use]
    pub fn dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.path(rel)).expect("create dir");
        self
    }
}
