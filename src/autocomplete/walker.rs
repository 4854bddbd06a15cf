//! Pre-order traversal of the workspace tree.
//!
//! Every directory's entries are sorted by name (byte order, files and
//! directories interleaved) before any child is visited, so the index an
//! entry receives here is stable for a fixed tree. That index is the
//! traversal rank the ranker uses to break ties.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::ignore_rules::IgnorePredicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One `(name, kind)` pair as reported by a [`DirectorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
    pub is_symlink: bool,
}

/// Read-only view of a directory tree.
///
/// [`FsSource`] reads the real filesystem; [`MemoryTree`] serves a synthetic
/// tree for hosts and tests that need deterministic input.
pub trait DirectorySource {
    /// List the entries of `dir`. Kinds follow symlinks.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Resolve `path` to its real location, following every symlink.
    fn real_path(&self, path: &Path) -> io::Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DirectorySource for FsSource {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            // Entries can vanish between readdir and stat.
            let Ok(entry) = entry else {
                continue;
            };
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_symlink = entry.file_type().is_ok_and(|ty| ty.is_symlink());
            let Ok(meta) = fs::metadata(entry.path()) else {
                // Dangling symlink.
                continue;
            };
            let kind = if meta.is_dir() {
                EntryKind::Directory
            } else if meta.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(DirEntryInfo {
                name,
                kind,
                is_symlink,
            });
        }
        Ok(entries)
    }

    fn real_path(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

/// A walked filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Root-relative path, always `/`-separated.
    pub path: String,
    pub kind: EntryKind,
    /// Pre-order index; unique within one walk.
    pub rank: usize,
    /// Rank of the containing directory, `None` for entries at the root.
    pub parent: Option<usize>,
}

impl Candidate {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of path segments (`README.md` is 1, `bloom/acp` is 2).
    pub fn depth(&self) -> usize {
        self.path.split('/').count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

/// Walk `root` and return every non-ignored entry in pre-order.
///
/// Unreadable directories contribute no children. A directory whose real path
/// was already visited (a symlink cycle, or a second link to the same place)
/// is emitted but not descended into.
pub fn walk<S, P>(root: &Path, source: &S, ignore: &P, options: WalkOptions) -> Vec<Candidate>
where
    S: DirectorySource + ?Sized,
    P: IgnorePredicate + ?Sized,
{
    let mut walker = Walker {
        source,
        ignore,
        options,
        visited: HashSet::new(),
        out: Vec::new(),
    };

    match source.real_path(root) {
        Ok(real) => {
            walker.visited.insert(real);
        }
        Err(err) => {
            tracing::debug!(root = %root.display(), error = %err, "Cannot resolve workspace root");
        }
    }

    walker.visit(root, "", None);
    walker.out
}

struct Walker<'a, S: ?Sized, P: ?Sized> {
    source: &'a S,
    ignore: &'a P,
    options: WalkOptions,
    visited: HashSet<PathBuf>,
    out: Vec<Candidate>,
}

impl<S, P> Walker<'_, S, P>
where
    S: DirectorySource + ?Sized,
    P: IgnorePredicate + ?Sized,
{
    fn visit(&mut self, dir: &Path, rel_dir: &str, parent: Option<usize>) {
        let mut entries = match self.source.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(
                    dir = %dir.display(),
                    error = %err,
                    "Skipping unreadable directory"
                );
                return;
            }
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries {
            let rel = if rel_dir.is_empty() {
                entry.name.clone()
            } else {
                format!("{rel_dir}/{}", entry.name)
            };
            if self.ignore.is_ignored(&rel, entry.kind) {
                continue;
            }

            let path = dir.join(&entry.name);
            let mut descend = entry.kind == EntryKind::Directory
                && (self.options.follow_symlinks || !entry.is_symlink);
            if descend {
                match self.source.real_path(&path) {
                    Ok(real) => {
                        if !self.visited.insert(real) {
                            tracing::trace!(path = %rel, "Not descending into visited directory");
                            descend = false;
                        }
                    }
                    Err(err) => {
                        tracing::debug!(path = %rel, error = %err, "Cannot resolve directory");
                        descend = false;
                    }
                }
            }

            let rank = self.out.len();
            self.out.push(Candidate {
                path: rel.clone(),
                kind: entry.kind,
                rank,
                parent,
            });

            if descend {
                self.visit(&path, &rel, Some(rank));
            }
        }
    }
}

/// In-memory [`DirectorySource`] rooted at an arbitrary (possibly nonexistent)
/// path. Symlinked directories resolve to their target, and directories can be
/// marked unreadable.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    root: PathBuf,
    dirs: BTreeMap<PathBuf, Vec<DirEntryInfo>>,
    links: HashMap<PathBuf, PathBuf>,
    unreadable: HashSet<PathBuf>,
}

impl MemoryTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut dirs = BTreeMap::new();
        dirs.insert(root.clone(), Vec::new());
        Self {
            root,
            dirs,
            links: HashMap::new(),
            unreadable: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a file, creating missing parent directories.
    #[must_use]
    pub fn file(mut self, rel: &str) -> Self {
        let path = self.ensure_parents(rel);
        self.add_entry(&path, EntryKind::File, false);
        self
    }

    /// Add a (possibly empty) directory, creating missing parents.
    #[must_use]
    pub fn dir(mut self, rel: &str) -> Self {
        let path = self.ensure_parents(rel);
        self.add_entry(&path, EntryKind::Directory, false);
        self.dirs.entry(path).or_default();
        self
    }

    /// Add a symlink at `rel` pointing to the directory `target` (both root-relative).
    #[must_use]
    pub fn symlink_dir(mut self, rel: &str, target: &str) -> Self {
        let path = self.ensure_parents(rel);
        self.add_entry(&path, EntryKind::Directory, true);
        let target = self.root.join(target);
        self.links.insert(path, target);
        self
    }

    /// Make listing `rel` fail with `PermissionDenied`.
    #[must_use]
    pub fn unreadable(mut self, rel: &str) -> Self {
        self.unreadable.insert(self.root.join(rel));
        self
    }

    fn ensure_parents(&mut self, rel: &str) -> PathBuf {
        let mut current = self.root.clone();
        let segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return current;
        };
        for segment in parents {
            let next = current.join(segment);
            if !self.dirs.contains_key(&next) {
                self.add_entry(&next, EntryKind::Directory, false);
                self.dirs.insert(next.clone(), Vec::new());
            }
            current = next;
        }
        current.join(last)
    }

    fn add_entry(&mut self, path: &Path, kind: EntryKind, is_symlink: bool) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy().into_owned();
        let entries = self.dirs.entry(parent.to_path_buf()).or_default();
        if !entries.iter().any(|entry| entry.name == name) {
            entries.push(DirEntryInfo {
                name,
                kind,
                is_symlink,
            });
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let mut resolved = PathBuf::new();
        for component in path.components() {
            resolved.push(component);
            // Bounded so a link pointing at itself cannot spin.
            for _ in 0..self.links.len() {
                match self.links.get(&resolved) {
                    Some(target) => resolved.clone_from(target),
                    None => break,
                }
            }
        }
        resolved
    }
}

impl DirectorySource for MemoryTree {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let real = self.resolve(dir);
        if self.unreadable.contains(&real) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", dir.display()),
            ));
        }
        self.dirs.get(&real).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            )
        })
    }

    fn real_path(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.resolve(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nothing_ignored(_: &str, _: EntryKind) -> bool {
        false
    }

    fn paths(candidates: &[Candidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| {
                if c.is_dir() {
                    format!("{}/", c.path)
                } else {
                    c.path.clone()
                }
            })
            .collect()
    }

    fn walk_tree(tree: &MemoryTree) -> Vec<Candidate> {
        walk(tree.root(), tree, &nothing_ignored, WalkOptions::default())
    }

    #[test]
    fn walks_in_sorted_pre_order_with_dirs_interleaved() {
        let tree = MemoryTree::new("/ws")
            .file("zeta.txt")
            .file("bloom/cli/main.py")
            .file("bloom/acp/agent.py")
            .file("README.md")
            .file("bloom/__init__.py");

        assert_eq!(
            paths(&walk_tree(&tree)),
            vec![
                "README.md",
                "bloom/",
                "bloom/__init__.py",
                "bloom/acp/",
                "bloom/acp/agent.py",
                "bloom/cli/",
                "bloom/cli/main.py",
                "zeta.txt",
            ]
        );
    }

    #[test]
    fn ranks_and_parents_follow_traversal() {
        let tree = MemoryTree::new("/ws").file("a/b.txt").file("c.txt");
        let candidates = walk_tree(&tree);

        assert_eq!(candidates.len(), 3);
        for (idx, candidate) in candidates.iter().enumerate() {
            assert_eq!(candidate.rank, idx);
        }
        assert_eq!(candidates[0].parent, None);
        assert_eq!(candidates[1].parent, Some(0));
        assert_eq!(candidates[2].parent, None);
        assert_eq!(candidates[1].depth(), 2);
        assert_eq!(candidates[1].name(), "b.txt");
    }

    #[test]
    fn unreadable_directory_is_listed_but_empty() {
        let tree = MemoryTree::new("/ws")
            .file("locked/secret.txt")
            .file("open/visible.txt")
            .unreadable("locked");

        assert_eq!(
            paths(&walk_tree(&tree)),
            vec!["locked/", "open/", "open/visible.txt"]
        );
    }

    #[test]
    fn unreadable_root_yields_nothing() {
        let tree = MemoryTree::new("/ws").file("a.txt").unreadable("");
        assert!(walk_tree(&tree).is_empty());
    }

    #[test]
    fn symlink_cycle_is_not_descended() {
        let tree = MemoryTree::new("/ws")
            .file("a/file.txt")
            .symlink_dir("a/loop", "a");

        assert_eq!(paths(&walk_tree(&tree)), vec!["a/", "a/file.txt", "a/loop/"]);
    }

    #[test]
    fn second_link_to_visited_directory_is_not_descended() {
        let tree = MemoryTree::new("/ws")
            .file("real/inner.txt")
            .symlink_dir("zlink", "real");

        assert_eq!(paths(&walk_tree(&tree)), vec!["real/", "real/inner.txt", "zlink/"]);
    }

    #[test]
    fn link_sorting_first_keeps_its_target_listed() {
        let tree = MemoryTree::new("/ws")
            .file("zz_target/inner.txt")
            .symlink_dir("alias", "zz_target");

        assert_eq!(
            paths(&walk_tree(&tree)),
            vec!["alias/", "alias/inner.txt", "zz_target/"]
        );
    }

    #[test]
    fn symlinked_directory_is_not_descended_without_follow() {
        let tree = MemoryTree::new("/ws")
            .file("zz_target/inner.txt")
            .symlink_dir("alias", "zz_target");
        let options = WalkOptions {
            follow_symlinks: false,
        };

        let candidates = walk(tree.root(), &tree, &nothing_ignored, options);
        assert_eq!(
            paths(&candidates),
            vec!["alias/", "zz_target/", "zz_target/inner.txt"]
        );
    }

    #[test]
    fn ignored_directories_are_not_descended() {
        let tree = MemoryTree::new("/ws")
            .file(".git/HEAD")
            .file("node_modules/pkg/index.js")
            .file("src/lib.rs");
        let ignore = |rel: &str, kind: EntryKind| {
            kind == EntryKind::Directory && (rel == ".git" || rel == "node_modules")
        };

        let candidates = walk(tree.root(), &tree, &ignore, WalkOptions::default());
        assert_eq!(paths(&candidates), vec!["src/", "src/lib.rs"]);
    }

    #[test]
    fn fs_source_walks_real_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(tmp.path().join("src/bin")).expect("mkdir");
        std::fs::write(tmp.path().join("src/lib.rs"), "").expect("write");
        std::fs::write(tmp.path().join("src/bin/main.rs"), "").expect("write");
        std::fs::write(tmp.path().join("Cargo.toml"), "").expect("write");

        let candidates = walk(tmp.path(), &FsSource, &nothing_ignored, WalkOptions::default());
        assert_eq!(
            paths(&candidates),
            vec!["Cargo.toml", "src/", "src/bin/", "src/bin/main.rs", "src/lib.rs"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn fs_source_skips_dangling_symlinks_and_stops_cycles() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(tmp.path().join("a")).expect("mkdir");
        std::fs::write(tmp.path().join("a/keep.txt"), "").expect("write");
        std::os::unix::fs::symlink(tmp.path().join("a"), tmp.path().join("a/back"))
            .expect("symlink");
        std::os::unix::fs::symlink(tmp.path().join("missing"), tmp.path().join("dangling"))
            .expect("symlink");

        let candidates = walk(tmp.path(), &FsSource, &nothing_ignored, WalkOptions::default());
        assert_eq!(paths(&candidates), vec!["a/", "a/back/", "a/keep.txt"]);
    }
}
