//! Property tests for ordering and membership invariants of completion results.

use std::collections::HashSet;

use atcomplete::autocomplete::matcher::match_all;
use atcomplete::autocomplete::walker::walk;
use atcomplete::autocomplete::{
    CompletionOptions, EntryKind, MemoryTree, PathCompleter, Query, WalkOptions,
};
use proptest::prelude::*;

const NAMES: &[&str] = &[
    "acp", "agent.py", "auto", "bloom", "cli", "core", "docs", "entry.rs", "fuzzy.py", "lib.rs",
    "main.rs", "src", "test_fuzzy.py", "README.md",
];

/// Random relative file paths built from a small vocabulary so that queries hit.
fn tree_paths() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(NAMES), 1..4).prop_map(|parts| parts.join("/")),
        1..24,
    )
}

fn build(paths: &[String]) -> MemoryTree {
    let mut tree = MemoryTree::new("/ws");
    let mut dirs = HashSet::new();
    for path in paths {
        let mut prefix = String::new();
        for part in path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);
            dirs.insert(prefix.clone());
        }
    }
    // A path is a file unless something lives beneath it.
    for path in paths {
        let is_parent = dirs.iter().any(|d| {
            d.len() > path.len() && d.starts_with(path.as_str()) && d.as_bytes()[path.len()] == b'/'
        });
        tree = if is_parent { tree.dir(path) } else { tree.file(path) };
    }
    tree
}

fn query() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(NAMES).prop_map(|name| name.to_string()),
        "[a-z]{1,4}",
        "[a-z]{1,3}/[a-z]{0,3}",
    ]
}

fn nothing_ignored(_: &str, _: EntryKind) -> bool {
    false
}

fn completer(tree: MemoryTree) -> PathCompleter<MemoryTree> {
    PathCompleter::with_source("/ws", CompletionOptions::default(), tree).expect("completer")
}

proptest! {
    #[test]
    fn results_are_trigger_prefixed_unique_and_exist(paths in tree_paths(), q in query()) {
        let text = format!("@{q}");
        let cursor = text.chars().count();
        let items = completer(build(&paths)).complete(&text, cursor).expect("complete");

        let mut seen = HashSet::new();
        for item in &items {
            prop_assert!(item.starts_with('@'));
            prop_assert!(seen.insert(item.clone()), "duplicate {item}");
            if !item.ends_with('/') {
                let rel = &item[1..];
                prop_assert!(paths.iter().any(|p| p == rel), "{item} is not a file of the tree");
            }
        }
    }

    #[test]
    fn completion_is_idempotent(paths in tree_paths(), q in query()) {
        let text = format!("@{q}");
        let cursor = text.chars().count();
        let completer = completer(build(&paths));

        let first = completer.complete(&text, cursor).expect("complete");
        let second = completer.complete(&text, cursor).expect("complete");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn exact_path_match_comes_first(paths in tree_paths(), pick in any::<prop::sample::Index>()) {
        let target = pick.get(&paths).clone();
        let text = format!("@{target}");
        let cursor = text.chars().count();
        let items = completer(build(&paths)).complete(&text, cursor).expect("complete");

        prop_assert!(!items.is_empty());
        let first = items[0].trim_start_matches('@').trim_end_matches('/');
        prop_assert_eq!(first, target.as_str());
    }

    #[test]
    fn matched_directories_bring_all_direct_children(paths in tree_paths(), q in query()) {
        let text = format!("@{q}");
        let cursor = text.chars().count();
        let tree = build(&paths);
        let candidates = walk(tree.root(), &tree, &nothing_ignored, WalkOptions::default());
        let matched_dirs: Vec<&str> = match_all(&Query::from_fragment(&q), &candidates)
            .iter()
            .map(|m| &candidates[m.candidate])
            .filter(|candidate| candidate.is_dir())
            .map(|candidate| candidate.path.as_str())
            .collect();

        let items = completer(tree.clone()).complete(&text, cursor).expect("complete");
        let listed: HashSet<&str> = items.iter().map(String::as_str).collect();

        for dir in matched_dirs {
            let shown_dir = format!("@{dir}/");
            prop_assert!(listed.contains(shown_dir.as_str()), "{dir} missing from {items:?}");
            let children = candidates
                .iter()
                .filter(|c| c.parent.is_some_and(|p| candidates[p].path == dir));
            for child in children {
                let shown = if child.is_dir() {
                    format!("@{}/", child.path)
                } else {
                    format!("@{}", child.path)
                };
                prop_assert!(
                    listed.contains(shown.as_str()),
                    "child {shown} of {dir} missing from {items:?}"
                );
            }
        }
    }
}
