//! In-memory listing of a walked directory tree.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Key under which files sitting directly in the walk root are listed.
pub const ROOT_KEY: &str = ".";

/// Relative directory path -> names of the regular files directly inside it.
///
/// Directories only ever appear as keys. The walk root is not a key of its
/// own unless it holds files, in which case they are listed under [`ROOT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    dirs: BTreeMap<PathBuf, Vec<OsString>>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `rel` is present, possibly with no files.
    pub fn ensure_dir(&mut self, rel: impl Into<PathBuf>) {
        self.dirs.entry(normalize_key(rel.into())).or_default();
    }

    /// Record `name` as a file directly inside `parent`.
    pub fn add_file(&mut self, parent: impl Into<PathBuf>, name: impl Into<OsString>) {
        self.dirs
            .entry(normalize_key(parent.into()))
            .or_default()
            .push(name.into());
    }

    /// Files recorded directly inside `rel`.
    pub fn files_in(&self, rel: &Path) -> Option<&[OsString]> {
        self.dirs.get(rel).map(Vec::as_slice)
    }

    /// All directory keys with their files, in path order.
    pub fn dirs(&self) -> impl Iterator<Item = (&Path, &[OsString])> {
        self.dirs
            .iter()
            .map(|(rel, files)| (rel.as_path(), files.as_slice()))
    }

    /// Every `(directory, file name)` pair.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &OsStr)> {
        self.dirs()
            .flat_map(|(rel, files)| files.iter().map(move |f| (rel, f.as_os_str())))
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.dirs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

fn normalize_key(rel: PathBuf) -> PathBuf {
    if rel.as_os_str().is_empty() {
        PathBuf::from(ROOT_KEY)
    } else {
        rel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.file_count(), 0);
        assert_eq!(tree.files().count(), 0);
    }

    #[test]
    fn test_root_files_use_dot_key() {
        let mut tree = Tree::new();
        tree.add_file("", "readme.txt");
        tree.add_file(".", "main.rs");

        let root = tree.files_in(Path::new(ROOT_KEY)).unwrap();
        assert_eq!(root, &[OsString::from("readme.txt"), OsString::from("main.rs")]);
        assert_eq!(tree.dir_count(), 1);
    }

    #[test]
    fn test_ensure_dir_keeps_existing_files() {
        let mut tree = Tree::new();
        tree.add_file("src", "lib.rs");
        tree.ensure_dir("src");
        tree.ensure_dir("empty");

        assert_eq!(tree.files_in(Path::new("src")).unwrap().len(), 1);
        assert_eq!(tree.files_in(Path::new("empty")).unwrap().len(), 0);
        assert_eq!(tree.dir_count(), 2);
        assert_eq!(tree.file_count(), 1);
    }

    #[test]
    fn test_files_iterates_every_pair() {
        let mut tree = Tree::new();
        tree.add_file("a", "1");
        tree.add_file("a", "2");
        tree.add_file("a/b", "3");
        tree.ensure_dir("c");

        let pairs: Vec<_> = tree
            .files()
            .map(|(dir, f)| dir.join(f))
            .collect();
        assert_eq!(
            pairs,
            vec![
                PathBuf::from("a/1"),
                PathBuf::from("a/2"),
                PathBuf::from("a/b/3"),
            ]
        );
    }
}
