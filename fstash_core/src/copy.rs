//! Materializing a walked tree from one root into another.

use crate::error::Result;
use crate::tree::{ROOT_KEY, Tree};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Permission bits for created files and directories.
#[cfg(unix)]
const PERMISSIVE_MODE: u32 = 0o777;

/// Counters for one copy or expand pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    pub dirs: usize,
    pub files: usize,
    pub bytes: u64,
    /// Files that went through the template renderer.
    pub rendered: usize,
}

/// What to write for one file.
pub(crate) enum Content {
    Verbatim(Vec<u8>),
    Rendered(Vec<u8>),
}

/// Copy every file of `tree` from `src_root` to `dest_root`.
///
/// Missing directories are created, existing files are overwritten. The
/// first failure aborts the copy and leaves what was already written.
pub fn copy_tree(tree: &Tree, src_root: &Path, dest_root: &Path) -> Result<CopyStats> {
    copy_with(tree, src_root, dest_root, |_, content| {
        Ok(Content::Verbatim(content))
    })
}

/// Walk `tree` pairwise, passing each source file's bytes through `transform`.
pub(crate) fn copy_with<F>(
    tree: &Tree,
    src_root: &Path,
    dest_root: &Path,
    mut transform: F,
) -> Result<CopyStats>
where
    F: FnMut(&Path, Vec<u8>) -> Result<Content>,
{
    let mut stats = CopyStats::default();

    for (rel, files) in tree.dirs() {
        // create_dir_all fails on a trailing "." when the parent is missing
        let (src_dir, dest_dir) = if rel == Path::new(ROOT_KEY) {
            (src_root.to_path_buf(), dest_root.to_path_buf())
        } else {
            (src_root.join(rel), dest_root.join(rel))
        };
        create_dir_all(&dest_dir)?;
        stats.dirs += 1;

        for name in files {
            let src = src_dir.join(name);
            let dest = dest_dir.join(name);

            let content = fs::read(&src)?;
            let payload = match transform(&src, content)? {
                Content::Verbatim(bytes) => bytes,
                Content::Rendered(bytes) => {
                    stats.rendered += 1;
                    bytes
                }
            };

            write_file(&dest, &payload)?;
            debug!(src = %src.display(), dest = %dest.display(), bytes = payload.len(), "copied file");

            stats.files += 1;
            stats.bytes += payload.len() as u64;
        }
    }

    Ok(stats)
}

/// Create a directory and its ancestors.
#[cfg(unix)]
pub(crate) fn create_dir_all(path: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(PERMISSIVE_MODE)
        .create(path)?;
    Ok(())
}

/// Create a directory and its ancestors (non-Unix fallback).
#[cfg(not(unix))]
pub(crate) fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Create or truncate `path` and write `payload` to it.
fn write_file(path: &Path, payload: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PERMISSIVE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(payload)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::walk;
    use tempfile::TempDir;

    #[test]
    fn test_copy_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::create_dir_all(src.join("empty")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("a/b/deep.bin"), [0u8, 159, 146, 150]).unwrap();

        let tree = walk(&src, Vec::<String>::new()).unwrap();
        let stats = copy_tree(&tree, &src, &dest).unwrap();

        assert_eq!(fs::read(dest.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(dest.join("a/b/deep.bin")).unwrap(), [0u8, 159, 146, 150]);
        assert!(dest.join("empty").is_dir());
        assert_eq!(stats.files, 2);
        assert_eq!(stats.bytes, 7);
        assert_eq!(stats.rendered, 0);
    }

    #[test]
    fn test_copy_overwrites_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("file.txt"), b"new").unwrap();
        fs::write(dest.join("file.txt"), b"much longer old content").unwrap();
        fs::write(dest.join("other.txt"), b"untouched").unwrap();

        let tree = walk(&src, Vec::<String>::new()).unwrap();
        copy_tree(&tree, &src, &dest).unwrap();

        assert_eq!(fs::read(dest.join("file.txt")).unwrap(), b"new");
        assert_eq!(fs::read(dest.join("other.txt")).unwrap(), b"untouched");
    }

    #[test]
    fn test_copy_missing_source_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();

        let mut tree = Tree::new();
        tree.add_file(".", "vanished.txt");

        let err = copy_tree(&tree, &src, &dest).unwrap_err();
        assert!(matches!(err, crate::Error::Io { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_copy_creates_permissive_files() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("run.sh"), b"#!/bin/sh\n").unwrap();

        let tree = walk(&src, Vec::<String>::new()).unwrap();
        copy_tree(&tree, &src, &dest).unwrap();

        // Subject to the process umask, but execute bits survive a typical 022
        let mode = fs::metadata(dest.join("run.sh")).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0);
    }
}
