//! Filesystem walking: tree enumeration and fixed-depth directory listing.

use crate::error::{Error, Result};
use crate::tree::Tree;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Enumerate `root` into a [`Tree`], pruning directories named in `skip_dirs`.
///
/// The skip set applies below `root` only: walking a directory that is
/// itself named `.git` with `.git` skipped still lists its contents.
///
/// Symlinks are never descended into. A symlink that resolves to a regular
/// file is listed like a file; anything else behind a symlink is ignored.
pub fn walk<I, S>(root: &Path, skip_dirs: I) -> Result<Tree>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if !root.exists() {
        return Err(Error::not_found(root));
    }
    if !root.is_dir() {
        return Err(Error::Io {
            source: std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("Not a directory: {}", root.display()),
            ),
        });
    }

    let skip: HashSet<OsString> = skip_dirs
        .into_iter()
        .map(|s| OsString::from(s.as_ref()))
        .collect();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false) // Stash everything, dotfiles and ignored files included
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let pruned = entry.depth() > 0 && is_dir && skip.contains(entry.file_name());
            if pruned {
                debug!(path = %entry.path().display(), "skipping directory");
            }
            !pruned
        })
        .build();

    let mut tree = Tree::new();

    for entry in walker {
        let entry = entry?;

        // Skip the root itself
        if entry.depth() == 0 {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::walk(format!("{}: {}", entry.path().display(), e)))?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            tree.ensure_dir(rel);
            continue;
        }

        let is_file = if file_type.is_symlink() {
            fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
        } else {
            file_type.is_file()
        };
        if !is_file {
            debug!(path = %entry.path().display(), "ignoring non-regular entry");
            continue;
        }

        let parent = rel.parent().unwrap_or_else(|| Path::new(""));
        tree.add_file(parent, entry.file_name());
    }

    Ok(tree)
}

/// Base names of the directories exactly `depth` levels below `root`, sorted by path.
///
/// Depth 0 yields nothing. A missing `root` holds no directories and yields nothing.
pub fn list_at_depth(root: &Path, depth: usize) -> Result<Vec<String>> {
    if depth == 0 || !root.exists() {
        return Ok(Vec::new());
    }

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut names = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.depth() != depth || !entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    Ok(names)
}
