//! Stash home management and the top-level stash operations.

use crate::copy::{CopyStats, copy_tree, create_dir_all};
use crate::error::{Error, Result};
use crate::lock::StashLock;
use crate::name::{SHARD_LEVELS, StashName, derive, normalize, validate};
use crate::template::{TemplateData, expand_tree};
use crate::walk::{list_at_depth, walk};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory names never copied into a stash by default.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[".git"];

/// Depth below the home at which stash directories live.
pub const STASH_DEPTH: usize = SHARD_LEVELS + 1;

/// Options for [`StashHome::create_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// Directory names pruned from the source walk.
    pub skip_dirs: Vec<String>,
    /// Remove an existing stash of the same name before copying.
    pub replace: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            replace: false,
        }
    }
}

/// A directory holding sharded stashes.
///
/// There is no index: a stash exists iff its storage directory exists.
#[derive(Debug, Clone)]
pub struct StashHome {
    root: PathBuf,
}

impl StashHome {
    /// Use `root` as the stash home. Nothing is created until a stash is.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory of the home.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage directory for `name`, after validating it.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        Ok(StashName::parse(name)?.storage_path(&self.root))
    }

    /// Whether a stash named `name` is stored. Invalid names never exist.
    pub fn exists(&self, name: &str) -> bool {
        StashName::parse(name).is_ok_and(|n| n.storage_path(&self.root).is_dir())
    }

    /// Stash the tree at `source` as `name`, skipping `.git` directories.
    pub fn create(&self, name: &str, source: &Path) -> Result<CopyStats> {
        self.create_with(name, source, &CreateOptions::default())
    }

    /// Stash the tree at `source` as `name`.
    ///
    /// Without `replace`, files are written one by one over an existing stash
    /// and files missing from `source` stay in storage.
    pub fn create_with(
        &self,
        name: &str,
        source: &Path,
        options: &CreateOptions,
    ) -> Result<CopyStats> {
        let name = StashName::parse(name)?;
        let tree = walk(source, &options.skip_dirs)?;
        let dest = name.storage_path(&self.root);

        let lock = StashLock::acquire(&dest)?;
        if options.replace && dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        // The stash directory exists even when the source is empty
        create_dir_all(&dest)?;
        let stats = copy_tree(&tree, source, &dest)?;
        drop(lock);

        info!(
            name = %name,
            source = %source.display(),
            path = %dest.display(),
            files = stats.files,
            bytes = stats.bytes,
            "created stash"
        );
        Ok(stats)
    }

    /// Write the stash `name` into `working_dir`.
    ///
    /// With empty `data` files are copied as is; otherwise files whose stem
    /// has an entry are rendered as templates.
    pub fn expand(&self, name: &str, working_dir: &Path, data: &TemplateData) -> Result<CopyStats> {
        let normalized = normalize(name);
        let src = derive(&self.root, name);
        // Invalid names could resolve outside the home; no stash can have one
        if !validate(&normalized) || !src.is_dir() {
            return Err(Error::stash_not_exist(normalized));
        }

        let tree = walk(&src, std::iter::empty::<&str>())?;
        let stats = if data.is_empty() {
            copy_tree(&tree, &src, working_dir)?
        } else {
            expand_tree(&tree, &src, working_dir, data)?
        };

        info!(
            name = %normalized,
            dest = %working_dir.display(),
            files = stats.files,
            rendered = stats.rendered,
            "expanded stash"
        );
        Ok(stats)
    }

    /// Remove the stash `name`. Removing an absent stash succeeds.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let name = StashName::parse(name)?;
        let path = name.storage_path(&self.root);
        if !path.exists() {
            warn!(name = %name, "no stash to delete");
            return Ok(false);
        }

        let lock = StashLock::acquire(&path)?;
        match fs::remove_dir_all(&path) {
            Ok(()) => {}
            // Lost a race with another delete
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        drop(lock);

        info!(name = %name, path = %path.display(), "deleted stash");
        Ok(true)
    }

    /// Directory base names exactly `depth` levels below the home.
    pub fn list(&self, depth: usize) -> Result<Vec<String>> {
        list_at_depth(&self.root, depth)
    }

    /// Names of all stored stashes, sorted and deduplicated.
    pub fn stashes(&self) -> Result<Vec<String>> {
        let mut names = self.list(STASH_DEPTH)?;
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Stash `source` as `name` under `home`.
pub fn create(name: &str, source: &Path, home: &Path) -> Result<()> {
    StashHome::new(home).create(name, source).map(|_| ())
}

/// Expand the stash `name` from `home` into `working_dir`.
pub fn expand(name: &str, home: &Path, working_dir: &Path, data: &TemplateData) -> Result<()> {
    StashHome::new(home).expand(name, working_dir, data).map(|_| ())
}

/// Delete the stash `name` from `home`; absent stashes are not an error.
pub fn delete(name: &str, home: &Path) -> Result<()> {
    StashHome::new(home).delete(name).map(|_| ())
}

/// Directory base names exactly `depth` levels below `home`.
pub fn list(home: &Path, depth: usize) -> Result<Vec<String>> {
    StashHome::new(home).list(depth)
}
