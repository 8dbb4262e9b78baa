//! Advisory per-stash locks.
//!
//! Create and delete hold an exclusive `flock` on `<shard dir>/<name>.lock`
//! so two processes cannot rewrite or remove the same stash at once. The
//! lock sits beside the stash directory, never inside it, and is a plain
//! file, so directory listings of the store never report it.
//!
//! Lock files are never deleted. A waiter blocked on a removed file would
//! hold a lock nobody else can see.

use crate::copy::create_dir_all;
use crate::error::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An exclusive lock on one stash, released when dropped.
#[derive(Debug)]
pub struct StashLock {
    file: File,
    path: PathBuf,
}

impl StashLock {
    /// Path of the lock file guarding `storage_path`.
    pub fn path_for(storage_path: &Path) -> PathBuf {
        let mut name = storage_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        storage_path.with_file_name(name)
    }

    /// Block until the lock for `storage_path` is held.
    ///
    /// Creates the shard directories if needed.
    pub fn acquire(storage_path: &Path) -> Result<Self> {
        let path = Self::path_for(storage_path);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()?;
        debug!(lock = %path.display(), "acquired stash lock");

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StashLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_sits_beside_stash() {
        let path = StashLock::path_for(Path::new("/home/AA/BB/CC/DD/myname"));
        assert_eq!(path, PathBuf::from("/home/AA/BB/CC/DD/myname.lock"));
    }

    #[test]
    fn test_acquire_creates_shard_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let storage = temp_dir.path().join("AA/BB/CC/DD/myname");

        let lock = StashLock::acquire(&storage).unwrap();
        assert!(lock.path().is_file());
        assert!(!storage.exists());
    }

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let storage = temp_dir.path().join("AA/myname");

        let lock = StashLock::acquire(&storage).unwrap();
        let other = File::open(lock.path()).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[test]
    fn test_waiter_stays_exclusive_across_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = temp_dir.path().join("AA/myname");
        fs::create_dir_all(&storage).unwrap();

        let first = StashLock::acquire(&storage).unwrap();
        let waiter = {
            let storage = storage.clone();
            thread::spawn(move || StashLock::acquire(&storage).unwrap())
        };
        thread::sleep(Duration::from_millis(50));

        // What delete does while holding the lock
        fs::remove_dir_all(&storage).unwrap();
        drop(first);

        let second = waiter.join().unwrap();
        assert!(second.path().is_file());
        let third = File::open(StashLock::path_for(&storage)).unwrap();
        assert!(third.try_lock_exclusive().is_err());

        drop(second);
        assert!(third.try_lock_exclusive().is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_acquire_creates_permissive_shard_dirs() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let storage = temp_dir.path().join("AA/BB/myname");
        StashLock::acquire(&storage).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        // Same mode as directories the copier creates under the same umask
        let copied = temp_dir.path().join("copied");
        create_dir_all(&copied).unwrap();
        assert_eq!(mode(&temp_dir.path().join("AA/BB")), mode(&copied));
        assert_ne!(mode(&temp_dir.path().join("AA")) & 0o100, 0);
    }
}
