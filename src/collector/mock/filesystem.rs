//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! Clones of a `MockFs` share one tree, so a test can hand a clone to a
//! collector and keep mutating the process table (for example removing a
//! pid between enumeration and collection).

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tree {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Symbolic links and their targets.
    links: HashMap<PathBuf, PathBuf>,
    /// Paths that exist but fail with `PermissionDenied`.
    denied: HashSet<PathBuf>,
}

impl Tree {
    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        Ok(())
    }
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found: {:?}", what, path))
}

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    tree: Arc<RwLock<Tree>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds (or replaces) a file. Parent directories are created.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.write();
        tree.add_parents(&path);
        tree.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.write();
        tree.add_parents(&path);
        tree.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    pub fn add_link(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.write();
        tree.add_parents(&path);
        tree.links.insert(path, target.as_ref().to_path_buf());
    }

    /// Makes every read of `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.write().denied.insert(path.as_ref().to_path_buf());
    }

    /// Removes `path` and everything below it, like a process exiting.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut tree = self.write();
        tree.files.retain(|p, _| !p.starts_with(path));
        tree.directories.retain(|p| !p.starts_with(path));
        tree.links.retain(|p, _| !p.starts_with(path));
    }

    /// Adds a process with the `/proc/[pid]/` entries the sampler reads.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `stat` - Content of `/proc/[pid]/stat`
    /// * `status` - Content of `/proc/[pid]/status`
    /// * `cmdline` - Content of `/proc/[pid]/cmdline`
    /// * `exe` - Target of `/proc/[pid]/exe`; `None` for kernel threads
    /// * `tids` - Entries of `/proc/[pid]/task/`
    pub fn add_process(
        &self,
        pid: u32,
        stat: &str,
        status: &str,
        cmdline: &str,
        exe: Option<&str>,
        tids: &[u32],
    ) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("status"), status);
        self.add_file(base.join("cmdline"), cmdline);
        if let Some(exe) = exe {
            self.add_link(base.join("exe"), exe);
        }
        for tid in tids {
            self.add_dir(base.join("task").join(tid.to_string()));
        }
    }

    /// Removes `/proc/[pid]` entirely.
    pub fn kill(&self, pid: u32) {
        self.remove(format!("/proc/{}", pid));
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let tree = self.read();
        tree.check_access(path)?;
        tree.files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("file", path))
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.read();
        tree.files.contains_key(path)
            || tree.directories.contains(path)
            || tree.links.contains_key(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let tree = self.read();
        tree.check_access(path)?;
        if !tree.directories.contains(path) {
            return Err(not_found("directory", path));
        }

        let is_child = |p: &PathBuf| p.parent() == Some(path);
        let entries: HashSet<PathBuf> = tree
            .files
            .keys()
            .chain(tree.directories.iter())
            .chain(tree.links.keys())
            .filter(|p| is_child(*p))
            .cloned()
            .collect();

        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        let tree = self.read();
        tree.check_access(path)?;
        tree.links
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("link", path))
    }
}
