//! Filesystem seam between the collectors and `/proc`.
//!
//! Everything the agent knows about processes comes through [`FileSystem`],
//! so the same collection code runs against the live procfs in production and
//! against [`MockFs`](crate::collector::mock::MockFs) in tests. Errors keep
//! their [`io::ErrorKind`]: the collectors map `NotFound` and
//! `PermissionDenied` to per-process error records.

use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of the files the collectors need.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory as full paths.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Resolves a symbolic link such as `/proc/[pid]/exe`.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        // cmdline may hold arbitrary bytes; a lossy string is good enough for logs.
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        // Entries vanish while /proc is being listed; drop them instead of failing.
        Ok(std::fs::read_dir(path)?
            .flatten()
            .map(|entry| entry.path())
            .collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        std::fs::write(&path, "Name:\tbash\n").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read_to_string(&path).unwrap(), "Name:\tbash\n");
    }

    #[test]
    fn test_real_fs_read_to_string_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdline");
        std::fs::write(&path, b"/bin/app\0\xff\0").unwrap();

        let content = RealFs::new().read_to_string(&path).unwrap();
        assert!(content.starts_with("/bin/app\0"));
    }

    #[test]
    fn test_real_fs_not_found_kind() {
        let err = RealFs::new()
            .read_to_string(Path::new("/nonexistent/path/12345"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_real_fs_exists_and_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("1")).unwrap();
        std::fs::create_dir(dir.path().join("42")).unwrap();

        let fs = RealFs::new();
        assert!(fs.exists(&dir.path().join("42")));
        assert!(!fs.exists(&dir.path().join("43")));

        let mut entries = fs.read_dir(dir.path()).unwrap();
        entries.sort();
        assert_eq!(entries, vec![dir.path().join("1"), dir.path().join("42")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_read_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("exe");
        std::os::unix::fs::symlink("/usr/bin/python3", &link).unwrap();

        let target = RealFs::new().read_link(&link).unwrap();
        assert_eq!(target, PathBuf::from("/usr/bin/python3"));
    }
}
