//! Location of the proc filesystem

use std::path::{Path, PathBuf};

/// Default mount point of procfs
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Root of a proc filesystem.
///
/// Passed explicitly to every reader so tests and containers can point at a
/// different mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<pid>/<entry>`
    pub fn pid_path(&self, pid: i32, entry: &str) -> PathBuf {
        self.root.join(pid.to_string()).join(entry)
    }

    /// `<root>/self/<entry>`
    pub fn self_path(&self, entry: &str) -> PathBuf {
        self.root.join("self").join(entry)
    }

    /// `<root>/<entry>` for system-wide files like `meminfo`
    pub fn system_path(&self, entry: &str) -> PathBuf {
        self.root.join(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root() {
        assert_eq!(ProcFs::default().root(), Path::new("/proc"));
    }

    #[test]
    fn test_paths() {
        let procfs = ProcFs::new("/tmp/fakeproc");
        assert_eq!(
            procfs.pid_path(42, "stat"),
            PathBuf::from("/tmp/fakeproc/42/stat")
        );
        assert_eq!(
            procfs.self_path("task"),
            PathBuf::from("/tmp/fakeproc/self/task")
        );
        assert_eq!(
            procfs.system_path("meminfo"),
            PathBuf::from("/tmp/fakeproc/meminfo")
        );
    }
}
