//! Clone directory ownership

use std::env;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A local checkout of the repository being queried.
///
/// When `is_temp` is set the directory is removed recursively on drop.
/// Removal is best-effort; failures are ignored.
#[derive(Debug)]
pub struct RepoContext {
    pub root_path: PathBuf,
    pub is_temp: bool,
}

impl RepoContext {
    pub fn new(root_path: PathBuf, is_temp: bool) -> Self {
        Self { root_path, is_temp }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }
}

impl Drop for RepoContext {
    fn drop(&mut self) {
        if self.is_temp && self.root_path.exists() {
            if let Err(err) = std::fs::remove_dir_all(&self.root_path) {
                tracing::debug!("Ignoring cleanup failure for {}: {err}", self.root_path.display());
            }
        }
    }
}

/// A fresh, not-yet-created directory under the system temp dir.
pub fn build_temp_repo_dir() -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let pid = std::process::id();
    env::temp_dir().join(format!("repo-ask-{pid}-{nanos}"))
}
