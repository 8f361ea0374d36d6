//! Repository fetching

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod context;
pub mod git;

pub use context::{build_temp_repo_dir, RepoContext};
pub use git::{validate_repo_url, GitFetcher};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(
        "invalid repository URL '{0}': expected https://, http://, ssh://, git://, file:// or user@host:path"
    )]
    InvalidUrl(String),

    #[error("clone destination {} already exists and is not empty", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("clone of {url} timed out after {secs}s")]
    TimedOut { url: String, secs: u64 },

    #[error("failed cloning repository from {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("clone task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Populates a local directory from a repository URL.
///
/// Implementations must leave `dest` absent or empty on failure so that
/// collection yields zero files rather than a half-written tree.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}
