//! Repository cloning through libgit2

use crate::fetch::{FetchError, RepoFetcher};
use async_trait::async_trait;
use git2::build::RepoBuilder;
use git2::{ErrorCode, FetchOptions, RemoteCallbacks, Repository};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const ALLOWED_SCHEMES: &[&str] = &["https://", "http://", "ssh://", "git://", "file://"];

/// Clones with `git2`, so the URL is handed to libgit2 as a value and never
/// reaches a shell.
pub struct GitFetcher {
    timeout: Duration,
}

impl GitFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl RepoFetcher for GitFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let url = validate_repo_url(url)?;
        let dest = dest.to_path_buf();
        let timeout = self.timeout;

        // Set when this future finishes or is dropped, so an abandoned worker
        // stops at its next callback and removes what it wrote.
        let cancel = CancelOnDrop(Arc::new(AtomicBool::new(false)));
        let flag = Arc::clone(&cancel.0);
        let worker_url = url.clone();
        let worker = tokio::task::spawn_blocking(move || {
            clone_with_cancel(&worker_url, &dest, timeout, &flag)
        });

        // libgit2 only checks the deadline while objects are transferring; a
        // server that never answers is caught here.
        match tokio::time::timeout(timeout, worker).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::debug!("Abandoning clone of {url} after {}s", timeout.as_secs());
                Err(FetchError::TimedOut { url, secs: timeout.as_secs() })
            }
        }
    }
}

struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Check the URL scheme and return the normalized clone URL.
///
/// Accepts `https`, `http`, `ssh`, `git` and `file` URLs plus scp-style
/// `user@host:path`. Anything that could be read as a git option is rejected.
pub fn validate_repo_url(url: &str) -> Result<String, FetchError> {
    let trimmed = url.trim();
    let invalid = || FetchError::InvalidUrl(trimmed.to_string());

    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let lower = trimmed.to_ascii_lowercase();
    let has_scheme =
        ALLOWED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len());
    if !has_scheme && !is_scp_like(trimmed) {
        return Err(invalid());
    }

    Ok(normalize_github_url(trimmed))
}

fn is_scp_like(url: &str) -> bool {
    if url.contains("://") {
        return false;
    }
    let Some((user_host, path)) = url.split_once(':') else {
        return false;
    };
    let Some((user, host)) = user_host.split_once('@') else {
        return false;
    };
    !user.is_empty() && !host.is_empty() && !host.contains('/') && !path.is_empty()
}

/// Normalize a GitHub URL to the canonical `.git` form.
///
/// - `https://github.com/owner/repo`  → `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo/` → `https://github.com/owner/repo.git`
/// - non-GitHub URLs                  → trailing slash stripped only
fn normalize_github_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.contains("github.com") && !trimmed.ends_with(".git") {
        format!("{trimmed}.git")
    } else {
        trimmed.to_string()
    }
}

/// Clone `url` into `dest`, shallow first, then full.
///
/// `dest` must be absent or empty. Both attempts share one deadline.
pub fn clone_repository(url: &str, dest: &Path, timeout: Duration) -> Result<(), FetchError> {
    clone_with_cancel(url, dest, timeout, &AtomicBool::new(false))
}

/// Like [`clone_repository`], but also aborts once `cancelled` is set. A
/// cancelled run leaves `dest` as it found it, even if the clone completed.
fn clone_with_cancel(
    url: &str,
    dest: &Path,
    timeout: Duration,
    cancelled: &AtomicBool,
) -> Result<(), FetchError> {
    if is_non_empty_dir(dest) {
        return Err(FetchError::DestinationNotEmpty(dest.to_path_buf()));
    }

    let existed = dest.exists();
    let deadline = Instant::now() + timeout;
    let result = shallow_clone(url, dest, deadline, cancelled).or_else(|err| {
        if err.code() == ErrorCode::User || cancelled.load(Ordering::SeqCst) {
            return Err(err);
        }
        tracing::debug!("Shallow clone of {url} failed ({err}); retrying with a full clone");
        clear_partial_clone(dest, existed);
        full_clone(url, dest, deadline, cancelled)
    });

    if cancelled.load(Ordering::SeqCst) {
        clear_partial_clone(dest, existed);
        return Err(FetchError::TimedOut { url: url.to_string(), secs: timeout.as_secs() });
    }

    match result {
        Ok(_repo) => {
            tracing::info!("Cloned {url} into {}", dest.display());
            Ok(())
        }
        Err(err) if err.code() == ErrorCode::User => {
            clear_partial_clone(dest, existed);
            Err(FetchError::TimedOut { url: url.to_string(), secs: timeout.as_secs() })
        }
        Err(source) => Err(FetchError::Clone { url: url.to_string(), source }),
    }
}

fn shallow_clone(
    url: &str,
    dest: &Path,
    deadline: Instant,
    cancelled: &AtomicBool,
) -> Result<Repository, git2::Error> {
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(deadline, cancelled, Some(1)));
    builder.clone(url, dest)
}

fn full_clone(
    url: &str,
    dest: &Path,
    deadline: Instant,
    cancelled: &AtomicBool,
) -> Result<Repository, git2::Error> {
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(deadline, cancelled, None));
    builder.clone(url, dest)
}

/// Returning `false` from the progress callback aborts the transfer with
/// `ErrorCode::User`.
fn fetch_options<'a>(
    deadline: Instant,
    cancelled: &'a AtomicBool,
    depth: Option<i32>,
) -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |_progress| {
        Instant::now() < deadline && !cancelled.load(Ordering::SeqCst)
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(callbacks);
    if let Some(depth) = depth {
        fo.depth(depth);
    }
    fo
}

fn is_non_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).map(|mut entries| entries.next().is_some()).unwrap_or(false)
}

/// Remove what a failed attempt wrote. A directory that existed beforehand
/// is emptied but kept.
fn clear_partial_clone(dest: &Path, existed: bool) {
    if !existed {
        let _ = std::fs::remove_dir_all(dest);
        return;
    }
    let Ok(entries) = std::fs::read_dir(dest) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let _ = if path.is_dir() { std::fs::remove_dir_all(&path) } else { std::fs::remove_file(&path) };
    }
}
