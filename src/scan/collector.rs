//! Source file collection

use crate::domain::{default_include_extensions, SourceFile};
use crate::utils::{read_source_text, relative_display};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Walks a checkout and loads every file whose extension is allow-listed.
///
/// Symlinks are followed only when they resolve inside the root; a link that
/// points back at one of its ancestors is reported by the walker as a loop and
/// skipped.
pub struct FileCollector {
    root_path: PathBuf,
    include_extensions: Vec<String>,
    respect_gitignore: bool,
}

impl FileCollector {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            include_extensions: default_include_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            respect_gitignore: false,
        }
    }

    /// Set file extensions to include, without the leading dot (e.g. "py")
    pub fn include_extensions(mut self, extensions: Vec<String>) -> Self {
        self.include_extensions = extensions;
        self
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Extension match is exact: `Main.PY` does not match `py`.
    fn should_include(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.include_extensions.iter().any(|allowed| allowed == ext),
            None => false,
        }
    }

    /// Collect matching files sorted by relative path.
    ///
    /// Errors only when the root itself is missing or not a directory.
    pub fn collect(&self) -> Result<Vec<SourceFile>> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Not a readable directory: {}", self.root_path.display());
        }

        let canonical_root = fs::canonicalize(&self.root_path).with_context(|| {
            format!("Failed to resolve directory: {}", self.root_path.display())
        })?;

        let mut builder = WalkBuilder::new(&self.root_path);
        builder
            .follow_links(true)
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(self.respect_gitignore)
            .git_global(false)
            .git_exclude(self.respect_gitignore)
            .filter_entry(move |entry| {
                entry.file_name() != ".git"
                    && (!entry.path_is_symlink() || stays_within(&canonical_root, entry.path()))
            });

        let mut files = Vec::new();
        for entry_result in builder.build() {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.should_include(path) {
                continue;
            }

            let content = match read_source_text(path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!("{err:#}");
                    continue;
                }
            };

            let relative_path = relative_display(&self.root_path, path);
            tracing::debug!("Collected {relative_path} ({} bytes)", content.len());
            files.push(SourceFile::new(path.to_path_buf(), relative_path, content));
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }
}

/// A symlink is only followed when its target resolves inside `root`.
fn stays_within(root: &Path, link: &Path) -> bool {
    match fs::canonicalize(link) {
        Ok(target) if target.starts_with(root) => true,
        Ok(target) => {
            tracing::debug!(
                "Skipping symlink {} pointing outside the repository ({})",
                link.display(),
                target.display()
            );
            false
        }
        Err(err) => {
            tracing::debug!("Skipping unresolvable symlink {}: {err}", link.display());
            false
        }
    }
}
