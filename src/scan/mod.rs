//! Source file discovery

use crate::domain::{Config, SourceFile};
use anyhow::Result;
use std::path::Path;

pub mod collector;

pub use collector::FileCollector;

/// Collect the files `config` allows from `root`.
pub fn collect_source_files(root: &Path, config: &Config) -> Result<Vec<SourceFile>> {
    FileCollector::new(root.to_path_buf())
        .include_extensions(config.include_extensions.clone())
        .respect_gitignore(config.respect_gitignore)
        .collect()
}
