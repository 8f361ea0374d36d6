//! Path normalization

use std::path::Path;

/// Render a path relative to `root` with forward slashes.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    normalize_path(&rel.to_string_lossy())
}

pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
