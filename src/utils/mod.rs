//! Shared helpers

pub mod encoding;
pub mod paths;
pub mod text;

pub use encoding::read_source_text;
pub use paths::{normalize_path, relative_display};
pub use text::{estimate_tokens, truncate_chars};
