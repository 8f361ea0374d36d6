//! Core data types shared across the pipeline

mod config;
mod source_file;

pub use config::{default_include_extensions, Config};
pub use source_file::{EmbeddingVector, SourceFile, UNSCORED_SIMILARITY};
