//! Source file records carried through collection, embedding and ranking

use std::path::PathBuf;

/// Embedding returned by the embedding API. Length is fixed by the model.
pub type EmbeddingVector = Vec<f32>;

/// Similarity assigned to files without an embedding.
///
/// Cosine similarity never drops below -1, so unscored files sort last.
pub const UNSCORED_SIMILARITY: f64 = -1.0;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the repository root, always `/`-separated
    pub relative_path: String,
    pub content: String,
    pub embedding: Option<EmbeddingVector>,
    pub similarity: f64,
}

impl SourceFile {
    pub fn new(path: PathBuf, relative_path: String, content: String) -> Self {
        Self { path, relative_path, content, embedding: None, similarity: UNSCORED_SIMILARITY }
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }
}
