//! File ranking by embedding similarity

use crate::domain::{SourceFile, UNSCORED_SIMILARITY};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("cannot compare embeddings of different lengths ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
}

/// Cosine similarity of two equal-length vectors, clamped to [-1, 1].
///
/// A zero-norm vector has no direction, so its similarity to anything is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, RankError> {
    if a.len() != b.len() {
        return Err(RankError::DimensionMismatch { left: a.len(), right: b.len() });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// Assign each file its similarity to `query`; files without an embedding
/// get [`UNSCORED_SIMILARITY`].
pub fn score_files(files: &mut [SourceFile], query: &[f32]) -> Result<(), RankError> {
    for file in files.iter_mut() {
        file.similarity = match &file.embedding {
            Some(embedding) => cosine_similarity(query, embedding)?,
            None => UNSCORED_SIMILARITY,
        };
    }
    Ok(())
}

/// Stable sort by descending similarity; equal scores keep their order.
pub fn sort_by_similarity(files: &mut [SourceFile]) {
    files.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

/// Score and sort in one step.
pub fn rank_files(files: &mut [SourceFile], query: &[f32]) -> Result<(), RankError> {
    score_files(files, query)?;
    sort_by_similarity(files);
    Ok(())
}

/// The first `n` entries of an already ranked list.
pub fn select_top_n(ranked: &[SourceFile], n: usize) -> &[SourceFile] {
    &ranked[..n.min(ranked.len())]
}
