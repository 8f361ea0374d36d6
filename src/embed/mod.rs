//! Embedding of collected files and questions

use crate::api::{ApiError, EmbeddingClient};
use crate::domain::{EmbeddingVector, SourceFile};
use crate::utils::truncate_chars;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

/// Outcome of embedding a batch of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddingReport {
    pub embedded: usize,
    pub failed: usize,
}

/// Embed `text` after truncating it to `max_chars` characters.
pub async fn embed_text(
    client: &dyn EmbeddingClient,
    text: &str,
    max_chars: usize,
) -> Result<EmbeddingVector, ApiError> {
    client.embed(truncate_chars(text, max_chars)).await
}

/// Embed every file with at most `max_concurrency` requests in flight.
///
/// A failed request leaves that file without an embedding and is counted in
/// the report; it never stops the rest of the batch.
pub async fn embed_files(
    client: &dyn EmbeddingClient,
    files: &mut [SourceFile],
    max_chars: usize,
    max_concurrency: usize,
    progress: &ProgressBar,
) -> EmbeddingReport {
    let results: Vec<(usize, Result<EmbeddingVector, ApiError>)> =
        stream::iter(files.iter().enumerate())
            .map(move |(idx, file)| async move {
                (idx, embed_text(client, &file.content, max_chars).await)
            })
            .buffer_unordered(max_concurrency.max(1))
            .inspect(|_| progress.inc(1))
            .collect()
            .await;

    let mut report = EmbeddingReport::default();
    for (idx, result) in results {
        let file = &mut files[idx];
        match result {
            Ok(embedding) => {
                file.embedding = Some(embedding);
                report.embedded += 1;
            }
            Err(err) => {
                tracing::warn!("Error generating embedding for {}: {err}", file.relative_path);
                file.embedding = None;
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records inputs and fails for any text containing "broken".
    #[derive(Default)]
    struct RecordingEmbedder {
        inputs: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingClient for RecordingEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddingVector, ApiError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.inputs.lock().unwrap().push(text.to_string());
            if text.contains("broken") {
                return Err(ApiError::Malformed {
                    endpoint: "fake".to_string(),
                    reason: "boom".to_string(),
                });
            }
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    fn file(name: &str, content: &str) -> SourceFile {
        SourceFile::new(PathBuf::from(format!("/repo/{name}")), name.to_string(), content.to_string())
    }

    #[tokio::test]
    async fn embed_text_truncates_input() {
        let embedder = RecordingEmbedder::default();
        embed_text(&embedder, "abcdefghij", 4).await.unwrap();
        assert_eq!(embedder.inputs.lock().unwrap().as_slice(), ["abcd"]);
    }

    #[tokio::test]
    async fn failures_leave_files_unscored_without_aborting() {
        let embedder = RecordingEmbedder::default();
        let mut files =
            vec![file("a.py", "alpha"), file("b.py", "broken file"), file("c.py", "gamma")];

        let report = embed_files(&embedder, &mut files, 8000, 4, &ProgressBar::hidden()).await;

        assert_eq!(report, EmbeddingReport { embedded: 2, failed: 1 });
        assert_eq!(files[0].embedding, Some(vec![5.0, 1.0]));
        assert!(files[1].embedding.is_none());
        assert_eq!(files[2].embedding, Some(vec![5.0, 1.0]));
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let embedder = RecordingEmbedder::default();
        let mut files: Vec<SourceFile> =
            (0..20).map(|i| file(&format!("f{i}.go"), "package main")).collect();

        let progress = ProgressBar::hidden();
        let report = embed_files(&embedder, &mut files, 8000, 3, &progress).await;

        assert_eq!(report.embedded, 20);
        assert!(embedder.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(progress.position(), 20);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let embedder = RecordingEmbedder::default();
        let report = embed_files(&embedder, &mut [], 8000, 4, &ProgressBar::hidden()).await;
        assert_eq!(report, EmbeddingReport::default());
        assert!(embedder.inputs.lock().unwrap().is_empty());
    }
}
