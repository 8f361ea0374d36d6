//! Question answering pipeline: fetch, collect, embed, rank, prompt, ask.
//!
//! Every external collaborator is injected, so the stages can be driven with
//! fakes. The CLI calls the stages one by one to report progress between them.

use crate::api::{ApiError, ChatClient, EmbeddingClient};
use crate::domain::{Config, SourceFile};
use crate::embed::{embed_files, embed_text, EmbeddingReport};
use crate::fetch::{build_temp_repo_dir, FetchError, RepoContext, RepoFetcher};
use crate::rank::{rank_files, select_top_n};
use crate::render::build_prompt;
use crate::scan::collect_source_files;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::sync::Arc;

/// A clone attempt. The context exists (and cleans up) even when cloning failed.
pub struct FetchedRepo {
    pub context: RepoContext,
    pub outcome: Result<(), FetchError>,
}

/// Ranked prompt ready to send.
#[derive(Debug, Clone)]
pub struct RankedPrompt {
    pub prompt: String,
    /// Relative paths of the files included, most similar first
    pub selected: Vec<String>,
}

pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn RepoFetcher>,
    embedder: Arc<dyn EmbeddingClient>,
    chat: Arc<dyn ChatClient>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn RepoFetcher>,
        embedder: Arc<dyn EmbeddingClient>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        Self { config, fetcher, embedder, chat }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clone `url`. Failure is returned in the outcome, never raised.
    ///
    /// The directory is only deleted afterwards if it did not exist before
    /// the run and `keep_clone` is off.
    pub async fn fetch(&self, url: &str) -> FetchedRepo {
        let dest = self.config.clone_dir.clone().unwrap_or_else(build_temp_repo_dir);
        let owned = !dest.exists() && !self.config.keep_clone;
        let context = RepoContext::new(dest, owned);

        let outcome = self.fetcher.fetch(url, context.root()).await;
        if let Err(err) = &outcome {
            tracing::debug!("Clone of {url} failed: {err}");
        }
        FetchedRepo { context, outcome }
    }

    /// Collect source files; a missing or unreadable checkout yields none.
    pub fn collect(&self, context: &RepoContext) -> Vec<SourceFile> {
        match collect_source_files(context.root(), &self.config) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!("No files collected: {err:#}");
                Vec::new()
            }
        }
    }

    pub async fn embed(&self, files: &mut [SourceFile], progress: &ProgressBar) -> EmbeddingReport {
        embed_files(
            self.embedder.as_ref(),
            files,
            self.config.embedding_max_chars,
            self.config.max_concurrency,
            progress,
        )
        .await
    }

    /// Rank `files` against `question` and assemble the prompt.
    ///
    /// Without a question embedding there is nothing to rank against, so that
    /// failure aborts instead of falling back to an arbitrary order.
    pub async fn rank_for_question(
        &self,
        files: &mut [SourceFile],
        question: &str,
    ) -> Result<RankedPrompt> {
        let query = embed_text(self.embedder.as_ref(), question, self.config.embedding_max_chars)
            .await
            .context("Cannot rank without a question embedding")?;

        let embedded = files.iter().filter(|f| f.is_embedded()).count();
        tracing::debug!("Ranking {} files, {} with embeddings", files.len(), embedded);
        rank_files(files, &query).context("Failed to rank files")?;
        let selected = select_top_n(files, self.config.top_n);
        tracing::info!("Selected {} of {} files for the prompt", selected.len(), files.len());

        Ok(RankedPrompt {
            prompt: build_prompt(selected, question, self.config.prompt_max_file_chars),
            selected: selected.iter().map(|f| f.relative_path.clone()).collect(),
        })
    }

    pub async fn ask(&self, prompt: &str) -> Result<String, ApiError> {
        self.chat.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmbeddingVector;
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FailingFetcher;

    #[async_trait]
    impl RepoFetcher for FailingFetcher {
        async fn fetch(&self, url: &str, _dest: &Path) -> Result<(), FetchError> {
            Err(FetchError::InvalidUrl(url.to_string()))
        }
    }

    struct WritingFetcher;

    #[async_trait]
    impl RepoFetcher for WritingFetcher {
        async fn fetch(&self, _url: &str, dest: &Path) -> Result<(), FetchError> {
            fs::create_dir_all(dest).unwrap();
            fs::write(dest.join("main.go"), "package main").unwrap();
            Ok(())
        }
    }

    /// Embeds by keyword: "alpha" → [1, 0], "beta" → [0, 1], else fails.
    struct KeywordEmbedder;

    #[async_trait]
    impl EmbeddingClient for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddingVector, ApiError> {
            if text.contains("alpha") {
                Ok(vec![1.0, 0.0])
            } else if text.contains("beta") {
                Ok(vec![0.0, 1.0])
            } else {
                Err(ApiError::Malformed { endpoint: "fake".into(), reason: "no keyword".into() })
            }
        }
    }

    #[derive(Default)]
    struct RecordingChat {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatClient for RecordingChat {
        async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("answer".to_string())
        }
    }

    fn pipeline_with(config: Config, fetcher: Arc<dyn RepoFetcher>) -> Pipeline {
        Pipeline::new(config, fetcher, Arc::new(KeywordEmbedder), Arc::new(RecordingChat::default()))
    }

    fn file(name: &str, content: &str) -> SourceFile {
        SourceFile::new(name.into(), name.to_string(), content.to_string())
    }

    #[tokio::test]
    async fn failed_clone_yields_zero_files() {
        let tmp = TempDir::new().unwrap();
        let config = Config { clone_dir: Some(tmp.path().join("clone")), ..Config::default() };
        let pipeline = pipeline_with(config, Arc::new(FailingFetcher));

        let fetched = pipeline.fetch("ftp://nope").await;
        assert!(fetched.outcome.is_err());
        assert!(pipeline.collect(&fetched.context).is_empty());
    }

    #[tokio::test]
    async fn owned_clone_is_removed_after_use() {
        let tmp = TempDir::new().unwrap();
        let clone_dir = tmp.path().join("clone");
        let config = Config { clone_dir: Some(clone_dir.clone()), ..Config::default() };
        let pipeline = pipeline_with(config, Arc::new(WritingFetcher));

        let fetched = pipeline.fetch("https://example.com/r.git").await;
        assert!(fetched.outcome.is_ok());
        assert_eq!(pipeline.collect(&fetched.context).len(), 1);
        drop(fetched);
        assert!(!clone_dir.exists());
    }

    #[tokio::test]
    async fn pre_existing_clone_dir_is_never_deleted() {
        let tmp = TempDir::new().unwrap();
        let config = Config { clone_dir: Some(tmp.path().to_path_buf()), ..Config::default() };
        let pipeline = pipeline_with(config, Arc::new(FailingFetcher));

        drop(pipeline.fetch("ftp://nope").await);
        assert!(tmp.path().exists());
    }

    #[tokio::test]
    async fn keep_clone_leaves_directory() {
        let tmp = TempDir::new().unwrap();
        let clone_dir = tmp.path().join("clone");
        let config =
            Config { clone_dir: Some(clone_dir.clone()), keep_clone: true, ..Config::default() };
        let pipeline = pipeline_with(config, Arc::new(WritingFetcher));

        drop(pipeline.fetch("https://example.com/r.git").await);
        assert!(clone_dir.join("main.go").exists());
    }

    #[tokio::test]
    async fn question_embedding_failure_aborts() {
        let pipeline = pipeline_with(Config::default(), Arc::new(FailingFetcher));
        let mut files = vec![file("a.py", "alpha")];

        let err = pipeline.rank_for_question(&mut files, "unrelated").await.unwrap_err();
        assert!(err.to_string().contains("Cannot rank without a question embedding"));
    }

    #[tokio::test]
    async fn ranks_and_limits_to_top_n() {
        let config = Config { top_n: 2, ..Config::default() };
        let pipeline = pipeline_with(config, Arc::new(FailingFetcher));
        let mut files =
            vec![file("b.py", "beta"), file("x.py", "nothing"), file("a.py", "alpha")];
        pipeline.embed(&mut files, &ProgressBar::hidden()).await;

        let ranked = pipeline.rank_for_question(&mut files, "alpha?").await.unwrap();

        assert_eq!(ranked.selected, vec!["a.py", "b.py"]);
        assert!(ranked.prompt.contains("File: a.py"));
        assert!(!ranked.prompt.contains("File: x.py"));
        assert!(ranked.prompt.ends_with("alpha?"));
        assert_eq!(files[2].relative_path, "x.py");
        assert_eq!(files[2].similarity, crate::domain::UNSCORED_SIMILARITY);
    }
}
