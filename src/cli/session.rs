//! One interactive question-answering run

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::sync::Arc;

use super::input::prompt_line;
use super::Cli;
use crate::api::{build_http_client, ApiSettings, OpenAiChatClient, OpenAiEmbeddingClient};
use crate::config::{apply_env_overrides, load_config, merge_cli_with_config, CliOverrides};
use crate::domain::Config;
use crate::fetch::GitFetcher;
use crate::pipeline::Pipeline;

const URL_PROMPT: &str = "Enter the GitHub repository URL to clone:";
const QUESTION_PROMPT: &str = "What is your question about the code?";

pub async fn run(cli: Cli) -> Result<()> {
    // A missing .env file is normal.
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = resolve_config(&cli)?;
    let pipeline = build_pipeline(config)?;

    let repo_url = match cli.repo {
        Some(url) => url.trim().to_string(),
        None => prompt_line(URL_PROMPT).await?,
    };

    let fetched = pipeline.fetch(&repo_url).await;
    match &fetched.outcome {
        Ok(()) => println!("Repository cloned to {}", fetched.context.root().display()),
        Err(err) => eprintln!("{} {err}", style("Error cloning repository:").red()),
    }

    let mut files = pipeline.collect(&fetched.context);
    println!("Generating embeddings for {} code files...", files.len());

    let progress = embedding_progress(files.len());
    let report = pipeline.embed(&mut files, &progress).await;
    progress.finish_and_clear();
    if report.failed > 0 {
        eprintln!(
            "{} {} of {} files could not be embedded and will rank last",
            style("Warning:").yellow(),
            report.failed,
            files.len()
        );
    }

    let question = match cli.question {
        Some(q) => q.trim().to_string(),
        None => prompt_line(QUESTION_PROMPT).await?,
    };
    if question.is_empty() {
        anyhow::bail!("Question must not be empty");
    }

    println!("Processing your question...");
    let ranked = pipeline.rank_for_question(&mut files, &question).await?;
    tracing::debug!("Prompt files: {:?}", ranked.selected);

    println!("Sending request to {}...", pipeline.config().chat_model);
    let answer = pipeline.ask(&ranked.prompt).await.context("Error calling chat API")?;

    println!("{}", style("Response:").bold());
    println!("{answer}");
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let cwd = env::current_dir().context("Failed to resolve working directory")?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    let config = apply_env_overrides(config)?;
    let config = merge_cli_with_config(
        config,
        &CliOverrides { top_n: cli.top_n, keep_clone: cli.keep_clone },
    );
    config.validate()?;
    Ok(config)
}

fn build_pipeline(config: Config) -> Result<Pipeline> {
    let settings = ApiSettings::from_env(&config)?;
    let http = build_http_client(config.request_timeout())?;

    let fetcher = Arc::new(GitFetcher::new(config.clone_timeout()));
    let embedder = Arc::new(OpenAiEmbeddingClient::new(
        http.clone(),
        settings.clone(),
        config.embedding_model.clone(),
    ));
    let chat = Arc::new(OpenAiChatClient::new(http, settings, config.chat_model.clone()));

    Ok(Pipeline::new(config, fetcher, embedder, chat))
}

fn embedding_progress(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} files")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}
