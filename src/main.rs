//! repo-ask: ask natural-language questions about a remote repository
//!
//! Clones a repository, embeds its source files, ranks them against the
//! question and forwards the most relevant ones to a chat model.

use anyhow::Result;

fn main() -> Result<()> {
    repo_ask::cli::run()
}
