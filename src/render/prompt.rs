//! Prompt assembly for the chat model

use crate::domain::SourceFile;
use crate::utils::{estimate_tokens, truncate_chars};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert programmer. Here are some code files:";
pub const QUESTION_INSTRUCTION: &str = "Respond to the follow about the code above:";

/// Build the single-message prompt.
///
/// Each file is labeled with its repository-relative path and fenced; content
/// beyond `max_file_chars` characters is cut off. Truncation counts raw
/// characters, not model tokens.
pub fn build_prompt(files: &[SourceFile], question: &str, max_file_chars: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str(SYSTEM_INSTRUCTION);
    prompt.push_str("\n\n");

    for file in files {
        let content = truncate_chars(&file.content, max_file_chars);
        prompt.push_str("File: ");
        prompt.push_str(&file.relative_path);
        prompt.push_str("\n```\n");
        prompt.push_str(content);
        prompt.push_str("\n```\n\n");
    }

    prompt.push_str(QUESTION_INSTRUCTION);
    prompt.push_str("\n\n");
    prompt.push_str(question);

    tracing::debug!(
        "Assembled prompt from {} files: {} chars, ~{} tokens",
        files.len(),
        prompt.chars().count(),
        estimate_tokens(&prompt)
    );
    prompt
}
