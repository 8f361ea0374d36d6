//! Line prompts on the terminal or piped stdin

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{self, BufRead, IsTerminal, Write};

/// Ask for one line of input without blocking the async runtime.
pub async fn prompt_line(prompt: &'static str) -> Result<String> {
    tokio::task::spawn_blocking(move || read_line(prompt))
        .await
        .context("Prompt task failed")?
}

fn read_line(prompt: &str) -> Result<String> {
    if io::stdin().is_terminal() && io::stderr().is_terminal() {
        let answer: String =
            Input::with_theme(&ColorfulTheme::default()).with_prompt(prompt).interact_text()?;
        return Ok(answer.trim().to_string());
    }

    print!("{prompt} ");
    io::stdout().flush()?;
    read_trimmed_line(&mut io::stdin().lock())
}

fn read_trimmed_line(reader: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).context("Failed to read from stdin")?;
    if read == 0 {
        anyhow::bail!("No input provided (stdin closed)");
    }
    Ok(line.trim().to_string())
}
