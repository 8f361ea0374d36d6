//! Runtime configuration

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Extensions collected by default (compared case-sensitively, without the dot).
pub fn default_include_extensions() -> &'static [&'static str] {
    &["js", "ts", "py", "java", "c", "cpp", "go", "rb", "php", "md"]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File extensions to collect, without the leading dot
    #[serde(deserialize_with = "deserialize_extensions")]
    pub include_extensions: Vec<String>,
    /// Number of most similar files forwarded to the chat model
    pub top_n: usize,
    /// Characters of each file sent to the embedding API
    pub embedding_max_chars: usize,
    /// Characters of each file included in the prompt
    pub prompt_max_file_chars: usize,
    pub embedding_model: String,
    pub chat_model: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub clone_timeout_secs: u64,
    /// Upper bound on in-flight embedding requests
    pub max_concurrency: usize,
    /// Clone destination; a fresh temp directory is used when unset
    pub clone_dir: Option<PathBuf>,
    pub keep_clone: bool,
    pub respect_gitignore: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_extensions: default_include_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            top_n: 100,
            embedding_max_chars: 8000,
            prompt_max_file_chars: 5000,
            embedding_model: "text-embedding-ada-002".to_string(),
            chat_model: "o1-mini".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 120,
            clone_timeout_secs: 300,
            max_concurrency: 8,
            clone_dir: None,
            keep_clone: false,
            respect_gitignore: false,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    /// Reject settings that would make the pipeline a no-op or hang.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            anyhow::bail!("top_n must be at least 1");
        }
        if self.max_concurrency == 0 {
            anyhow::bail!("max_concurrency must be at least 1");
        }
        if self.embedding_max_chars == 0 || self.prompt_max_file_chars == 0 {
            anyhow::bail!("character limits must be greater than zero");
        }
        if self.request_timeout_secs == 0 || self.clone_timeout_secs == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }
        if self.include_extensions.is_empty() {
            anyhow::bail!("include_extensions must list at least one extension");
        }
        Ok(())
    }
}

/// Accept either `"py, js"` or `["py", ".js"]`.
fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    let raw = match StringOrList::deserialize(deserializer)? {
        StringOrList::String(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::List(items) => items,
    };
    Ok(normalize_extensions(raw))
}

pub(crate) fn normalize_extensions<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_from_comma_separated_string() {
        let cfg: Config = toml::from_str("include_extensions = \"py, .js,  rs\"").unwrap();
        assert_eq!(cfg.include_extensions, vec!["py", "js", "rs"]);
    }

    #[test]
    fn extensions_keep_case() {
        let cfg: Config = toml::from_str("include_extensions = [\"PY\", \" .Md \"]").unwrap();
        assert_eq!(cfg.include_extensions, vec!["PY", "Md"]);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = toml::from_str("top_n = 5").unwrap();
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.prompt_max_file_chars, 5000);
        assert_eq!(cfg.include_extensions.len(), default_include_extensions().len());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let cfg = Config { top_n: 0, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { max_concurrency: 0, ..Config::default() };
        assert!(cfg.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
