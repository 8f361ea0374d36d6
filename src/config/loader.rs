//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_SECTION: &str = "repo-ask";

const CANDIDATES: &[&str] =
    &["repo-ask.toml", ".repo-ask.toml", "repo-ask.yml", ".repo-ask.yml", "repo-ask.yaml"];

/// Load a config file, or defaults when none exists.
///
/// An explicit `config_path` must parse. A file discovered in `search_dir`
/// that fails to parse only logs a warning and yields defaults.
pub fn load_config(search_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();
    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(search_dir),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    match parse_config_file(&config_file) {
        Ok(cfg) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(cfg)
        }
        Err(err) if explicit => Err(err),
        Err(err) => {
            tracing::warn!(
                "Ignoring auto-discovered config {}: {:#}",
                config_file.display(),
                err
            );
            Ok(Config::default())
        }
    }
}

fn parse_config_file(config_file: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

/// Parse TOML config, accepting either top-level keys or a `[repo-ask]` table.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(CONFIG_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, accepting either top-level keys or a `repo-ask` mapping.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(CONFIG_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|name| search_dir.join(name)).find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_config_yields_defaults() {
        let tmp = TempDir::new().expect("tmp");
        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn discovers_toml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("repo-ask.toml"), "top_n = 12\nchat_model = 'gpt-4o'\n")
            .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.top_n, 12);
        assert_eq!(cfg.chat_model, "gpt-4o");
        assert_eq!(cfg.embedding_max_chars, 8000);
    }

    #[test]
    fn nested_toml_section_is_used() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[repo-ask]\nmax_concurrency = 2\ninclude_extensions = 'rs, go'\n")
            .expect("write");

        let cfg = load_config(tmp.path(), Some(&path)).expect("config");
        assert_eq!(cfg.max_concurrency, 2);
        assert_eq!(cfg.include_extensions, vec!["rs", "go"]);
    }

    #[test]
    fn discovers_yaml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join(".repo-ask.yml"),
            "repo-ask:\n  keep_clone: true\n  include_extensions: [py, .md]\n",
        )
        .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert!(cfg.keep_clone);
        assert_eq!(cfg.include_extensions, vec!["py", "md"]);
    }

    #[test]
    fn explicit_invalid_config_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "include_extensions = 123\n").expect("write");

        assert!(load_config(tmp.path(), Some(&path)).is_err());
    }

    #[test]
    fn explicit_unsupported_extension_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.json");
        fs::write(&path, "{}").expect("write");

        let err = load_config(tmp.path(), Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Unsupported config extension"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        assert!(load_config(tmp.path(), Some(&tmp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn auto_discovered_invalid_config_falls_back_to_defaults() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("repo-ask.toml"), "top_n = 'many'\n").expect("write");

        let cfg = load_config(tmp.path(), None).expect("should not error on auto-discovery");
        assert_eq!(cfg.top_n, Config::default().top_n);
    }
}
