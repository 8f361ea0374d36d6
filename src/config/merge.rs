//! Environment and CLI layering on top of the loaded config

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;

/// Prefix for config overrides, e.g. `REPO_ASK_TOP_N=20`.
pub const ENV_PREFIX: &str = "REPO_ASK_";

/// Values given on the command line; `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub top_n: Option<usize>,
    pub keep_clone: bool,
}

/// Overlay `REPO_ASK_*` environment variables on `config`.
pub fn apply_env_overrides(config: Config) -> Result<Config> {
    Figment::from(Serialized::defaults(config))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .with_context(|| format!("Invalid {ENV_PREFIX}* environment override"))
}

/// CLI flags take precedence over every other source.
pub fn merge_cli_with_config(mut config: Config, overrides: &CliOverrides) -> Config {
    if let Some(top_n) = overrides.top_n {
        config.top_n = top_n;
    }
    if overrides.keep_clone {
        config.keep_clone = true;
    }
    config
}
