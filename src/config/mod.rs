//! Configuration loading and merging
//!
//! Sources, lowest to highest precedence: defaults, config file,
//! `REPO_ASK_*` environment variables, CLI flags.

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{apply_env_overrides, merge_cli_with_config, CliOverrides};
