//! Library surface for `repo-ask`.
//!
//! The binary is a thin wrapper over [`cli::run`]; every pipeline stage is
//! exposed here so it can be driven with fake collaborators in tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod embed;
pub mod fetch;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod scan;
pub mod utils;
