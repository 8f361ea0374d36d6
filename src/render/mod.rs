//! Prompt rendering

pub mod prompt;

pub use prompt::build_prompt;
