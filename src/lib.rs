//! AI-assisted commit message tool
//!
//! Reads the staged git diff, asks a language model for a Conventional
//! Commits message, then commits and optionally pushes it.
pub mod api;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod interact;
pub mod prompt;
pub mod style;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ScribeConfig;
pub use error::{Result, ScribeError};
pub use prompt::Style;
pub use workflow::{WorkflowDriver, WorkflowOptions, WorkflowOutcome};
