//! Library entry for edgeline-cli used by integration tests and embedding.

pub mod commands;
pub mod link;
pub mod settings;

// Re-export commands for convenience
pub use commands::*;

// Re-export commonly used items
pub use crate::settings::{LineArgs, SerialArgs};
