//! # Arena Development Tools
//!
//! Command-line tools for development:
//! - Content table validation
//! - Headless arena runs for balance checks

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod simulate;
pub mod validate;

use std::path::PathBuf;

use arena_core::error::ArenaError;
use thiserror::Error;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A data file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Content failed to parse.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// Content parsed but has problems.
    #[error("{0} content problem(s) found")]
    Invalid(usize),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
