//! Error types for the combat simulation.
//!
//! Only the load boundary is fallible. Once a session is running, missing
//! templates, degenerate geometry, stale collisions and pool exhaustion are
//! absorbed where they occur and reported through `tracing`.

use thiserror::Error;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for the arena simulation.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// A template key was not found in its table.
    #[error("Missing {table} config: {key}")]
    MissingConfig {
        /// Table that was searched (weapons, enemies, bosses...).
        table: &'static str,
        /// Key that was requested.
        key: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse {table} data: {message}")]
    DataParseError {
        /// Table or file that failed to parse.
        table: String,
        /// Error message.
        message: String,
    },

    /// A template parsed but its values are unusable.
    #[error("Invalid {table} entry '{key}': {reason}")]
    InvalidContent {
        /// Table containing the entry.
        table: &'static str,
        /// Key of the offending entry.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Reference to an entity that does not exist in the session.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),
}
