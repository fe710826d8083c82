//! Error types for the Saltitantes binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the command loop.

/// Top-level error for the Saltitantes binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: saltitantes_core::config::ConfigError,
    },

    /// Loading the player's statistics failed.
    #[error("stats store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: saltitantes_core::collaborators::StoreError,
    },

    /// Reading commands from stdin failed.
    #[error("stdin error: {source}")]
    Stdin {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
