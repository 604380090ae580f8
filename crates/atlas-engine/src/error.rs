//! Error types for the atlas engine binary.
//!
//! [`EngineError`] wraps every failure that can end the process: a bad
//! configuration file or a broken stdin/stdout. Per-command failures never
//! surface here; the session reports them as error responses.

/// Top-level error for the atlas engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: atlas_core::config::ConfigError,
    },

    /// Reading commands or writing responses failed.
    #[error("session I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A response could not be encoded.
    #[error("response encoding error: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
