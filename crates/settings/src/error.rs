use std::path::PathBuf;
use thiserror::Error;

/// Errors from a settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("invalid JSON in {path}: {error}")]
    Json {
        path: PathBuf,
        error: serde_json::Error,
    },

    /// The stored document is valid JSON but not an object.
    #[error("{0} does not hold a JSON object")]
    NotAnObject(PathBuf),

    #[error("settings store is unavailable")]
    Unavailable,
}
