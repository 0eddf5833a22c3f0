//! Error types for rktiles

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Tile content whose format no loader handles. Indicates bad data or a
    /// misconfigured tileset rather than a transient failure.
    #[error("Content type \"{0}\" not supported")]
    UnsupportedContent(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Tileset error: {0}")]
    Tileset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
