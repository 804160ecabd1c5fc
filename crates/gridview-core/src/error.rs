//! Error types for gridview-rs.

use thiserror::Error;

/// The main error type for gridview-rs operations.
#[derive(Error, Debug)]
pub enum GridViewError {
    /// An entity with the given key was not found.
    #[error("entity '{0}' not found")]
    EntityNotFound(String),

    /// No usable render device or context is available.
    #[error("render backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Geometry attribute sizes disagree with the position count.
    #[error("geometry size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Rendering error reported by the backend.
    #[error("render error: {0}")]
    RenderError(String),
}

/// A specialized Result type for gridview-rs operations.
pub type Result<T> = std::result::Result<T, GridViewError>;
