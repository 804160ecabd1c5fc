//! Rendering error types.

use thiserror::Error;

/// Errors that can occur at the render backend boundary.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No usable render device or context.
    #[error("render device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A selection or display pass failed inside the backend.
    #[error("render pass failed: {0}")]
    PassFailed(String),

    /// The backend returned a capture whose buffer sizes disagree with its
    /// reported dimensions.
    #[error("malformed capture: {width}x{height} with {rgba_len} color bytes, {depth_len} depth values")]
    MalformedCapture {
        width: u32,
        height: u32,
        rgba_len: usize,
        depth_len: usize,
    },
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
