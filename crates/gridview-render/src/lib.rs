//! Render-facing pieces of gridview-rs.
//!
//! This crate holds everything that touches pixels or projections without
//! owning a GPU device:
//! - [`RenderBackend`], the consumed interface to the actual renderer
//! - [`SelectionFramebuffer`], CPU-side pick queries over a captured pass
//! - [`OrthographicCamera`] with bounding-box-driven view derivation
//! - [`Ray`] casting and intersection tests
//! - [`view_state`] persistence for the camera across sessions

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod camera;
pub mod error;
pub mod framebuffer;
pub mod ray;
pub mod view_state;

pub use backend::{FrameCapture, RenderBackend};
pub use camera::{OrthographicCamera, ViewVolume};
pub use error::{RenderError, RenderResult};
pub use framebuffer::{ScanMode, SelectionFramebuffer};
pub use ray::Ray;
pub use view_state::ViewState;
