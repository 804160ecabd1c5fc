//! Render backend boundary.
//!
//! The core never issues GPU work itself. It hands the backend flat-colored
//! primitives during a selection pass and asks it to run whole display
//! passes; the backend owns devices, shaders, and buffer objects. A backend
//! that lost its device reports so through [`RenderBackend::is_available`]
//! and the registry gates every render/pick call from then on.

use glam::Vec3;
use gridview_core::entity::DrawMode;

use crate::error::{RenderError, RenderResult};

/// CPU-side copy of the buffers produced by one selection pass.
///
/// Row 0 is the bottom scanline (GL convention); callers flip Y when mapping
/// from top-left screen coordinates. Four bytes per pixel, RGBA.
#[derive(Debug, Clone, Default)]
pub struct FrameCapture {
    /// Flat RGBA bytes, `width * height * 4` long.
    pub rgba: Vec<u8>,
    /// Parallel depth values, `width * height` long.
    pub depth: Vec<f32>,
    /// Capture width in device pixels.
    pub width: u32,
    /// Capture height in device pixels.
    pub height: u32,
}

impl FrameCapture {
    /// Validates that the buffer lengths match the reported dimensions.
    pub fn validate(&self) -> RenderResult<()> {
        let pixels = self.width as usize * self.height as usize;
        if self.rgba.len() != pixels * 4 || self.depth.len() != pixels {
            return Err(RenderError::MalformedCapture {
                width: self.width,
                height: self.height,
                rgba_len: self.rgba.len(),
                depth_len: self.depth.len(),
            });
        }
        Ok(())
    }
}

/// The consumed rendering interface.
///
/// Selection passes render each pickable unit in its assigned flat color
/// with lighting and blending disabled; display passes draw whatever the
/// backend considers current for the given layer.
pub trait RenderBackend {
    /// Whether a usable device/context exists. Checked once at scene
    /// initialization; a `false` gates all later render and pick calls.
    fn is_available(&self) -> bool;

    /// Current render target size in device pixels.
    fn viewport(&self) -> (u32, u32);

    /// Queues one flat-colored primitive batch for the in-progress
    /// selection pass.
    fn draw_primitive(
        &mut self,
        color: [u8; 3],
        mode: DrawMode,
        vertices: &[Vec3],
    ) -> RenderResult<()>;

    /// Finishes the selection pass and returns the captured buffers.
    fn render_selection_pass(&mut self) -> RenderResult<FrameCapture>;

    /// Renders the display pass for one layer.
    fn render_display_pass(&mut self, layer: f32) -> RenderResult<()>;
}
