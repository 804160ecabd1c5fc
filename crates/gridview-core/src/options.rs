//! Configuration options for gridview.

use serde::{Deserialize, Serialize};

/// Reserved layer tag that triggers a selection pass on update.
pub const SELECT_LAYER: f32 = -1.0;

/// Layer tag for background geometry, always included in display passes.
pub const BACKGROUND_LAYER: f32 = 0.0;

/// Global configuration options for gridview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Layer tag whose `update` runs the selection pass.
    pub select_layer: f32,

    /// Layer tag always included in display passes.
    pub background_layer: f32,

    /// Layer assigned to entities created by first reference.
    pub default_layer: f32,

    /// Side length, in pixels, of the default neighborhood scanned around
    /// the cursor by point picks. Odd values center on the cursor.
    pub pick_matrix_size: u32,

    /// Maximum ring radius, in pixels, of the spiral scan fallback.
    pub spiral_max_radius: u32,

    /// Whether view-volume derivation treats the scene bounding box as a
    /// cube of its largest extent.
    pub cubify_bounding_box: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            select_layer: SELECT_LAYER,
            background_layer: BACKGROUND_LAYER,
            default_layer: 1.0,
            pick_matrix_size: 5,
            spiral_max_radius: 16,
            cubify_bounding_box: false,
        }
    }
}
