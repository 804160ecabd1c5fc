//! Selection framebuffer: CPU-side pixel queries over a captured pick pass.
//!
//! After the backend renders a selection pass, the raw color and depth
//! buffers land here. Queries resolve screen pixels (top-left origin, device
//! pixels) to decoded color IDs: a single pixel, a rectangle, or a lasso
//! polygon filled scanline by scanline. The capture is replaced wholesale on
//! every pass; no history is kept.

use std::collections::HashSet;

use gridview_core::codec::{self, BACKGROUND_ID};

use crate::backend::FrameCapture;
use crate::error::RenderResult;

/// Fallback scan strategy when the pixel under the cursor is background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Scan a small rectangular neighborhood around the cursor.
    #[default]
    Neighborhood,
    /// Walk an expanding square spiral out to a fixed maximum radius.
    /// Better for thin geometry (lines, isolated points) at the cost of a
    /// wider search.
    Spiral,
}

/// Owns the captured selection-pass buffers and answers pixel queries.
///
/// State machine: `Empty → Captured → (queries) → Captured → …`. Every
/// query on an empty framebuffer reports background.
#[derive(Debug, Default)]
pub struct SelectionFramebuffer {
    capture: Option<FrameCapture>,
    last_hit: Option<(i32, i32)>,
    neighborhood_size: i32,
    spiral_max_radius: i32,
}

impl SelectionFramebuffer {
    /// Creates an empty framebuffer with the given scan tunables.
    #[must_use]
    pub fn new(neighborhood_size: u32, spiral_max_radius: u32) -> Self {
        Self {
            capture: None,
            last_hit: None,
            neighborhood_size: neighborhood_size.max(1) as i32,
            spiral_max_radius: spiral_max_radius as i32,
        }
    }

    /// Stores the buffers of a completed selection pass, replacing any
    /// previous capture.
    pub fn store(&mut self, frame: FrameCapture) -> RenderResult<()> {
        frame.validate()?;
        log::debug!("selection capture stored: {}x{}", frame.width, frame.height);
        self.capture = Some(frame);
        self.last_hit = None;
        Ok(())
    }

    /// Whether a capture is present.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.capture.is_some()
    }

    /// Capture dimensions, or (0, 0) when empty.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.capture
            .as_ref()
            .map_or((0, 0), |c| (c.width, c.height))
    }

    /// Decoded color ID at `(x, y)` in top-left screen coordinates.
    ///
    /// Out-of-range coordinates and an empty framebuffer report
    /// [`BACKGROUND_ID`]. The capture stores row 0 at the bottom, so Y is
    /// flipped before indexing.
    #[must_use]
    pub fn pixel_at(&self, x: i32, y: i32) -> u32 {
        let Some(cap) = &self.capture else {
            return BACKGROUND_ID;
        };
        let (w, h) = (cap.width as i32, cap.height as i32);
        if x < 0 || y < 0 || x >= w || y >= h {
            return BACKGROUND_ID;
        }
        let py = h - y - 1;
        let pixels: &[[u8; 4]] = bytemuck::cast_slice(&cap.rgba);
        let [r, g, b, _a] = pixels[(py * w + x) as usize];
        codec::decode(r, g, b)
    }

    /// Color ID under the cursor, with a tolerance scan when the exact
    /// pixel is background.
    ///
    /// Records the winning pixel for [`last_hit_depth`](Self::last_hit_depth).
    pub fn color_id_at(&mut self, x: i32, y: i32, mode: ScanMode) -> u32 {
        let exact = self.pixel_at(x, y);
        if exact != BACKGROUND_ID {
            self.last_hit = Some((x, y));
            return exact;
        }
        match mode {
            ScanMode::Neighborhood => {
                let n = self.neighborhood_size;
                self.scan_rect(x, y, n, n)
            }
            ScanMode::Spiral => self.scan_spiral(x, y),
        }
    }

    /// First non-background ID in a rect around the center, in the same
    /// two-half order `pick_matrix` uses.
    fn scan_rect(&mut self, cx: i32, cy: i32, w: i32, h: i32) -> u32 {
        let (half_w, half_h) = (w / 2, h / 2);
        for y in (cy - half_h)..cy {
            for x in (cx - half_w)..=(cx + half_w) {
                let id = self.pixel_at(x, y);
                if id != BACKGROUND_ID {
                    self.last_hit = Some((x, y));
                    return id;
                }
            }
        }
        for y in cy..=(cy + half_h) {
            for x in (cx - half_w)..=(cx + half_w) {
                let id = self.pixel_at(x, y);
                if id != BACKGROUND_ID {
                    self.last_hit = Some((x, y));
                    return id;
                }
            }
        }
        BACKGROUND_ID
    }

    /// Expanding square-ring walk around the center, nearest ring first.
    /// Terminates at `spiral_max_radius` regardless of buffer contents.
    fn scan_spiral(&mut self, cx: i32, cy: i32) -> u32 {
        for radius in 1..=self.spiral_max_radius {
            // Top and bottom rows of the ring.
            for x in (cx - radius)..=(cx + radius) {
                for y in [cy - radius, cy + radius] {
                    let id = self.pixel_at(x, y);
                    if id != BACKGROUND_ID {
                        self.last_hit = Some((x, y));
                        return id;
                    }
                }
            }
            // Left and right columns, corners already covered.
            for y in (cy - radius + 1)..(cy + radius) {
                for x in [cx - radius, cx + radius] {
                    let id = self.pixel_at(x, y);
                    if id != BACKGROUND_ID {
                        self.last_hit = Some((x, y));
                        return id;
                    }
                }
            }
        }
        BACKGROUND_ID
    }

    /// All distinct non-background IDs inside a `w`×`h` rect centered at
    /// `(cx, cy)`.
    ///
    /// The rect is walked as two half-rect loops (rows above the center,
    /// then the center row and below); the union equals one full scan. The
    /// last pixel hit is recorded for depth lookup.
    pub fn pick_matrix(&mut self, cx: i32, cy: i32, w: i32, h: i32) -> HashSet<u32> {
        let mut ids = HashSet::new();
        let (half_w, half_h) = (w / 2, h / 2);
        for y in (cy - half_h)..cy {
            for x in (cx - half_w)..=(cx + half_w) {
                let id = self.pixel_at(x, y);
                if id != BACKGROUND_ID {
                    ids.insert(id);
                    self.last_hit = Some((x, y));
                }
            }
        }
        for y in cy..=(cy + half_h) {
            for x in (cx - half_w)..=(cx + half_w) {
                let id = self.pixel_at(x, y);
                if id != BACKGROUND_ID {
                    ids.insert(id);
                    self.last_hit = Some((x, y));
                }
            }
        }
        ids
    }

    /// All distinct non-background IDs inside a closed polygon, filled with
    /// an even-odd scanline walk.
    ///
    /// `points` is a flat `[x0, y0, x1, y1, …]` list in pixel space. The
    /// polygon is NOT auto-closed: the caller must supply coincident first
    /// and last points, and an open input yields an incomplete fill. Fewer
    /// than three vertices enclose nothing and return the empty set.
    ///
    /// Work is bounded by the polygon's pixel height times its edge count
    /// plus the filled area, with all sampling clamped to the capture.
    pub fn scanline_polygon(&mut self, points: &[f32]) -> HashSet<u32> {
        let mut ids = HashSet::new();
        let Some(cap) = &self.capture else {
            return ids;
        };
        if points.len() < 6 {
            return ids;
        }
        let (w, h) = (cap.width as i32, cap.height as i32);

        let verts: Vec<(f32, f32)> = points
            .chunks_exact(2)
            .map(|p| (p[0].round(), p[1].round()))
            .collect();

        let min_y = verts.iter().map(|v| v.1).fold(f32::INFINITY, f32::min);
        let max_y = verts.iter().map(|v| v.1).fold(f32::NEG_INFINITY, f32::max);
        let y_start = (min_y as i32).max(0);
        let y_end = (max_y as i32).min(h - 1);

        let mut crossings: Vec<f32> = Vec::new();
        for y in y_start..=y_end {
            let fy = y as f32;
            crossings.clear();
            for edge in verts.windows(2) {
                let (x1, y1) = edge[0];
                let (x2, y2) = edge[1];
                if (y1 <= fy && y2 > fy) || (y2 <= fy && y1 > fy) {
                    let t = (fy - y1) / (y2 - y1);
                    crossings.push(x1 + t * (x2 - x1));
                }
            }
            crossings.sort_by(f32::total_cmp);

            for pair in crossings.chunks_exact(2) {
                let start = (pair[0].round() as i32).max(0);
                let end = (pair[1].round() as i32).min(w - 1);
                for x in start..=end {
                    let id = self.pixel_at(x, y);
                    if id != BACKGROUND_ID {
                        ids.insert(id);
                        self.last_hit = Some((x, y));
                    }
                }
            }
        }
        ids
    }

    /// Depth value at `(x, y)` with the same bounds and Y-flip rules as
    /// [`pixel_at`](Self::pixel_at). Out-of-range reads report the far
    /// plane (1.0), matching the pass clear value.
    #[must_use]
    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        let Some(cap) = &self.capture else {
            return 1.0;
        };
        let (w, h) = (cap.width as i32, cap.height as i32);
        if x < 0 || y < 0 || x >= w || y >= h {
            return 1.0;
        }
        let py = h - y - 1;
        cap.depth[(py * w + x) as usize]
    }

    /// Depth at the last pixel a pick query hit, or the far plane if no
    /// query has hit anything since the last capture.
    #[must_use]
    pub fn last_hit_depth(&self) -> f32 {
        self.last_hit.map_or(1.0, |(x, y)| self.depth_at(x, y))
    }
}
