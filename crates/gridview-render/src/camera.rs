//! Orthographic camera: view volume, pan/rotate/zoom, screen↔world mapping.
//!
//! The camera derives its view volume from the scene bounding box and a
//! cumulative zoom ratio, so the volume never "pumps" as the box corners
//! sweep during rotation: sizing uses the box's bounding-sphere radius, not
//! per-frame corner reprojection. All pixel arguments are device pixels with
//! a top-left origin.

use std::f32::consts::PI;
use std::path::PathBuf;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::ray::Ray;
use crate::view_state::{self, ViewState};

/// Orthographic view volume in camera space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewVolume {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl ViewVolume {
    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Center of the lateral extents.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.bottom + self.top) * 0.5,
        )
    }
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            near: -1.0,
            far: 1.0,
        }
    }
}

/// Rotation sensitivity: a full-viewport drag sweeps three half-turns.
const ROTATE_GAIN: f32 = 3.0;

/// Zoom step per unit of scroll delta.
const ZOOM_STEP: f32 = 0.15;

/// An orthographic camera with bounding-box-driven view derivation.
///
/// After every mutating operation `orientation` and `up` are re-normalized
/// and `up` is re-orthogonalized against `orientation`, so the frame never
/// drifts under accumulated rotations.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    position: Vec3,
    orientation: Vec3,
    up: Vec3,
    center_of_rotation: Vec3,
    custom_center: Option<Vec3>,
    zoom_ratio: f32,
    volume: ViewVolume,
    viewport: Vec2,
    device_pixel_ratio: f32,
    bbox: (Vec3, Vec3),
    cubify: bool,
    state_path: Option<PathBuf>,
}

impl OrthographicCamera {
    /// Creates a camera with default state and no persistence.
    #[must_use]
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            orientation: Vec3::NEG_Z,
            up: Vec3::Y,
            center_of_rotation: Vec3::ZERO,
            custom_center: None,
            zoom_ratio: 1.0,
            volume: ViewVolume::default(),
            viewport: Vec2::new(800.0, 600.0),
            device_pixel_ratio: 1.0,
            bbox: (Vec3::splat(-1.0), Vec3::splat(1.0)),
            cubify: false,
            state_path: None,
        };
        camera.derive_from_bounding_box();
        camera
    }

    /// Creates a camera restoring persisted state from the config file
    /// (see [`view_state::config_path`]). The state is written back when
    /// the camera is dropped. A missing or unreadable file silently yields
    /// defaults.
    #[must_use]
    pub fn with_persisted_state() -> Self {
        let path = view_state::config_path();
        let mut camera = Self::new();
        match view_state::load(&path) {
            Ok(Some(state)) => camera.apply_state(&state),
            Ok(None) => {}
            Err(e) => log::warn!("failed to read view config {}: {e}", path.display()),
        }
        camera.state_path = Some(path);
        camera
    }

    /// Applies a persisted state, re-orthonormalizing the restored frame.
    pub fn apply_state(&mut self, state: &ViewState) {
        self.position = state.position;
        self.orientation = state.orientation;
        self.up = state.up;
        self.zoom_ratio = if state.zoom_ratio.is_finite() && state.zoom_ratio > 0.0 {
            state.zoom_ratio
        } else {
            1.0
        };
        self.renormalize();
        self.update_volume();
    }

    /// Snapshot of the persistable state.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        ViewState {
            position: self.position,
            orientation: self.orientation,
            up: self.up,
            zoom_ratio: self.zoom_ratio,
        }
    }

    /// Sets the render target size in device pixels.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self.update_volume();
    }

    /// Sets the device-pixel-ratio scalar used by
    /// [`scale_logical`](Self::scale_logical).
    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
    }

    /// Converts logical UI points to the device pixels all camera and pick
    /// math operates in.
    #[must_use]
    pub fn scale_logical(&self, logical: Vec2) -> Vec2 {
        logical * self.device_pixel_ratio
    }

    /// Whether view-volume derivation treats the bounding box as a cube of
    /// its largest extent.
    pub fn set_cubify(&mut self, cubify: bool) {
        self.cubify = cubify;
        self.derive_from_bounding_box();
    }

    /// Camera position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Forward orientation (unit).
    #[must_use]
    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    /// Up direction (unit, orthogonal to the orientation).
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Right direction, derived as `normalize(orientation × up)`.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.orientation.cross(self.up).normalize()
    }

    /// Current view volume.
    #[must_use]
    pub fn volume(&self) -> ViewVolume {
        self.volume
    }

    /// Cumulative zoom ratio.
    #[must_use]
    pub fn zoom_ratio(&self) -> f32 {
        self.zoom_ratio
    }

    /// Current center of rotation.
    #[must_use]
    pub fn center_of_rotation(&self) -> Vec3 {
        self.center_of_rotation
    }

    /// Pins a custom center of rotation.
    pub fn set_center_of_rotation(&mut self, center: Vec3) {
        self.custom_center = Some(center);
        self.center_of_rotation = center;
    }

    /// Unpins the custom center, reverting to the bounding-box center.
    pub fn clear_center_of_rotation(&mut self) {
        self.custom_center = None;
        self.center_of_rotation = (self.bbox.0 + self.bbox.1) * 0.5;
    }

    /// Adopts a new scene bounding box: recenters the camera along its
    /// orientation and re-derives the view volume from the box's
    /// bounding-sphere radius.
    pub fn set_bounding_box(&mut self, min: Vec3, max: Vec3) {
        self.bbox = (min, max);
        self.derive_from_bounding_box();
    }

    fn extents(&self) -> Vec3 {
        let raw = self.bbox.1 - self.bbox.0;
        if self.cubify {
            Vec3::splat(raw.max_element())
        } else {
            raw
        }
    }

    fn bounding_radius(&self) -> f32 {
        (self.extents().length() * 0.5).max(1e-4)
    }

    fn derive_from_bounding_box(&mut self) {
        let center = (self.bbox.0 + self.bbox.1) * 0.5;
        let radius = self.bounding_radius();
        let extents = self.extents();
        // Depth of the box along the view axis.
        let depth = extents.x * self.orientation.x.abs()
            + extents.y * self.orientation.y.abs()
            + extents.z * self.orientation.z.abs();
        let distance = (depth * 0.5 + radius).max(radius);

        self.position = center - self.orientation * distance;
        if self.custom_center.is_none() {
            self.center_of_rotation = center;
        }
        self.update_volume();
    }

    /// Re-derives the lateral volume extents from the bounding-sphere
    /// radius, the aspect ratio, and the zoom ratio, and the depth extents
    /// from the camera's distance to the box center.
    fn update_volume(&mut self) {
        let radius = self.bounding_radius();
        let aspect = self.viewport.x / self.viewport.y;
        let half_h = radius.max(radius / aspect) * self.zoom_ratio;
        let half_w = half_h * aspect;
        let distance = (self.position - (self.bbox.0 + self.bbox.1) * 0.5).length();

        self.volume = ViewVolume {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near: distance - radius * 2.0,
            far: distance + radius * 2.0,
        };
    }

    fn renormalize(&mut self) {
        self.orientation = self.orientation.normalize_or(Vec3::NEG_Z);
        let projected = self.up - self.orientation * self.up.dot(self.orientation);
        self.up = projected.normalize_or(Vec3::Y);
    }

    /// Pans by a pixel delta: `dx` along the right vector, `dy` along up,
    /// each scaled by the volume-per-viewport ratio. Translates the
    /// bounding box with the camera; the rotation center follows the new
    /// box center unless a custom center is pinned.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let wx = dx * self.volume.width() / self.viewport.x;
        let wy = dy * self.volume.height() / self.viewport.y;
        let delta = self.right() * wx + self.up * wy;

        self.bbox.0 += delta;
        self.bbox.1 += delta;
        self.position += delta;
        if self.custom_center.is_none() {
            self.center_of_rotation = (self.bbox.0 + self.bbox.1) * 0.5;
        }
        self.renormalize();
    }

    /// Rotates about the current center of rotation: yaw about up from the
    /// horizontal pixel delta, pitch about right from the vertical one.
    ///
    /// A pinned custom center is re-homed afterwards so its screen
    /// projection stays fixed; the correction is a screen-space re-pan with
    /// a single bounded retry.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let theta = dx * PI / self.viewport.x * ROTATE_GAIN;
        let phi = dy * PI / self.viewport.y * ROTATE_GAIN;

        let pinned_before = self.custom_center.map(|pin| (pin, self.world_to_screen(pin)));

        let rotation = Mat3::from_axis_angle(self.up, theta) * Mat3::from_axis_angle(self.right(), phi);
        let center = self.center_of_rotation;

        self.orientation = rotation * self.orientation;
        self.up = rotation * self.up;
        self.position = center + rotation * (self.position - center);
        self.renormalize();
        self.update_volume();

        if let Some((pin, before)) = pinned_before {
            for _ in 0..2 {
                let after = self.world_to_screen(pin);
                let error = after - before;
                if error.x.abs() < 0.5 && error.y.abs() < 0.5 {
                    break;
                }
                // pan(dx, dy) moves a world point's projection by (-dx, +dy).
                self.pan(error.x, -error.y);
            }
        }
    }

    /// Scales the view volume by `1 − 0.15·delta` about its own center and
    /// folds the factor into the cumulative zoom ratio.
    pub fn zoom(&mut self, delta: f32) {
        let factor = (1.0 - ZOOM_STEP * delta).max(1e-3);
        let center = self.volume.center();
        let half_w = self.volume.width() * 0.5 * factor;
        let half_h = self.volume.height() * 0.5 * factor;

        self.volume.left = center.x - half_w;
        self.volume.right = center.x + half_w;
        self.volume.bottom = center.y - half_h;
        self.volume.top = center.y + half_h;
        self.zoom_ratio *= factor;
    }

    /// Snaps the orientation to the nearest signed principal axis, with the
    /// up vector snapped to its own nearest orthogonal axis, then re-derives
    /// position and volume from the bounding box.
    pub fn snap_to_axis(&mut self) {
        self.orientation = dominant_axis(self.orientation);
        let up_candidate = dominant_axis(self.up);
        self.up = if up_candidate.dot(self.orientation).abs() > 0.5 {
            // Up collapsed onto the view axis; fall back to the next-largest
            // component of the previous up.
            let residual = self.up - self.orientation * self.up.dot(self.orientation);
            dominant_axis(residual)
        } else {
            up_candidate
        };
        self.renormalize();
        self.derive_from_bounding_box();
    }

    /// View matrix (right-handed look-at).
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.orientation, self.up)
    }

    /// Orthographic projection matrix for the current view volume.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.volume.left,
            self.volume.right,
            self.volume.bottom,
            self.volume.top,
            self.volume.near,
            self.volume.far,
        )
    }

    /// Unprojects device-pixel coordinates and a normalized depth
    /// `z ∈ [0, 1]` to world space.
    ///
    /// The perspective divide is kept even though the projection is
    /// orthographic, guarding against any `w ≠ 1` path.
    #[must_use]
    pub fn screen_to_world(&self, px: f32, py: f32, z: f32) -> Vec3 {
        let ndc = Vec4::new(
            2.0 * px / self.viewport.x - 1.0,
            1.0 - 2.0 * py / self.viewport.y,
            z,
            1.0,
        );
        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        let world = inverse * ndc;
        let w = if world.w.abs() < 1e-12 { 1.0 } else { world.w };
        world.truncate() / w
    }

    /// Projects a world point to device-pixel coordinates.
    #[must_use]
    pub fn world_to_screen(&self, point: Vec3) -> Vec2 {
        let clip = (self.projection_matrix() * self.view_matrix()) * point.extend(1.0);
        let w = if clip.w.abs() < 1e-12 { 1.0 } else { clip.w };
        let ndc = clip.truncate() / w;
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        )
    }

    /// Casts the pick ray for a device-pixel position: origin on the near
    /// plane, direction along the forward orientation (orthographic rays
    /// are parallel).
    #[must_use]
    pub fn generate_ray(&self, px: f32, py: f32) -> Ray {
        Ray::new(self.screen_to_world(px, py, 0.0), self.orientation)
    }
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OrthographicCamera {
    fn drop(&mut self) {
        if let Some(path) = &self.state_path {
            if let Err(e) = view_state::save(path, &self.view_state()) {
                log::warn!("failed to write view config {}: {e}", path.display());
            }
        }
    }
}

/// The signed principal axis closest to `v`.
fn dominant_axis(v: Vec3) -> Vec3 {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        Vec3::X * v.x.signum()
    } else if a.y >= a.z {
        Vec3::Y * v.y.signum()
    } else {
        Vec3::Z * v.z.signum()
    }
}
