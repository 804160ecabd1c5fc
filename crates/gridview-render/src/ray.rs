//! World-space rays and intersection tests.
//!
//! Under orthographic projection every screen pixel casts a ray parallel to
//! the camera's forward orientation; the camera builds these in
//! [`generate_ray`](crate::camera::OrthographicCamera::generate_ray).

use glam::Vec3;

const EPS: f32 = 1e-6;

/// A half-line from `origin` along the unit `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The point on the ray closest to `p` (clamped to the ray start).
    #[must_use]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let t = self.direction.dot(p - self.origin).max(0.0);
        self.at(t)
    }

    /// Intersects an infinite plane through `point` with unit `normal`.
    ///
    /// Returns the ray parameter, or `None` when the ray is parallel to the
    /// plane or the hit lies behind the origin.
    #[must_use]
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < EPS {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Ray parameter of the point closest to segment `[a, b]`.
    ///
    /// Degenerate segments collapse to a point query. Returns `None` when
    /// the closest approach lies behind the ray origin.
    #[must_use]
    pub fn closest_t_to_segment(&self, a: Vec3, b: Vec3) -> Option<f32> {
        let v = b - a;
        let c = v.dot(v);
        if c < 1e-12 {
            let t = self.direction.dot(a - self.origin);
            return (t >= 0.0).then_some(t);
        }

        let w0 = self.origin - a;
        let a_dot = self.direction.dot(self.direction);
        let b_dot = self.direction.dot(v);
        let d = self.direction.dot(w0);
        let e = v.dot(w0);
        let denom = a_dot * c - b_dot * b_dot;

        let s;
        let mut t;
        if denom.abs() < 1e-8 {
            s = 0.0;
            t = self.direction.dot(a - self.origin);
        } else {
            s = (b_dot * d - a_dot * e) / denom;
            t = (b_dot * e - c * d) / denom;
        }

        if s < 0.0 {
            t = self.direction.dot(a - self.origin);
        } else if s > 1.0 {
            t = self.direction.dot(b - self.origin);
        }

        (t >= 0.0).then_some(t)
    }

    /// Whether the segment `[a, b]` passes within `tolerance` of the ray.
    /// Returns the ray parameter of the closest approach.
    #[must_use]
    pub fn intersect_segment(&self, a: Vec3, b: Vec3, tolerance: f32) -> Option<f32> {
        let t = self.closest_t_to_segment(a, b)?;
        let on_ray = self.at(t);
        // Closest point on the segment to the ray point.
        let v = b - a;
        let c = v.dot(v);
        let s = if c < 1e-12 {
            0.0
        } else {
            (v.dot(on_ray - a) / c).clamp(0.0, 1.0)
        };
        let on_segment = a + v * s;
        ((on_ray - on_segment).length_squared() <= tolerance * tolerance).then_some(t)
    }

    /// Möller–Trumbore ray/triangle intersection.
    #[must_use]
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < EPS {
            return None;
        }
        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        (t > EPS).then_some(t)
    }

    /// Ray/quad intersection, the quad split along `v0–v2`.
    ///
    /// Vertices in winding order `v0, v1, v2, v3`.
    #[must_use]
    pub fn intersect_quad(&self, v0: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) -> Option<f32> {
        match (
            self.intersect_triangle(v0, v1, v2),
            self.intersect_triangle(v0, v2, v3),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (hit, None) | (None, hit) => hit,
        }
    }
}
