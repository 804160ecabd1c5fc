//! Entity model: geometry payload, display layer, and pick scheme.
//!
//! An [`Entity`] is one renderable object in the scene, identified by a
//! unique string key. It owns its geometry exclusively; the registry hands
//! out references, never copies.

use glam::Vec3;

/// Primitive assembly mode for a geometry payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Isolated points.
    #[default]
    Points,
    /// Independent line segments (2 vertices each).
    Lines,
    /// Connected line strip.
    LineStrip,
    /// Closed line loop.
    LineLoop,
    /// Independent triangles (3 vertices each).
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Triangle fan.
    TriangleFan,
    /// Convex polygon.
    Polygon,
    /// Independent quads (4 vertices each).
    Quads,
    /// Quad strip.
    QuadStrip,
}

impl DrawMode {
    /// Vertices consumed per picked primitive for this mode.
    #[must_use]
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            DrawMode::Points => 1,
            DrawMode::Lines | DrawMode::LineStrip | DrawMode::LineLoop => 2,
            DrawMode::Triangles
            | DrawMode::TriangleStrip
            | DrawMode::TriangleFan
            | DrawMode::Polygon => 3,
            DrawMode::Quads | DrawMode::QuadStrip => 4,
        }
    }
}

/// Granularity at which an entity receives pickable color IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickScheme {
    /// Not pickable; consumes no IDs.
    #[default]
    None,
    /// One ID per vertex.
    ByVertex,
    /// One ID per assembled primitive.
    ByPrimitive,
    /// A single ID for the whole geometry.
    ByGeometry,
}

/// Geometry payload owned by an entity.
///
/// Positions are mandatory; normals, colors, and indices are optional and,
/// when present, sized consistently with the positions they annotate.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Optional per-vertex normals.
    pub normals: Option<Vec<Vec3>>,
    /// Optional per-vertex colors.
    pub colors: Option<Vec<Vec3>>,
    /// Optional index buffer; when present, primitives assemble in index
    /// order rather than position order.
    pub indices: Option<Vec<u32>>,
    /// Primitive assembly mode.
    pub mode: DrawMode,
}

impl Geometry {
    /// Creates a geometry from bare positions.
    #[must_use]
    pub fn from_positions(positions: Vec<Vec3>, mode: DrawMode) -> Self {
        Self {
            positions,
            mode,
            ..Self::default()
        }
    }

    /// Number of vertices the pipeline actually consumes: the index count
    /// when indexed, the position count otherwise.
    #[must_use]
    pub fn drawn_vertex_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), Vec::len)
    }

    /// Positions in assembly order, resolving the index buffer if present.
    #[must_use]
    pub fn assembled_positions(&self) -> Vec<Vec3> {
        match &self.indices {
            Some(indices) => indices
                .iter()
                .filter_map(|&i| self.positions.get(i as usize).copied())
                .collect(),
            None => self.positions.clone(),
        }
    }

    /// Number of whole primitives this geometry assembles.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.drawn_vertex_count() / self.mode.vertices_per_primitive()
    }
}

/// A renderable object tracked by the scene registry.
#[derive(Debug, Clone)]
pub struct Entity {
    key: String,
    /// Display layer tag.
    pub layer: f32,
    /// Whether the entity participates in rendering at all.
    pub committed: bool,
    /// Drawn during display-mode passes.
    pub rendered_in_display_mode: bool,
    /// Drawn during selection-mode passes.
    pub rendered_in_select_mode: bool,
    /// Geometry payload, owned exclusively by this entity.
    pub geometry: Geometry,
    /// Pick granularity.
    pub pick_scheme: PickScheme,
    /// Reserved color-ID range `(min, max)`, assigned by the reservation
    /// table; `None` until the first rebuild or for non-pickable entities.
    pub color_range: Option<(u32, u32)>,
}

impl Entity {
    /// Creates an empty, committed entity on the given layer.
    #[must_use]
    pub fn new(key: impl Into<String>, layer: f32) -> Self {
        Self {
            key: key.into(),
            layer,
            committed: true,
            rendered_in_display_mode: true,
            rendered_in_select_mode: true,
            geometry: Geometry::default(),
            pick_scheme: PickScheme::None,
            color_range: None,
        }
    }

    /// The unique string key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of distinct color IDs this entity needs under its current
    /// pick scheme.
    #[must_use]
    pub fn pick_id_count(&self) -> usize {
        match self.pick_scheme {
            PickScheme::None => 0,
            PickScheme::ByVertex => self.geometry.drawn_vertex_count(),
            PickScheme::ByPrimitive => self.geometry.primitive_count(),
            PickScheme::ByGeometry => 1,
        }
    }
}
