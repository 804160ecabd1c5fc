//! Scene registry: entity bookkeeping and pick orchestration.
//!
//! The registry owns the entity arena, the color reservation table, and the
//! selection framebuffer, and drives the external render backend. It is the
//! single entry point for frame updates and pick queries: callers hand it
//! device-pixel coordinates and get back `(entity_key, sub_id)` pairs.
//!
//! Everything runs synchronously on the frame thread. Pick results are
//! owned values, so a click handler may destroy the entity it just picked.

use std::collections::HashMap;

use gridview_core::arena::{EntityArena, EntityHandle};
use gridview_core::codec::{self, BACKGROUND_ID};
use gridview_core::entity::{DrawMode, Entity, Geometry, PickScheme};
use gridview_core::error::{GridViewError, Result};
use gridview_core::options::Options;
use gridview_core::reservation::ColorReservationTable;
use gridview_core::Vec3;
use gridview_render::backend::RenderBackend;
use gridview_render::camera::OrthographicCamera;
use gridview_render::framebuffer::{ScanMode, SelectionFramebuffer};

use crate::events::EventSink;

fn layer_matches(a: f32, b: f32) -> bool {
    (a - b).abs() < f32::EPSILON
}

/// Registry of all scene entities, keyed by unique strings.
pub struct SceneRegistry {
    arena: EntityArena,
    by_key: HashMap<String, EntityHandle>,
    /// Dense insertion order; compacts on destroy. Reservation rebuilds
    /// walk this list, which makes renumbering deterministic.
    order: Vec<EntityHandle>,
    reservations: ColorReservationTable,
    selection: SelectionFramebuffer,
    backend: Box<dyn RenderBackend>,
    events: Box<dyn EventSink>,
    options: Options,
    scan_mode: ScanMode,
    /// False when the backend reported no usable device at construction;
    /// gates every render and pick call to a logged no-op.
    render_gate: bool,
}

impl SceneRegistry {
    /// Creates a registry over the given backend and event sink.
    ///
    /// Backend availability is probed exactly once here; an unavailable
    /// device is reported and all later render/pick calls become no-ops.
    #[must_use]
    pub fn new(
        backend: Box<dyn RenderBackend>,
        events: Box<dyn EventSink>,
        options: Options,
    ) -> Self {
        let render_gate = backend.is_available();
        if !render_gate {
            log::error!("render backend unavailable; display and selection passes are disabled");
        }
        let selection =
            SelectionFramebuffer::new(options.pick_matrix_size, options.spiral_max_radius);
        Self {
            arena: EntityArena::new(),
            by_key: HashMap::new(),
            order: Vec::new(),
            reservations: ColorReservationTable::new(),
            selection,
            backend,
            events,
            options,
            scan_mode: ScanMode::default(),
            render_gate,
        }
    }

    /// Creates a registry with a null event sink and default options.
    #[must_use]
    pub fn with_defaults(backend: Box<dyn RenderBackend>) -> Self {
        Self::new(backend, Box::new(crate::events::NullEventSink), Options::default())
    }

    /// The active options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The resource-error state probed at construction: `Ok` when a usable
    /// render device exists, the gating error otherwise.
    pub fn backend_status(&self) -> Result<()> {
        if self.render_gate {
            Ok(())
        } else {
            Err(GridViewError::BackendUnavailable(
                "no usable device reported at scene initialization".to_string(),
            ))
        }
    }

    /// Sets the fallback scan strategy used by [`pick_at`](Self::pick_at).
    pub fn set_scan_mode(&mut self, mode: ScanMode) {
        self.scan_mode = mode;
    }

    /// Read access to the selection framebuffer.
    #[must_use]
    pub fn selection(&self) -> &SelectionFramebuffer {
        &self.selection
    }

    // ========== Entity management ==========

    /// Looks up an entity by key, creating it on first reference.
    pub fn get_or_create(&mut self, key: &str) -> EntityHandle {
        if let Some(&handle) = self.by_key.get(key) {
            return handle;
        }
        let handle = self
            .arena
            .insert(Entity::new(key, self.options.default_layer));
        self.by_key.insert(key.to_string(), handle);
        self.order.push(handle);
        self.events.entity_created(key);
        handle
    }

    /// Whether an entity with this key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The entity's position in dense insertion order. Destroying an
    /// earlier entity decrements the slot of every later one.
    #[must_use]
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        let handle = *self.by_key.get(key)?;
        self.order.iter().position(|&h| h == handle)
    }

    fn handle(&self, key: &str) -> Result<EntityHandle> {
        self.by_key
            .get(key)
            .copied()
            .ok_or_else(|| GridViewError::EntityNotFound(key.to_string()))
    }

    /// Read access to an entity. Unknown keys are a reported error.
    pub fn entity(&self, key: &str) -> Result<&Entity> {
        let handle = self.handle(key)?;
        self.arena
            .get(handle)
            .ok_or_else(|| GridViewError::EntityNotFound(key.to_string()))
    }

    fn entity_mut(&mut self, key: &str) -> Result<&mut Entity> {
        let handle = self.handle(key)?;
        self.arena
            .get_mut(handle)
            .ok_or_else(|| GridViewError::EntityNotFound(key.to_string()))
    }

    /// The entity's geometry. Unknown keys are a reported error.
    pub fn geometry(&self, key: &str) -> Result<&Geometry> {
        Ok(&self.entity(key)?.geometry)
    }

    /// Replaces an entity's geometry, creating the entity if needed. Marks
    /// the reservation table dirty when the pickable ID count changes.
    ///
    /// Per-vertex attributes must match the position count; a mismatch is
    /// rejected before any state changes.
    pub fn set_geometry(&mut self, key: &str, geometry: Geometry) -> Result<()> {
        let positions = geometry.positions.len();
        for attribute in [&geometry.normals, &geometry.colors] {
            if let Some(values) = attribute {
                if values.len() != positions {
                    return Err(GridViewError::SizeMismatch {
                        expected: positions,
                        actual: values.len(),
                    });
                }
            }
        }

        let handle = self.get_or_create(key);
        let Some(entity) = self.arena.get_mut(handle) else {
            return Ok(());
        };
        let before = entity.pick_id_count();
        entity.geometry = geometry;
        if entity.pick_scheme != PickScheme::None && entity.pick_id_count() != before {
            self.reservations.mark_dirty();
        }
        Ok(())
    }

    /// Sets an entity's pick scheme; any change marks the reservation
    /// table dirty.
    pub fn set_pick_scheme(&mut self, key: &str, scheme: PickScheme) -> Result<()> {
        let entity = self.entity_mut(key)?;
        if entity.pick_scheme != scheme {
            entity.pick_scheme = scheme;
            self.reservations.mark_dirty();
        }
        Ok(())
    }

    /// Moves an entity to a display layer.
    pub fn set_layer(&mut self, key: &str, layer: f32) -> Result<()> {
        self.entity_mut(key)?.layer = layer;
        Ok(())
    }

    /// Destroys an entity. Returns false (a no-op) for unknown keys.
    ///
    /// Later entities keep their keys and handles; only their dense order
    /// slots shift down by one.
    pub fn destroy(&mut self, key: &str) -> bool {
        let Some(handle) = self.by_key.remove(key) else {
            log::debug!("destroy('{key}'): not found");
            return false;
        };
        self.order.retain(|&h| h != handle);
        if let Some(entity) = self.arena.remove(handle) {
            if entity.pick_scheme != PickScheme::None {
                self.reservations.mark_dirty();
            }
        }
        self.events.entity_destroyed(key);
        true
    }

    /// Destroys every entity on a layer; returns how many were removed.
    pub fn destroy_layer(&mut self, layer: f32) -> usize {
        let keys: Vec<String> = self
            .order
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .filter(|e| layer_matches(e.layer, layer))
            .map(|e| e.key().to_string())
            .collect();
        for key in &keys {
            self.destroy(key);
        }
        keys.len()
    }

    // ========== Commit flags ==========

    /// Enables rendering for an entity without touching its geometry.
    pub fn commit(&mut self, key: &str) -> Result<()> {
        let entity = self.entity_mut(key)?;
        entity.committed = true;
        entity.rendered_in_display_mode = true;
        entity.rendered_in_select_mode = true;
        Ok(())
    }

    /// Disables rendering for an entity without destroying its geometry.
    pub fn uncommit(&mut self, key: &str) -> Result<()> {
        let entity = self.entity_mut(key)?;
        entity.committed = false;
        entity.rendered_in_display_mode = false;
        entity.rendered_in_select_mode = false;
        Ok(())
    }

    /// Commits every entity on a layer; returns how many were touched.
    pub fn commit_layer(&mut self, layer: f32) -> usize {
        self.set_layer_committed(layer, true)
    }

    /// Uncommits every entity on a layer; returns how many were touched.
    pub fn uncommit_layer(&mut self, layer: f32) -> usize {
        self.set_layer_committed(layer, false)
    }

    fn set_layer_committed(&mut self, layer: f32, committed: bool) -> usize {
        let mut touched = 0;
        for &handle in &self.order {
            if let Some(entity) = self.arena.get_mut(handle) {
                if layer_matches(entity.layer, layer) {
                    entity.committed = committed;
                    entity.rendered_in_display_mode = committed;
                    entity.rendered_in_select_mode = committed;
                    touched += 1;
                }
            }
        }
        touched
    }

    // ========== Frame updates ==========

    /// Runs the frame update for one layer.
    ///
    /// The reserved select layer triggers a reservation rebuild (when
    /// dirty), a selection pass, and a capture; every other layer runs a
    /// display pass with the background layer always included.
    pub fn update(&mut self, layer: f32) -> Result<()> {
        if !self.render_gate {
            log::debug!("update({layer}): skipped, render backend unavailable");
            return Ok(());
        }
        if layer_matches(layer, self.options.select_layer) {
            self.update_selection()
        } else {
            self.update_display(layer)
        }
    }

    fn update_selection(&mut self) -> Result<()> {
        if self.reservations.is_dirty() {
            self.rebuild_reservations();
        }

        let backend = &mut *self.backend;
        for &handle in &self.order {
            let Some(entity) = self.arena.get(handle) else {
                continue;
            };
            if !entity.committed || !entity.rendered_in_select_mode {
                continue;
            }
            let Some((min, _)) = entity.color_range else {
                continue;
            };
            emit_selection_draws(backend, entity, min)
                .map_err(|e| GridViewError::RenderError(e.to_string()))?;
        }

        let capture = self
            .backend
            .render_selection_pass()
            .map_err(|e| GridViewError::RenderError(e.to_string()))?;
        let (width, height) = (capture.width, capture.height);
        self.selection
            .store(capture)
            .map_err(|e| GridViewError::RenderError(e.to_string()))?;
        self.events.selection_captured(width, height);
        Ok(())
    }

    fn update_display(&mut self, layer: f32) -> Result<()> {
        let background = self.options.background_layer;
        self.backend
            .render_display_pass(background)
            .map_err(|e| GridViewError::RenderError(e.to_string()))?;
        if !layer_matches(layer, background) {
            self.backend
                .render_display_pass(layer)
                .map_err(|e| GridViewError::RenderError(e.to_string()))?;
        }
        Ok(())
    }

    /// Renumbers all reservations in insertion order and writes the ranges
    /// back onto the entities.
    fn rebuild_reservations(&mut self) {
        let entries: Vec<(EntityHandle, usize)> = self
            .order
            .iter()
            .filter_map(|&h| self.arena.get(h).map(|e| (h, e.pick_id_count())))
            .collect();
        let count = entries.len();
        self.reservations.rebuild(entries);

        for &handle in &self.order {
            let range = self.reservations.range_of(handle);
            if let Some(entity) = self.arena.get_mut(handle) {
                entity.color_range = range;
            }
        }
        self.events.reservations_rebuilt(count);
    }

    // ========== Pick queries ==========

    fn resolve_hit(&self, color_id: u32) -> Option<(String, u32)> {
        if color_id == BACKGROUND_ID {
            return None;
        }
        let reservation = self.reservations.resolve(color_id)?;
        // A stale capture can hold IDs whose entity is already gone;
        // that is a pick miss, not an error.
        let entity = self.arena.get(reservation.handle)?;
        Some((entity.key().to_string(), color_id - reservation.min))
    }

    /// Resolves the entity under a screen position, with the configured
    /// fallback scan when the exact pixel is background.
    pub fn pick_at(&mut self, x: i32, y: i32) -> Option<(String, u32)> {
        if !self.render_gate {
            log::debug!("pick_at({x}, {y}): skipped, render backend unavailable");
            return None;
        }
        let id = self.selection.color_id_at(x, y, self.scan_mode);
        self.resolve_hit(id)
    }

    /// Resolves every entity inside a `w`×`h` rect centered on
    /// `(cx, cy)`. Results are sorted for determinism.
    pub fn pick_rect(&mut self, cx: i32, cy: i32, w: i32, h: i32) -> Vec<(String, u32)> {
        if !self.render_gate {
            return Vec::new();
        }
        let ids = self.selection.pick_matrix(cx, cy, w, h);
        let mut hits: Vec<(String, u32)> =
            ids.into_iter().filter_map(|id| self.resolve_hit(id)).collect();
        hits.sort();
        hits
    }

    /// Resolves every entity inside a closed lasso polygon given as a flat
    /// `[x0, y0, x1, y1, …]` pixel list. The polygon is not auto-closed.
    pub fn pick_polygon(&mut self, points: &[f32]) -> Vec<(String, u32)> {
        if !self.render_gate {
            return Vec::new();
        }
        let ids = self.selection.scanline_polygon(points);
        let mut hits: Vec<(String, u32)> =
            ids.into_iter().filter_map(|id| self.resolve_hit(id)).collect();
        hits.sort();
        hits
    }

    /// Depth at the last pixel a pick query hit.
    #[must_use]
    pub fn last_hit_depth(&self) -> f32 {
        self.selection.last_hit_depth()
    }

    // ========== Scene extents ==========

    /// Axis-aligned bounding box over all committed entities with
    /// positions, for camera fitting. `None` when nothing has extent.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut has_extent = false;

        for &handle in &self.order {
            let Some(entity) = self.arena.get(handle) else {
                continue;
            };
            if !entity.committed {
                continue;
            }
            for &p in &entity.geometry.positions {
                min = min.min(p);
                max = max.max(p);
                has_extent = true;
            }
        }
        has_extent.then_some((min, max))
    }

    /// Fits a camera to this scene: viewport size from the backend,
    /// bounding box from the committed geometry.
    pub fn fit_camera(&self, camera: &mut OrthographicCamera) {
        let (width, height) = self.backend.viewport();
        camera.set_viewport(width, height);
        if let Some((min, max)) = self.bounding_box() {
            camera.set_bounding_box(min, max);
        }
    }
}

/// Emits the flat-colored primitives for one entity's selection pass,
/// one color per pickable unit.
fn emit_selection_draws(
    backend: &mut dyn RenderBackend,
    entity: &Entity,
    min_id: u32,
) -> gridview_render::RenderResult<()> {
    let assembled = entity.geometry.assembled_positions();
    match entity.pick_scheme {
        PickScheme::None => {}
        PickScheme::ByGeometry => {
            backend.draw_primitive(codec::encode(min_id), entity.geometry.mode, &assembled)?;
        }
        PickScheme::ByVertex => {
            for (i, vertex) in assembled.iter().enumerate() {
                backend.draw_primitive(
                    codec::encode(min_id + i as u32),
                    DrawMode::Points,
                    std::slice::from_ref(vertex),
                )?;
            }
        }
        PickScheme::ByPrimitive => {
            let stride = entity.geometry.mode.vertices_per_primitive();
            for (i, primitive) in assembled.chunks_exact(stride).enumerate() {
                backend.draw_primitive(
                    codec::encode(min_id + i as u32),
                    entity.geometry.mode,
                    primitive,
                )?;
            }
        }
    }
    Ok(())
}
