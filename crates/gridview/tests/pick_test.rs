//! End-to-end pick pipeline tests against a software mock backend.
//!
//! The mock "rasterizes" each flat-colored draw by painting one pixel per
//! vertex, with vertex x/y taken directly as buffer coordinates (row 0 at
//! the bottom, matching the capture convention). That is enough to exercise
//! reservation numbering, capture, and every pick query without a GPU.

use std::cell::RefCell;
use std::rc::Rc;

use gridview_rs::*;
use proptest::prelude::*;

#[derive(Default)]
struct BackendLog {
    display_layers: Vec<f32>,
    selection_passes: usize,
}

struct MockBackend {
    width: u32,
    height: u32,
    available: bool,
    pending: Vec<([u8; 3], Vec<Vec3>)>,
    log: Rc<RefCell<BackendLog>>,
}

impl MockBackend {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            pending: Vec::new(),
            log: Rc::new(RefCell::new(BackendLog::default())),
        }
    }

    fn unavailable(width: u32, height: u32) -> Self {
        Self {
            available: false,
            ..Self::new(width, height)
        }
    }

    fn log_handle(&self) -> Rc<RefCell<BackendLog>> {
        Rc::clone(&self.log)
    }
}

impl RenderBackend for MockBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw_primitive(
        &mut self,
        color: [u8; 3],
        _mode: DrawMode,
        vertices: &[Vec3],
    ) -> RenderResult<()> {
        self.pending.push((color, vertices.to_vec()));
        Ok(())
    }

    fn render_selection_pass(&mut self) -> RenderResult<FrameCapture> {
        let pixels = (self.width * self.height) as usize;
        let mut rgba = vec![0u8; pixels * 4];
        let mut depth = vec![1.0f32; pixels];

        for (color, vertices) in self.pending.drain(..) {
            for v in vertices {
                let (x, y) = (v.x.round() as i64, v.y.round() as i64);
                if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
                    continue;
                }
                let idx = (y as usize * self.width as usize + x as usize) * 4;
                rgba[idx] = color[0];
                rgba[idx + 1] = color[1];
                rgba[idx + 2] = color[2];
                rgba[idx + 3] = 255;
                depth[idx / 4] = 0.5;
            }
        }

        self.log.borrow_mut().selection_passes += 1;
        Ok(FrameCapture {
            rgba,
            depth,
            width: self.width,
            height: self.height,
        })
    }

    fn render_display_pass(&mut self, layer: f32) -> RenderResult<()> {
        self.log.borrow_mut().display_layers.push(layer);
        Ok(())
    }
}

/// Screen y for a buffer row, given the capture's bottom-up convention.
fn screen_y(height: u32, buffer_y: i32) -> i32 {
    height as i32 - 1 - buffer_y
}

fn point_entity(scene: &mut SceneRegistry, key: &str, points: &[Vec3], scheme: PickScheme) {
    scene
        .set_geometry(key, Geometry::from_positions(points.to_vec(), DrawMode::Points))
        .unwrap();
    scene.set_pick_scheme(key, scheme).unwrap();
}

#[test]
fn single_entity_single_pixel_resolves() {
    let backend = MockBackend::new(1, 1);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "probe", &[Vec3::ZERO], PickScheme::ByGeometry);

    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    assert_eq!(scene.pick_at(0, 0), Some(("probe".to_string(), 0)));
}

#[test]
fn by_vertex_sub_ids_follow_vertex_order() {
    let backend = MockBackend::new(8, 8);
    let height = 8;
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    let points = [
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(3.0, 3.0, 0.0),
        Vec3::new(6.0, 2.0, 0.0),
    ];
    point_entity(&mut scene, "cloud", &points, PickScheme::ByVertex);

    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    assert_eq!(
        scene.pick_at(3, screen_y(height, 3)),
        Some(("cloud".to_string(), 1))
    );
    assert_eq!(
        scene.pick_at(6, screen_y(height, 2)),
        Some(("cloud".to_string(), 2))
    );
}

#[test]
fn reservations_are_disjoint_across_entities() {
    let backend = MockBackend::new(8, 8);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(
        &mut scene,
        "a",
        &[Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
        PickScheme::ByVertex,
    );
    point_entity(&mut scene, "b", &[Vec3::new(2.0, 0.0, 0.0)], PickScheme::ByGeometry);

    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    let (a_min, a_max) = scene.entity("a").unwrap().color_range.unwrap();
    let (b_min, b_max) = scene.entity("b").unwrap().color_range.unwrap();
    assert!(a_min >= FIRST_COLOR_ID);
    assert!(a_max < b_min, "ranges must not overlap");
    assert_eq!(b_min, b_max, "single-ID reservation spans one ID");
}

#[test]
fn pick_rect_collects_multiple_entities() {
    let backend = MockBackend::new(16, 16);
    let height = 16;
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "a", &[Vec3::new(6.0, 8.0, 0.0)], PickScheme::ByGeometry);
    point_entity(&mut scene, "b", &[Vec3::new(9.0, 8.0, 0.0)], PickScheme::ByGeometry);
    point_entity(&mut scene, "far", &[Vec3::new(15.0, 0.0, 0.0)], PickScheme::ByGeometry);

    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    let hits = scene.pick_rect(7, screen_y(height, 8), 7, 7);
    assert_eq!(
        hits,
        vec![("a".to_string(), 0), ("b".to_string(), 0)],
        "rect should catch a and b but not far"
    );
}

#[test]
fn pick_polygon_lasso_through_registry() {
    let backend = MockBackend::new(16, 16);
    let height = 16;
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "inside", &[Vec3::new(5.0, 10.0, 0.0)], PickScheme::ByGeometry);
    point_entity(&mut scene, "outside", &[Vec3::new(14.0, 1.0, 0.0)], PickScheme::ByGeometry);

    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    // Closed square lasso around the upper-left region, in screen coords.
    let y0 = screen_y(height, 12) as f32;
    let y1 = screen_y(height, 8) as f32;
    let lasso = [2.0, y0, 8.0, y0, 8.0, y1, 2.0, y1, 2.0, y0];
    let hits = scene.pick_polygon(&lasso);
    assert_eq!(hits, vec![("inside".to_string(), 0)]);
}

#[test]
fn destroy_renumbers_dense_slots() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    scene.get_or_create("A");
    scene.get_or_create("B");
    scene.get_or_create("C");
    assert_eq!(scene.slot_of("C"), Some(2));

    assert!(scene.destroy("B"));
    assert_eq!(scene.slot_of("A"), Some(0));
    assert_eq!(scene.slot_of("C"), Some(1));
    assert!(scene.entity("A").is_ok());
    assert!(scene.entity("C").is_ok());
    assert!(matches!(
        scene.entity("B"),
        Err(GridViewError::EntityNotFound(_))
    ));
}

#[test]
fn mismatched_attributes_are_rejected() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    let mut geometry = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X], DrawMode::Points);
    geometry.normals = Some(vec![Vec3::Y]);
    assert!(matches!(
        scene.set_geometry("bad", geometry),
        Err(GridViewError::SizeMismatch { expected: 2, actual: 1 })
    ));
}

#[test]
fn backend_status_reflects_gate() {
    let ok_scene = SceneRegistry::with_defaults(Box::new(MockBackend::new(4, 4)));
    assert!(ok_scene.backend_status().is_ok());

    let gated = SceneRegistry::with_defaults(Box::new(MockBackend::unavailable(4, 4)));
    assert!(matches!(
        gated.backend_status(),
        Err(GridViewError::BackendUnavailable(_))
    ));
}

#[test]
fn destroy_unknown_key_is_a_noop() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));
    assert!(!scene.destroy("ghost"));
}

#[test]
fn queries_on_unknown_keys_error() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));
    assert!(scene.geometry("ghost").is_err());
    assert!(scene.commit("ghost").is_err());
    assert!(scene.set_pick_scheme("ghost", PickScheme::ByVertex).is_err());
}

#[test]
fn destroyed_entity_on_stale_capture_is_a_miss() {
    let backend = MockBackend::new(2, 2);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "victim", &[Vec3::ZERO], PickScheme::ByGeometry);
    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    let hit = scene.pick_at(0, 1).unwrap();
    assert_eq!(hit.0, "victim");

    // A click handler destroying what it just picked must leave later
    // queries on the stale capture as clean misses.
    assert!(scene.destroy(&hit.0));
    assert_eq!(scene.pick_at(0, 1), None);
}

#[test]
fn uncommitted_entities_skip_the_selection_pass() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "hidden", &[Vec3::ZERO], PickScheme::ByGeometry);
    scene.uncommit("hidden").unwrap();

    let select = scene.options().select_layer;
    scene.update(select).unwrap();
    assert_eq!(scene.pick_at(0, 3), None);

    scene.commit("hidden").unwrap();
    scene.update(select).unwrap();
    assert_eq!(scene.pick_at(0, 3), Some(("hidden".to_string(), 0)));
}

#[test]
fn destroy_layer_removes_every_tagged_entity() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    scene.get_or_create("a");
    scene.get_or_create("b");
    scene.get_or_create("c");
    scene.set_layer("a", 5.0).unwrap();
    scene.set_layer("b", 5.0).unwrap();
    scene.set_layer("c", 6.0).unwrap();

    assert_eq!(scene.destroy_layer(5.0), 2);
    assert_eq!(scene.len(), 1);
    assert!(!scene.contains("a"));
    assert!(scene.contains("c"));
}

#[test]
fn spiral_scan_mode_widens_the_pick() {
    let backend = MockBackend::new(32, 32);
    let height = 32;
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "wire", &[Vec3::new(20.0, 16.0, 0.0)], PickScheme::ByGeometry);
    let select = scene.options().select_layer;
    scene.update(select).unwrap();

    // 8 px off the wire: outside the default neighborhood, inside the spiral.
    let y = screen_y(height, 16);
    assert_eq!(scene.pick_at(12, y), None);

    scene.set_scan_mode(ScanMode::Spiral);
    assert_eq!(scene.pick_at(12, y), Some(("wire".to_string(), 0)));
}

#[test]
fn layer_commit_flags_apply_in_bulk() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    scene.get_or_create("a");
    scene.get_or_create("b");
    scene.set_layer("a", 7.0).unwrap();
    scene.set_layer("b", 7.0).unwrap();

    assert_eq!(scene.uncommit_layer(7.0), 2);
    assert!(!scene.entity("a").unwrap().committed);
    assert_eq!(scene.commit_layer(7.0), 2);
    assert!(scene.entity("b").unwrap().committed);
}

#[test]
fn display_update_always_includes_background_layer() {
    let backend = MockBackend::new(4, 4);
    let log = backend.log_handle();
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    let background = scene.options().background_layer;
    scene.update(3.0).unwrap();

    let layers = log.borrow().display_layers.clone();
    assert_eq!(layers, vec![background, 3.0]);
}

#[test]
fn unavailable_backend_gates_everything() {
    let backend = MockBackend::unavailable(4, 4);
    let log = backend.log_handle();
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "a", &[Vec3::ZERO], PickScheme::ByGeometry);
    let select = scene.options().select_layer;

    scene.update(select).unwrap();
    scene.update(2.0).unwrap();
    assert_eq!(scene.pick_at(0, 0), None);
    assert!(scene.pick_rect(0, 0, 4, 4).is_empty());
    assert!(scene.pick_polygon(&[0.0, 0.0, 3.0, 0.0, 3.0, 3.0, 0.0, 0.0]).is_empty());

    let log = log.borrow();
    assert_eq!(log.selection_passes, 0);
    assert!(log.display_layers.is_empty());
}

#[test]
fn geometry_resize_triggers_renumbering() {
    let backend = MockBackend::new(8, 8);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));

    point_entity(&mut scene, "a", &[Vec3::ZERO, Vec3::X], PickScheme::ByVertex);
    point_entity(&mut scene, "b", &[Vec3::new(2.0, 0.0, 0.0)], PickScheme::ByGeometry);

    let select = scene.options().select_layer;
    scene.update(select).unwrap();
    let (_, a_max_before) = scene.entity("a").unwrap().color_range.unwrap();
    let (b_min_before, _) = scene.entity("b").unwrap().color_range.unwrap();
    assert_eq!(b_min_before, a_max_before + 1);

    // Growing entity a must push b's range outward on the next rebuild.
    point_entity(
        &mut scene,
        "a",
        &[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
        PickScheme::ByVertex,
    );
    scene.update(select).unwrap();
    let (_, a_max_after) = scene.entity("a").unwrap().color_range.unwrap();
    let (b_min_after, _) = scene.entity("b").unwrap().color_range.unwrap();
    assert!(a_max_after > a_max_before);
    assert_eq!(b_min_after, a_max_after + 1);
}

#[test]
fn fit_camera_centers_the_scene() {
    let backend = MockBackend::new(640, 480);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));
    scene
        .set_geometry(
            "mesh",
            Geometry::from_positions(
                vec![Vec3::new(-2.0, -1.0, 0.0), Vec3::new(4.0, 3.0, 2.0)],
                DrawMode::Points,
            ),
        )
        .unwrap();

    let mut camera = OrthographicCamera::new();
    scene.fit_camera(&mut camera);

    let center = Vec3::new(1.0, 1.0, 1.0);
    let projected = camera.world_to_screen(center);
    assert!((projected.x - 320.0).abs() < 0.5);
    assert!((projected.y - 240.0).abs() < 0.5);
}

proptest! {
    /// Pick-miss invariant: an all-background capture answers every
    /// coordinate, in or out of range, with a clean miss.
    #[test]
    fn background_capture_misses_for_any_coordinate(x in -64i32..128, y in -64i32..128) {
        let backend = MockBackend::new(32, 32);
        let mut scene = SceneRegistry::with_defaults(Box::new(backend));
        let select = scene.options().select_layer;
        scene.update(select).unwrap();

        prop_assert_eq!(scene.pick_at(x, y), None);
        prop_assert!(scene.pick_rect(x, y, 5, 5).is_empty());
    }
}

#[test]
fn bounding_box_spans_committed_geometry() {
    let backend = MockBackend::new(4, 4);
    let mut scene = SceneRegistry::with_defaults(Box::new(backend));
    assert!(scene.bounding_box().is_none());

    scene
        .set_geometry(
            "a",
            Geometry::from_positions(
                vec![Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 5.0, -2.0)],
                DrawMode::Points,
            ),
        )
        .unwrap();
    let (min, max) = scene.bounding_box().unwrap();
    assert_eq!(min, Vec3::new(-1.0, 0.0, -2.0));
    assert_eq!(max, Vec3::new(3.0, 5.0, 2.0));
}
