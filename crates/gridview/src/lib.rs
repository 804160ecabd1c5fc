//! gridview-rs: the picking and camera-transform core of an interactive 3D
//! scene viewer.
//!
//! Entities register with a [`SceneRegistry`] under unique string keys and
//! declare a pick scheme (per vertex, per primitive, or whole geometry).
//! Before a selection pass the registry packs disjoint 24-bit color-ID
//! ranges, the external [`RenderBackend`] draws every pickable unit in its
//! encoded flat color, and the captured buffers answer point, rectangle,
//! and lasso polygon queries. The [`OrthographicCamera`] supplies the
//! screen↔world transforms and pan/rotate/zoom rules that drive the view.
//!
//! ```no_run
//! use gridview_rs::*;
//!
//! # fn backend() -> Box<dyn RenderBackend> { unimplemented!() }
//! let mut scene = SceneRegistry::with_defaults(backend());
//! scene.get_or_create("hull");
//! scene.set_pick_scheme("hull", PickScheme::ByGeometry).unwrap();
//!
//! let select_layer = scene.options().select_layer;
//! scene.update(select_layer).unwrap();
//! if let Some((key, sub_id)) = scene.pick_at(120, 80) {
//!     println!("picked {key} / {sub_id}");
//! }
//! ```

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod events;
pub mod scene;

pub use events::{EventSink, NullEventSink};
pub use scene::SceneRegistry;

pub use gridview_core::{
    codec, ColorReservation, ColorReservationTable, DrawMode, Entity, EntityArena, EntityHandle,
    Geometry, GridViewError, Options, PickScheme, Result, FIRST_COLOR_ID,
};
pub use gridview_render::{
    view_state, FrameCapture, OrthographicCamera, Ray, RenderBackend, RenderError, RenderResult,
    ScanMode, SelectionFramebuffer, ViewState, ViewVolume,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Initializes logging for interactive use. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
    log::debug!("gridview-rs logging initialized");
}
