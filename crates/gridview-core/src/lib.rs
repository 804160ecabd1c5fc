//! Core abstractions for gridview-rs.
//!
//! This crate provides the leaf components of the picking pipeline:
//! - [`codec`] for 24-bit color-ID ⇄ RGB888 conversion
//! - [`ColorReservationTable`] for per-entity contiguous ID ranges
//! - The [`Entity`] model: geometry payload, display layer, pick scheme
//! - [`EntityArena`], a generation-checked stable store for entities

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod arena;
pub mod codec;
pub mod entity;
pub mod error;
pub mod options;
pub mod reservation;

pub use arena::{EntityArena, EntityHandle};
pub use entity::{DrawMode, Entity, Geometry, PickScheme};
pub use error::{GridViewError, Result};
pub use options::Options;
pub use reservation::{ColorReservation, ColorReservationTable, FIRST_COLOR_ID};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
