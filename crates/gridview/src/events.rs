//! Scene event sink.
//!
//! The surrounding UI used to learn about scene changes through a global
//! publisher; here the registry takes an explicit sink at construction
//! instead. Implementors get called synchronously on the frame thread and
//! must not re-enter the registry.

/// Receiver for scene lifecycle notifications.
pub trait EventSink {
    /// An entity was created by first reference.
    fn entity_created(&mut self, _key: &str) {}

    /// An entity was destroyed.
    fn entity_destroyed(&mut self, _key: &str) {}

    /// The color reservation table was renumbered.
    fn reservations_rebuilt(&mut self, _entity_count: usize) {}

    /// A selection pass was captured at the given size.
    fn selection_captured(&mut self, _width: u32, _height: u32) {}
}

/// A sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {}
