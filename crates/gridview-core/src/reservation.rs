//! Color-ID reservation table.
//!
//! Every pickable entity owns a contiguous range of 24-bit color IDs. The
//! table assigns ranges from a monotonically advancing cursor and resolves a
//! decoded pixel ID back to the owning entity. Ranges are recomputed lazily:
//! scene changes only set a dirty flag, and the actual rebuild happens at
//! most once per frame, just before a selection pass.

use crate::arena::EntityHandle;
use crate::codec::BACKGROUND_ID;

/// First ID handed out by the allocator. Low IDs stay free for non-picking
/// uses (background, UI overlays drawn into the same target).
pub const FIRST_COLOR_ID: u32 = 10_000;

/// A contiguous ID range `[min, max]` owned by one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorReservation {
    /// Owning entity.
    pub handle: EntityHandle,
    /// First ID of the range.
    pub min: u32,
    /// Last ID of the range, inclusive.
    pub max: u32,
}

/// Table of all current reservations, in allocation order.
#[derive(Debug, Default)]
pub struct ColorReservationTable {
    reservations: Vec<ColorReservation>,
    cursor: u32,
    dirty: bool,
}

impl ColorReservationTable {
    /// Creates an empty table with the cursor at [`FIRST_COLOR_ID`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            reservations: Vec::new(),
            cursor: FIRST_COLOR_ID,
            dirty: false,
        }
    }

    /// Marks the table stale; the next [`rebuild`](Self::rebuild) will
    /// renumber everything.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a rebuild is pending.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reserves `count` IDs for `handle` at the current cursor.
    ///
    /// A reservation of exactly one ID spans exactly one ID (`max == min`);
    /// larger reservations also cover the closing ID at `min + count`, which
    /// keeps `min` of each successive entity at the previous `max + 1`.
    /// `count == 0` allocates nothing and returns `None`.
    pub fn reserve(&mut self, handle: EntityHandle, count: usize) -> Option<(u32, u32)> {
        if count == 0 {
            return None;
        }
        let min = self.cursor;
        let max = if count == 1 {
            min
        } else {
            min + u32::try_from(count).ok()?
        };
        self.cursor = max + 1;
        self.reservations.push(ColorReservation { handle, min, max });
        Some((min, max))
    }

    /// Resolves a decoded pixel ID to the owning entity.
    ///
    /// Returns `None` for the background ID, for IDs past the last allocated
    /// range, and for IDs falling into a gap. Gaps cannot occur while the
    /// contiguity invariant holds, but a stale capture can still present one
    /// and must not crash.
    #[must_use]
    pub fn resolve(&self, color_id: u32) -> Option<&ColorReservation> {
        if color_id == BACKGROUND_ID {
            return None;
        }
        self.reservations
            .iter()
            .find(|r| r.min <= color_id && color_id <= r.max)
    }

    /// Renumbers every reservation from scratch.
    ///
    /// `entries` must supply `(handle, id_count)` pairs in stable insertion
    /// order; the result is fully packed and reproducible, so calling this
    /// twice with the same entries yields identical ranges. Clears the dirty
    /// flag.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (EntityHandle, usize)>) {
        self.reservations.clear();
        self.cursor = FIRST_COLOR_ID;
        for (handle, count) in entries {
            self.reserve(handle, count);
        }
        self.dirty = false;
        log::debug!(
            "reservation table rebuilt: {} ranges, next id {}",
            self.reservations.len(),
            self.cursor
        );
    }

    /// The range currently assigned to `handle`, if any.
    #[must_use]
    pub fn range_of(&self, handle: EntityHandle) -> Option<(u32, u32)> {
        self.reservations
            .iter()
            .find(|r| r.handle == handle)
            .map(|r| (r.min, r.max))
    }

    /// All reservations in allocation order.
    #[must_use]
    pub fn reservations(&self) -> &[ColorReservation] {
        &self.reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::EntityArena;
    use crate::entity::Entity;

    fn handles(n: usize) -> Vec<EntityHandle> {
        let mut arena = EntityArena::new();
        (0..n)
            .map(|i| arena.insert(Entity::new(format!("e{i}"), 1.0)))
            .collect()
    }

    #[test]
    fn ranges_are_contiguous_and_disjoint() {
        let hs = handles(3);
        let mut table = ColorReservationTable::new();
        table.rebuild(vec![(hs[0], 5), (hs[1], 1), (hs[2], 8)]);

        let rs = table.reservations();
        assert_eq!(rs[0].min, FIRST_COLOR_ID);
        for pair in rs.windows(2) {
            assert_eq!(pair[1].min, pair[0].max + 1);
        }
    }

    #[test]
    fn single_id_reservation_spans_one_id() {
        let hs = handles(2);
        let mut table = ColorReservationTable::new();
        let (min, max) = table.reserve(hs[0], 1).unwrap();
        assert_eq!(min, max);

        let (next_min, _) = table.reserve(hs[1], 3).unwrap();
        assert_eq!(next_min, max + 1);
    }

    #[test]
    fn zero_count_reserves_nothing() {
        let hs = handles(1);
        let mut table = ColorReservationTable::new();
        assert!(table.reserve(hs[0], 0).is_none());
        assert!(table.reservations().is_empty());
    }

    #[test]
    fn resolve_hits_and_misses() {
        let hs = handles(2);
        let mut table = ColorReservationTable::new();
        table.rebuild(vec![(hs[0], 4), (hs[1], 1)]);

        let (min0, max0) = table.range_of(hs[0]).unwrap();
        assert_eq!(table.resolve(min0).unwrap().handle, hs[0]);
        assert_eq!(table.resolve(max0).unwrap().handle, hs[0]);
        assert_eq!(table.resolve(max0 + 1).unwrap().handle, hs[1]);

        assert!(table.resolve(BACKGROUND_ID).is_none());
        assert!(table.resolve(FIRST_COLOR_ID - 1).is_none());
        assert!(table.resolve(max0 + 2).is_none(), "past the last range");
    }

    #[test]
    fn rebuild_is_idempotent() {
        let hs = handles(3);
        let entries = vec![(hs[0], 7), (hs[1], 1), (hs[2], 2)];
        let mut table = ColorReservationTable::new();

        table.rebuild(entries.clone());
        let first: Vec<_> = table.reservations().to_vec();

        table.rebuild(entries);
        assert_eq!(table.reservations(), first.as_slice());
    }

    #[test]
    fn dirty_flag_lifecycle() {
        let mut table = ColorReservationTable::new();
        assert!(!table.is_dirty());
        table.mark_dirty();
        assert!(table.is_dirty());
        table.rebuild(Vec::new());
        assert!(!table.is_dirty());
    }
}
