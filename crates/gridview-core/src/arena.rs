//! Generation-checked entity arena.
//!
//! Entities live in stable slots; destroying one bumps the slot generation
//! and recycles the index, so a handle held across a destroy can never
//! observe another entity's data. Ordering concerns (dense insertion order)
//! belong to the registry, not the arena.

use crate::entity::Entity;

/// A stable, generation-checked reference to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// The slot index. Only meaningful to the owning arena.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// The generation this handle was issued for.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Arena of entities with stable handles.
#[derive(Debug, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EntityArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, reusing a free slot when one exists.
    pub fn insert(&mut self, entity: Entity) -> EntityHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            EntityHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).expect("arena slot count exceeds u32");
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            EntityHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Removes the entity behind `handle`, bumping the slot generation.
    ///
    /// Returns `None` if the handle is stale or the slot is already empty.
    pub fn remove(&mut self, handle: EntityHandle) -> Option<Entity> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(entity)
    }

    /// Returns the entity behind `handle`, or `None` for a stale handle.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    /// Mutable access to the entity behind `handle`.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns true when no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut arena = EntityArena::new();
        let h = arena.insert(Entity::new("a", 1.0));
        assert_eq!(arena.get(h).unwrap().key(), "a");
        assert_eq!(arena.len(), 1);

        let removed = arena.remove(h).unwrap();
        assert_eq!(removed.key(), "a");
        assert!(arena.is_empty());
        assert!(arena.get(h).is_none());
    }

    #[test]
    fn stale_handle_rejected_after_slot_reuse() {
        let mut arena = EntityArena::new();
        let a = arena.insert(Entity::new("a", 1.0));
        arena.remove(a);

        let b = arena.insert(Entity::new("b", 1.0));
        assert_eq!(b.index(), a.index(), "slot should be recycled");
        assert!(arena.get(a).is_none(), "old-generation handle must not resolve");
        assert_eq!(arena.get(b).unwrap().key(), "b");
    }

    #[test]
    fn double_remove_is_none() {
        let mut arena = EntityArena::new();
        let h = arena.insert(Entity::new("a", 1.0));
        assert!(arena.remove(h).is_some());
        assert!(arena.remove(h).is_none());
    }
}
