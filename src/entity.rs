//! Boundary with the entity store that owns entity lifetime.

use glam::DVec2;
use std::collections::HashMap;

use crate::types::EntityId;

/// Read/write access the physics core needs from the owner of entities.
pub trait EntityStore {
    fn is_alive(&self, id: EntityId) -> bool;

    /// Top-left corner in world space.
    fn position(&self, id: EntityId) -> Option<DVec2>;

    fn size(&self, id: EntityId) -> Option<DVec2>;

    /// Write back an integrated position. Ignored for dead handles.
    fn set_position(&mut self, id: EntityId, pos: DVec2);

    fn center(&self, id: EntityId) -> Option<DVec2> {
        Some(self.position(id)? + self.size(id)? * 0.5)
    }
}

#[derive(Copy, Clone, Debug)]
struct Body {
    pos: DVec2,
    size: DVec2,
}

/// Minimal in-memory store. Handles are issued from a monotonic counter.
#[derive(Debug, Default)]
pub struct EntityTable {
    next: u64,
    bodies: HashMap<EntityId, Body>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, pos: DVec2, size: DVec2) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        self.bodies.insert(id, Body { pos, size });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl EntityStore for EntityTable {
    fn is_alive(&self, id: EntityId) -> bool {
        self.bodies.contains_key(&id)
    }

    fn position(&self, id: EntityId) -> Option<DVec2> {
        self.bodies.get(&id).map(|b| b.pos)
    }

    fn size(&self, id: EntityId) -> Option<DVec2> {
        self.bodies.get(&id).map(|b| b.size)
    }

    fn set_position(&mut self, id: EntityId, pos: DVec2) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.pos = pos;
        }
    }
}
