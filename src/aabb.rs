use glam::DVec2;

use std::collections::HashMap;

use crate::entity::EntityStore;
use crate::types::EntityId;
use crate::vector::Rect;

/// Collision box relative to the owning entity's position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AabbRecord {
    pub offset: DVec2,
    pub size: DVec2,
}

impl AabbRecord {
    /// Offset and size must be finite; size must be non-negative.
    pub fn new(offset: DVec2, size: DVec2) -> Option<Self> {
        let valid = offset.is_finite() && size.is_finite() && size.x >= 0.0 && size.y >= 0.0;
        valid.then_some(Self { offset, size })
    }

    /// World-space box for an entity standing at `pos`.
    pub fn rect_at(&self, pos: DVec2) -> Rect {
        Rect::new(pos + self.offset, self.size)
    }
}

/// Per-entity collision boxes, independent of transform records.
#[derive(Default)]
pub struct AabbRegistry {
    records: HashMap<EntityId, AabbRecord>,
}

impl AabbRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&AabbRecord> {
        self.records.get(&id)
    }

    pub fn insert(&mut self, id: EntityId, record: AabbRecord) {
        self.records.insert(id, record);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<AabbRecord> {
        self.records.remove(&id)
    }

    /// Current world-space box, if `id` is collidable and alive.
    pub fn bounds<S: EntityStore>(&self, store: &S, id: EntityId) -> Option<Rect> {
        let record = self.records.get(&id)?;
        Some(record.rect_at(store.position(id)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
