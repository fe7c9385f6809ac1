use glam::DVec2;

use crate::config::WorldConfig;
use crate::entity::EntityStore;
use crate::error::CommandError;
use crate::types::*;

/// Capability shared by every spatial partition strategy.
pub trait SpatialPartition {
    // --- Membership --------------------------------------------------------

    /// Index `id` under every container its rectangle `[pos, pos + size)` covers.
    /// An entity that is already indexed is moved, never duplicated.
    fn insert(&mut self, id: EntityId, pos: DVec2, size: DVec2);

    /// Drop `id` from every container it occupies and prune emptied containers.
    /// Returns false if the entity was not indexed.
    fn remove(&mut self, id: EntityId) -> bool;

    /// Re-index `id` if its footprint changed. Returns true when membership moved.
    fn update(&mut self, id: EntityId, pos: DVec2, size: DVec2) -> bool {
        let next = self.covering(pos, size);
        if self.footprint(id) == Some(&next) {
            return false;
        }
        self.remove(id);
        self.insert(id, pos, size);
        true
    }

    /// Cached footprint of an indexed entity.
    fn footprint(&self, id: EntityId) -> Option<&Footprint>;

    /// Footprint a rectangle would occupy, without touching the index.
    fn covering(&self, pos: DVec2, size: DVec2) -> Footprint;

    fn contains(&self, id: EntityId) -> bool {
        self.footprint(id).is_some()
    }

    // --- Queries -----------------------------------------------------------

    /// Members of the finest container holding `pos` (node or cell).
    fn query_point(&self, pos: DVec2) -> Vec<EntityId>;

    /// Members of the cell holding `pos`.
    fn query_cell(&self, pos: DVec2) -> Vec<EntityId>;

    /// Members of every cell overlapping `[pos, pos + size)` padded by `margin` cells per side.
    fn query_cell_region(&self, pos: DVec2, size: DVec2, margin_x: i32, margin_y: i32) -> Vec<EntityId>;

    /// Members of the 3x3 neighborhood around the finest container holding `pos`.
    fn query_neighbors(&self, pos: DVec2) -> Vec<EntityId>;

    /// Members of every finest container overlapping `[pos, pos + size)` plus a
    /// one-container ring around them. Covers `query_neighbors(pos)` for any box at `pos`.
    fn query_region_neighbors(&self, pos: DVec2, size: DVec2) -> Vec<EntityId>;

    fn stats(&self) -> PartitionStats;
}

/// Public API of the physics world.
pub trait PhysicsApi {
    /// Construct a new world with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Registries --------------------------------------------------------

    /// Enable integration for `id`, or disable it (dropping queued commands) if enabled.
    fn toggle_transform<S: EntityStore>(&mut self, store: &S, id: EntityId) -> Status;

    /// Attach a collision box (`offset`, `size` relative to the entity position),
    /// or detach the existing one. Enabling requires both values.
    fn toggle_collision<S: EntityStore>(
        &mut self,
        store: &S,
        id: EntityId,
        offset: Option<DVec2>,
        size: Option<DVec2>,
    ) -> Status;

    // --- Motion ------------------------------------------------------------

    /// Overwrite one or both velocity components. Non-finite components are ignored.
    fn set_velocity<S: EntityStore>(&mut self, store: &S, id: EntityId, dx: Option<f64>, dy: Option<f64>) -> Status;

    fn get_velocity<S: EntityStore>(&self, store: &S, id: EntityId) -> Option<DVec2>;

    /// Per-axis signum of the current velocity.
    fn get_direction<S: EntityStore>(&self, store: &S, id: EntityId) -> Option<(i8, i8)>;

    /// Queue a move command.
    fn move_to<S: EntityStore>(&mut self, store: &S, id: EntityId, cmd: MoveCommand) -> Result<(), CommandError>;

    /// Advance every physics-enabled entity by `dt` seconds.
    fn update<S: EntityStore>(&mut self, store: &mut S, dt: f64);

    // --- Partition ---------------------------------------------------------

    /// Index an entity at its current position.
    fn insert<S: EntityStore>(&mut self, store: &S, id: EntityId) -> Status;

    /// Remove an entity from the partition.
    fn remove(&mut self, id: EntityId) -> Status;

    /// Re-index an entity whose position changed outside `update`.
    fn reindex<S: EntityStore>(&mut self, store: &S, id: EntityId) -> Status;
}
