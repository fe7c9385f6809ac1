use glam::DVec2;
use std::fmt;

/// Opaque entity handle issued by the owning entity store. Never recycled while alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of registry lookups and toggles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Entity is live and the operation applied.
    EntityFound,
    /// Entity is live but not registered with the relevant registry.
    EntityNotFound,
    /// Handle does not name a live entity.
    EntityInvalid,
}

impl Status {
    pub fn is_found(self) -> bool {
        matches!(self, Status::EntityFound)
    }
}

/// Integer grid coordinate (cell, node or zone).
pub type CellCoord = (i32, i32);

/// One container an entity occupies in a spatial partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpatialKey {
    /// Hierarchical grid: owning cell plus the local node inside it.
    Node { cell: CellCoord, node: CellCoord },
    /// Zone grid: membership is tracked per cell.
    Cell(CellCoord),
}

impl SpatialKey {
    pub fn cell(self) -> CellCoord {
        match self {
            SpatialKey::Node { cell, .. } => cell,
            SpatialKey::Cell(cell) => cell,
        }
    }
}

/// Sorted, de-duplicated set of keys covered by an entity's rectangle.
pub type Footprint = Vec<SpatialKey>;

/// Integration axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A queued directive steering an entity toward `target`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveCommand {
    pub speed: f64,
    pub target: DVec2,
    /// Arrival radius; compared against the integer-truncated distance.
    pub stop_distance: f64,
    /// Clear the queue before appending.
    pub flush: bool,
    /// Measure distance from the entity center instead of its top-left corner.
    pub use_center: bool,
}

/// Occupancy of a spatial partition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Entities with a cached footprint.
    pub entities: usize,
    /// Allocated cells.
    pub cells: usize,
    /// Allocated second-level containers (nodes for the grid, zones for the zone grid).
    pub buckets: usize,
    /// Sum of container member counts; an entity spanning boundaries counts once per container.
    pub memberships: usize,
}

/// Debug statistics for the whole world.
#[derive(Copy, Clone, Debug, Default)]
pub struct WorldStats {
    pub transforms: usize,
    pub colliders: usize,
    pub pending_commands: usize,
    pub partition: PartitionStats,
}

/// Timing breakdown for the last completed `update`.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepTiming {
    pub step_ms: f64,
    pub steer_ms: f64,
    pub collide_ms: f64,
    pub reindex_ms: f64,

    pub entities_stepped: usize,
    pub entities_reindexed: usize,
}
