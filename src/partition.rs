use glam::DVec2;

use crate::api::SpatialPartition;
use crate::config::PartitionConfig;
use crate::grid::GridPartition;
use crate::types::*;
use crate::zone::ZonePartition;

/// Partition strategy selected once from configuration.
pub enum Partition {
    Grid(GridPartition),
    Zone(ZonePartition),
}

impl Partition {
    pub fn from_config(cfg: &PartitionConfig) -> Self {
        match cfg {
            PartitionConfig::Grid(g) => Partition::Grid(GridPartition::new(g.clone())),
            PartitionConfig::Zone(z) => Partition::Zone(ZonePartition::new(z.clone())),
        }
    }

    pub fn as_grid(&self) -> Option<&GridPartition> {
        match self {
            Partition::Grid(g) => Some(g),
            Partition::Zone(_) => None,
        }
    }

    pub fn as_zone(&self) -> Option<&ZonePartition> {
        match self {
            Partition::Zone(z) => Some(z),
            Partition::Grid(_) => None,
        }
    }

    /// Mutable access for zone streaming (`load_zone`, `unload_zone`, ...).
    pub fn as_zone_mut(&mut self) -> Option<&mut ZonePartition> {
        match self {
            Partition::Zone(z) => Some(z),
            Partition::Grid(_) => None,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            Partition::Grid($p) => $body,
            Partition::Zone($p) => $body,
        }
    };
}

impl SpatialPartition for Partition {
    fn insert(&mut self, id: EntityId, pos: DVec2, size: DVec2) {
        dispatch!(self, p => p.insert(id, pos, size))
    }

    fn remove(&mut self, id: EntityId) -> bool {
        dispatch!(self, p => p.remove(id))
    }

    fn update(&mut self, id: EntityId, pos: DVec2, size: DVec2) -> bool {
        dispatch!(self, p => p.update(id, pos, size))
    }

    fn footprint(&self, id: EntityId) -> Option<&Footprint> {
        dispatch!(self, p => p.footprint(id))
    }

    fn covering(&self, pos: DVec2, size: DVec2) -> Footprint {
        dispatch!(self, p => p.covering(pos, size))
    }

    fn query_point(&self, pos: DVec2) -> Vec<EntityId> {
        dispatch!(self, p => p.query_point(pos))
    }

    fn query_cell(&self, pos: DVec2) -> Vec<EntityId> {
        dispatch!(self, p => p.query_cell(pos))
    }

    fn query_cell_region(&self, pos: DVec2, size: DVec2, margin_x: i32, margin_y: i32) -> Vec<EntityId> {
        dispatch!(self, p => p.query_cell_region(pos, size, margin_x, margin_y))
    }

    fn query_neighbors(&self, pos: DVec2) -> Vec<EntityId> {
        dispatch!(self, p => p.query_neighbors(pos))
    }

    fn query_region_neighbors(&self, pos: DVec2, size: DVec2) -> Vec<EntityId> {
        dispatch!(self, p => p.query_region_neighbors(pos, size))
    }

    fn stats(&self) -> PartitionStats {
        dispatch!(self, p => p.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, ZoneConfig};

    #[test]
    fn test_both_strategies_agree_on_cells() {
        let grid = PartitionConfig::Grid(GridConfig {
            node_size: DVec2::splat(8.0),
            cell_nodes: glam::IVec2::splat(4),
            world_origin: DVec2::ZERO,
        });
        let zone = PartitionConfig::Zone(ZoneConfig::default());
        for cfg in [grid, zone] {
            let mut p = Partition::from_config(&cfg);
            let id = EntityId(1);
            p.insert(id, DVec2::new(-4.0, 40.0), DVec2::splat(2.0));
            assert_eq!(p.query_cell(DVec2::new(-16.0, 33.0)), vec![id]);
            assert!(p.query_cell(DVec2::new(16.0, 33.0)).is_empty());
            assert_eq!(p.query_cell_region(DVec2::new(-4.0, 40.0), DVec2::ZERO, 1, 1), vec![id]);
            assert!(p.remove(id));
            assert_eq!(p.stats(), PartitionStats::default());
        }
    }

    #[test]
    fn test_variant_accessors() {
        let mut p = Partition::from_config(&PartitionConfig::Zone(ZoneConfig::default()));
        assert!(p.as_grid().is_none());
        assert!(p.as_zone_mut().is_some_and(|z| z.load_zone((0, 0))));
        assert!(p.as_zone().is_some_and(|z| z.is_zone_loaded((0, 0))));
    }
}
