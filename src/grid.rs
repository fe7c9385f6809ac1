use glam::DVec2;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::api::SpatialPartition;
use crate::config::GridConfig;
use crate::types::*;
use crate::vector::{covered_range, floor_div};

/// Uniform grid whose cells are subdivided into a local grid of nodes.
///
/// Entities are tracked per node; a cell is just the bucket of its nodes, so
/// per-cell member lists stay short even when cells are large.
pub struct GridPartition {
    pub cfg: GridConfig,

    // cell coord -> local node coord -> members (insertion order)
    cells: HashMap<CellCoord, BTreeMap<CellCoord, Vec<EntityId>>>,

    // Engine-owned covering set per indexed entity
    members: HashMap<EntityId, Footprint>,
}

impl GridPartition {
    pub fn new(cfg: GridConfig) -> Self {
        Self {
            cfg,
            cells: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Global node coordinate containing `pos`.
    pub fn node_of(&self, pos: DVec2) -> CellCoord {
        floor_div(pos, self.cfg.world_origin, self.cfg.node_size)
    }

    /// Cell coordinate containing `pos`.
    pub fn cell_of(&self, pos: DVec2) -> CellCoord {
        self.split(self.node_of(pos)).0
    }

    /// Split a global node coordinate into (cell, local node).
    fn split(&self, global: CellCoord) -> (CellCoord, CellCoord) {
        let n = self.cfg.cell_nodes;
        (
            (global.0.div_euclid(n.x), global.1.div_euclid(n.y)),
            (global.0.rem_euclid(n.x), global.1.rem_euclid(n.y)),
        )
    }

    fn node_members(&self, global: CellCoord) -> Option<&Vec<EntityId>> {
        let (cell, node) = self.split(global);
        self.cells.get(&cell)?.get(&node)
    }

    /// Members of the node containing `pos`.
    pub fn query_node(&self, pos: DVec2) -> Vec<EntityId> {
        self.node_members(self.node_of(pos)).cloned().unwrap_or_default()
    }

    /// Members of every node overlapping `[pos, pos + size)`.
    pub fn query_node_region(&self, pos: DVec2, size: DVec2) -> Vec<EntityId> {
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.node_size);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for gy in lo.1..=hi.1 { for gx in lo.0..=hi.0 {
            if let Some(list) = self.node_members((gx, gy)) {
                extend_unique(&mut out, &mut seen, list);
            }
        }}
        out
    }

    /// Members of the 3x3 block of nodes around `pos`, crossing cell borders as needed.
    pub fn query_neighbor_nodes(&self, pos: DVec2) -> Vec<EntityId> {
        let (nx, ny) = self.node_of(pos);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for dy in -1..=1 { for dx in -1..=1 {
            if let Some(list) = self.node_members((nx.saturating_add(dx), ny.saturating_add(dy))) {
                extend_unique(&mut out, &mut seen, list);
            }
        }}
        out
    }

    /// Members of the 3x3 block of cells around `pos`.
    pub fn query_neighbor_cells(&self, pos: DVec2) -> Vec<EntityId> {
        let (cx, cy) = self.cell_of(pos);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for dy in -1..=1 { for dx in -1..=1 {
            self.extend_cell(&mut out, &mut seen, (cx.saturating_add(dx), cy.saturating_add(dy)));
        }}
        out
    }

    fn extend_cell(&self, out: &mut Vec<EntityId>, seen: &mut HashSet<EntityId>, cell: CellCoord) {
        if let Some(nodes) = self.cells.get(&cell) {
            for list in nodes.values() {
                extend_unique(out, seen, list);
            }
        }
    }

    /// Number of allocated cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Grow an inclusive coordinate range by a margin per side, saturating at the `i32` bounds.
pub(crate) fn pad(lo: CellCoord, hi: CellCoord, margin_x: i32, margin_y: i32) -> (CellCoord, CellCoord) {
    (
        (lo.0.saturating_sub(margin_x), lo.1.saturating_sub(margin_y)),
        (hi.0.saturating_add(margin_x), hi.1.saturating_add(margin_y)),
    )
}

pub(crate) fn extend_unique(out: &mut Vec<EntityId>, seen: &mut HashSet<EntityId>, list: &[EntityId]) {
    for &id in list {
        if seen.insert(id) {
            out.push(id);
        }
    }
}

impl SpatialPartition for GridPartition {
    fn insert(&mut self, id: EntityId, pos: DVec2, size: DVec2) {
        if self.members.contains_key(&id) {
            self.remove(id);
        }
        let footprint = self.covering(pos, size);
        for key in &footprint {
            if let SpatialKey::Node { cell, node } = *key {
                let list = self.cells.entry(cell).or_default().entry(node).or_default();
                if !list.contains(&id) {
                    list.push(id);
                }
            }
        }
        self.members.insert(id, footprint);
    }

    fn remove(&mut self, id: EntityId) -> bool {
        let Some(footprint) = self.members.remove(&id) else { return false; };
        for key in footprint {
            let SpatialKey::Node { cell, node } = key else { continue; };
            let Some(nodes) = self.cells.get_mut(&cell) else { continue; };
            if let Some(list) = nodes.get_mut(&node) {
                list.retain(|e| *e != id);
                if list.is_empty() {
                    nodes.remove(&node);
                }
            }
            if nodes.is_empty() {
                self.cells.remove(&cell);
            }
        }
        true
    }

    fn footprint(&self, id: EntityId) -> Option<&Footprint> {
        self.members.get(&id)
    }

    fn covering(&self, pos: DVec2, size: DVec2) -> Footprint {
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.node_size);
        let mut keys = Vec::new();
        for gy in lo.1..=hi.1 { for gx in lo.0..=hi.0 {
            let (cell, node) = self.split((gx, gy));
            keys.push(SpatialKey::Node { cell, node });
        }}
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    fn query_point(&self, pos: DVec2) -> Vec<EntityId> {
        self.query_node(pos)
    }

    fn query_cell(&self, pos: DVec2) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.extend_cell(&mut out, &mut seen, self.cell_of(pos));
        out
    }

    fn query_cell_region(&self, pos: DVec2, size: DVec2, margin_x: i32, margin_y: i32) -> Vec<EntityId> {
        // Cells come from the node range so saturated coordinates agree with `cell_of`
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.node_size);
        let (lo, hi) = (self.split(lo).0, self.split(hi).0);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let (lo, hi) = pad(lo, hi, margin_x, margin_y);
        for cy in lo.1..=hi.1 { for cx in lo.0..=hi.0 {
            self.extend_cell(&mut out, &mut seen, (cx, cy));
        }}
        out
    }

    fn query_neighbors(&self, pos: DVec2) -> Vec<EntityId> {
        self.query_neighbor_nodes(pos)
    }

    fn query_region_neighbors(&self, pos: DVec2, size: DVec2) -> Vec<EntityId> {
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.node_size);
        let (lo, hi) = pad(lo, hi, 1, 1);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for gy in lo.1..=hi.1 { for gx in lo.0..=hi.0 {
            if let Some(list) = self.node_members((gx, gy)) {
                extend_unique(&mut out, &mut seen, list);
            }
        }}
        out
    }

    fn stats(&self) -> PartitionStats {
        PartitionStats {
            entities: self.members.len(),
            cells: self.cells.len(),
            buckets: self.cells.values().map(|n| n.len()).sum(),
            memberships: self.cells.values().flat_map(|n| n.values()).map(|l| l.len()).sum(),
        }
    }
}
