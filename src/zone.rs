use glam::DVec2;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::api::SpatialPartition;
use crate::config::ZoneConfig;
use crate::grid::{extend_unique, pad};
use crate::types::*;
use crate::vector::{covered_range, floor_div};

/// Uniform cell grid with cells bucketed under coarser zones.
///
/// Membership is always per cell. Zones only exist so a whole region of the
/// world can be streamed in or out with a single key.
pub struct ZonePartition {
    pub cfg: ZoneConfig,

    // zone coord -> cell coord -> members (insertion order)
    zones: HashMap<CellCoord, BTreeMap<CellCoord, Vec<EntityId>>>,

    members: HashMap<EntityId, Footprint>,
}

impl ZonePartition {
    pub fn new(cfg: ZoneConfig) -> Self {
        Self {
            cfg,
            zones: HashMap::new(),
            members: HashMap::new(),
        }
    }

    pub fn cell_of(&self, pos: DVec2) -> CellCoord {
        floor_div(pos, self.cfg.world_origin, self.cfg.cell_size)
    }

    pub fn zone_of_cell(&self, cell: CellCoord) -> CellCoord {
        let z = self.cfg.zone_cells;
        (cell.0.div_euclid(z.x), cell.1.div_euclid(z.y))
    }

    pub fn zone_of(&self, pos: DVec2) -> CellCoord {
        self.zone_of_cell(self.cell_of(pos))
    }

    /// Zone extent in world units.
    pub fn zone_extent(&self) -> DVec2 {
        self.cfg.cell_size * self.cfg.zone_cells.as_dvec2()
    }

    fn cell_members(&self, cell: CellCoord) -> Option<&Vec<EntityId>> {
        self.zones.get(&self.zone_of_cell(cell))?.get(&cell)
    }

    // --- Streaming ---------------------------------------------------------

    pub fn is_zone_loaded(&self, zone: CellCoord) -> bool {
        self.zones.contains_key(&zone)
    }

    /// Loaded zone keys in ascending order.
    pub fn loaded_zones(&self) -> Vec<CellCoord> {
        let mut zones: Vec<_> = self.zones.keys().copied().collect();
        zones.sort_unstable();
        zones
    }

    /// Allocate an empty zone. Returns false if it was already loaded.
    pub fn load_zone(&mut self, zone: CellCoord) -> bool {
        if self.zones.contains_key(&zone) {
            return false;
        }
        self.zones.insert(zone, BTreeMap::new());
        true
    }

    /// Drop a zone with all its cells. Returns the evicted entities.
    pub fn unload_zone(&mut self, zone: CellCoord) -> Vec<EntityId> {
        let Some(cells) = self.zones.remove(&zone) else { return Vec::new(); };
        let mut evicted = Vec::new();
        let mut seen = HashSet::new();
        for (cell, list) in cells {
            for id in list {
                self.evict(id, cell);
                if seen.insert(id) {
                    evicted.push(id);
                }
            }
        }
        log::debug!("unloaded zone {:?}, evicted {} entities", zone, evicted.len());
        evicted
    }

    /// Allocate an empty cell, loading its zone if needed.
    pub fn load_cell(&mut self, cell: CellCoord) {
        let zone = self.zone_of_cell(cell);
        self.zones.entry(zone).or_default().entry(cell).or_default();
    }

    /// Drop one cell, pruning its zone if that empties it. Returns the evicted entities.
    pub fn unload_cell(&mut self, cell: CellCoord) -> Vec<EntityId> {
        let zone = self.zone_of_cell(cell);
        let Some(cells) = self.zones.get_mut(&zone) else { return Vec::new(); };
        let list = cells.remove(&cell).unwrap_or_default();
        if cells.is_empty() {
            self.zones.remove(&zone);
        }
        for &id in &list {
            self.evict(id, cell);
        }
        list
    }

    // Forget one cell of an entity's footprint; fully evicted entities are no longer indexed.
    fn evict(&mut self, id: EntityId, cell: CellCoord) {
        if let Some(fp) = self.members.get_mut(&id) {
            fp.retain(|k| *k != SpatialKey::Cell(cell));
            if fp.is_empty() {
                self.members.remove(&id);
            }
        }
    }

    // --- Zone queries ------------------------------------------------------

    /// Members of every cell in the zone containing `pos`.
    pub fn query_zone(&self, pos: DVec2) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.extend_zone(&mut out, &mut seen, self.zone_of(pos));
        out
    }

    /// Members of every zone overlapping `[pos, pos + size)` padded by `margin` zones per side.
    pub fn query_zone_region(&self, pos: DVec2, size: DVec2, margin_x: i32, margin_y: i32) -> Vec<EntityId> {
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.cell_size);
        let (lo, hi) = (self.zone_of_cell(lo), self.zone_of_cell(hi));
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let (lo, hi) = pad(lo, hi, margin_x, margin_y);
        for zy in lo.1..=hi.1 { for zx in lo.0..=hi.0 {
            self.extend_zone(&mut out, &mut seen, (zx, zy));
        }}
        out
    }

    fn extend_zone(&self, out: &mut Vec<EntityId>, seen: &mut HashSet<EntityId>, zone: CellCoord) {
        if let Some(cells) = self.zones.get(&zone) {
            for list in cells.values() {
                extend_unique(out, seen, list);
            }
        }
    }
}

impl SpatialPartition for ZonePartition {
    fn insert(&mut self, id: EntityId, pos: DVec2, size: DVec2) {
        if self.members.contains_key(&id) {
            self.remove(id);
        }
        let footprint = self.covering(pos, size);
        for key in &footprint {
            let cell = key.cell();
            let zone = self.zone_of_cell(cell);
            let list = self.zones.entry(zone).or_default().entry(cell).or_default();
            if !list.contains(&id) {
                list.push(id);
            }
        }
        self.members.insert(id, footprint);
    }

    fn remove(&mut self, id: EntityId) -> bool {
        let Some(footprint) = self.members.remove(&id) else { return false; };
        for key in footprint {
            let cell = key.cell();
            let zone = self.zone_of_cell(cell);
            let Some(cells) = self.zones.get_mut(&zone) else { continue; };
            if let Some(list) = cells.get_mut(&cell) {
                list.retain(|e| *e != id);
                if list.is_empty() {
                    cells.remove(&cell);
                }
            }
            if cells.is_empty() {
                self.zones.remove(&zone);
            }
        }
        true
    }

    fn footprint(&self, id: EntityId) -> Option<&Footprint> {
        self.members.get(&id)
    }

    fn covering(&self, pos: DVec2, size: DVec2) -> Footprint {
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.cell_size);
        let mut keys = Vec::new();
        for cy in lo.1..=hi.1 { for cx in lo.0..=hi.0 {
            keys.push(SpatialKey::Cell((cx, cy)));
        }}
        keys.sort_unstable();
        keys
    }

    fn query_point(&self, pos: DVec2) -> Vec<EntityId> {
        self.query_cell(pos)
    }

    fn query_cell(&self, pos: DVec2) -> Vec<EntityId> {
        self.cell_members(self.cell_of(pos)).cloned().unwrap_or_default()
    }

    fn query_cell_region(&self, pos: DVec2, size: DVec2, margin_x: i32, margin_y: i32) -> Vec<EntityId> {
        let (lo, hi) = covered_range(pos, size, self.cfg.world_origin, self.cfg.cell_size);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let (lo, hi) = pad(lo, hi, margin_x, margin_y);
        for cy in lo.1..=hi.1 { for cx in lo.0..=hi.0 {
            if let Some(list) = self.cell_members((cx, cy)) {
                extend_unique(&mut out, &mut seen, list);
            }
        }}
        out
    }

    fn query_neighbors(&self, pos: DVec2) -> Vec<EntityId> {
        let (cx, cy) = self.cell_of(pos);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for dy in -1..=1 { for dx in -1..=1 {
            if let Some(list) = self.cell_members((cx.saturating_add(dx), cy.saturating_add(dy))) {
                extend_unique(&mut out, &mut seen, list);
            }
        }}
        out
    }

    fn query_region_neighbors(&self, pos: DVec2, size: DVec2) -> Vec<EntityId> {
        self.query_cell_region(pos, size, 1, 1)
    }

    fn stats(&self) -> PartitionStats {
        PartitionStats {
            entities: self.members.len(),
            cells: self.zones.values().map(|c| c.len()).sum(),
            buckets: self.zones.len(),
            memberships: self.zones.values().flat_map(|c| c.values()).map(|l| l.len()).sum(),
        }
    }
}
