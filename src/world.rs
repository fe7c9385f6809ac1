use glam::DVec2;

use std::time::Instant;

use crate::aabb::{AabbRecord, AabbRegistry};
use crate::api::{PhysicsApi, SpatialPartition};
use crate::entity::EntityStore;
use crate::error::CommandError;
use crate::narrowphase::Narrowphase;
use crate::partition::Partition;
use crate::transform::{Toggle, TransformRecord, TransformRegistry};
use crate::types::*;
use crate::vector::{direction, Rect};
use crate::config::WorldConfig;

/// Tick-driven physics world: transform and collision registries plus the spatial partition.
pub struct PhysicsWorld {
    pub cfg: WorldConfig,
    pub tick: u64,

    transforms: TransformRegistry,
    colliders: AabbRegistry,
    partition: Partition,

    // Timing for the last update (optional)
    last_timing: Option<StepTiming>,
}

impl PhysicsApi for PhysicsWorld {
    fn new(cfg: WorldConfig) -> Self {
        let partition = Partition::from_config(&cfg.partition);
        Self {
            cfg,
            tick: 0,
            transforms: TransformRegistry::new(),
            colliders: AabbRegistry::new(),
            partition,
            last_timing: None,
        }
    }

    fn toggle_transform<S: EntityStore>(&mut self, store: &S, id: EntityId) -> Status {
        if !store.is_alive(id) {
            log::error!("[physics] invalid entity: {id}");
            return Status::EntityInvalid;
        }
        match self.transforms.toggle(id) {
            Toggle::Enabled => {
                if let Some(rec) = self.transforms.get_mut(id) {
                    rec.spatial_key = self.partition.footprint(id).cloned();
                }
                log::debug!("[physics] toggled entity physics on: {id}");
            }
            Toggle::Disabled => log::debug!("[physics] toggled entity physics off: {id}"),
        }
        Status::EntityFound
    }

    fn toggle_collision<S: EntityStore>(
        &mut self,
        store: &S,
        id: EntityId,
        offset: Option<DVec2>,
        size: Option<DVec2>,
    ) -> Status {
        if !store.is_alive(id) {
            log::error!("[physics] invalid entity: {id}");
            return Status::EntityInvalid;
        }
        if self.colliders.remove(id).is_some() {
            log::debug!("[physics] toggled entity collision off: {id}");
            return Status::EntityFound;
        }
        let Some(record) = offset.zip(size).and_then(|(o, s)| AabbRecord::new(o, s)) else {
            log::debug!("[physics] collision for {id} needs a finite offset and non-negative size");
            return Status::EntityNotFound;
        };
        self.colliders.insert(id, record);
        log::debug!("[physics] toggled entity collision on: {id}");
        Status::EntityFound
    }

    fn set_velocity<S: EntityStore>(&mut self, store: &S, id: EntityId, dx: Option<f64>, dy: Option<f64>) -> Status {
        let status = self.transform_status(store, id);
        match self.transforms.get_mut(id) {
            Some(rec) if status.is_found() => {
                // Non-finite components are dropped; the other axis still applies
                if let Some(dx) = dx.filter(|v| v.is_finite()) { rec.velocity.x = dx; }
                if let Some(dy) = dy.filter(|v| v.is_finite()) { rec.velocity.y = dy; }
                if dx.is_some_and(|v| !v.is_finite()) || dy.is_some_and(|v| !v.is_finite()) {
                    log::warn!("[physics] ignoring non-finite velocity for {id}: ({dx:?}, {dy:?})");
                }
            }
            _ => log::error!("[physics] entity not found: {id}"),
        }
        status
    }

    fn get_velocity<S: EntityStore>(&self, store: &S, id: EntityId) -> Option<DVec2> {
        self.record(store, id).map(|rec| rec.velocity)
    }

    fn get_direction<S: EntityStore>(&self, store: &S, id: EntityId) -> Option<(i8, i8)> {
        self.record(store, id).map(|rec| direction(rec.velocity))
    }

    fn move_to<S: EntityStore>(&mut self, store: &S, id: EntityId, cmd: MoveCommand) -> Result<(), CommandError> {
        if !store.is_alive(id) {
            return Err(CommandError::EntityInvalid(id));
        }
        let capacity = self.cfg.max_commands;
        let rec = self.transforms.get_mut(id).ok_or(CommandError::EntityNotFound(id))?;
        cmd.validate()?;
        if !rec.enqueue(cmd, capacity) {
            return Err(CommandError::QueueFull { entity: id, capacity });
        }
        Ok(())
    }

    fn update<S: EntityStore>(&mut self, store: &mut S, dt: f64) {
        if !(dt.is_finite() && dt >= 0.0) {
            log::warn!("[physics] ignoring update with dt = {dt}");
            return;
        }
        let t_all = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        let mut timing = StepTiming::default();

        let ids = self.transforms.ids().to_vec();
        for id in ids {
            let (Some(mut pos), Some(size)) = (store.position(id), store.size(id)) else {
                log::error!("[physics] skipping transform of dead entity: {id}");
                continue;
            };

            // Steering and damping
            let t0 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
            let Some(rec) = self.transforms.get_mut(id) else { continue; };
            rec.steer(pos, pos + size * 0.5);
            rec.damp(self.cfg.damp_value, self.cfg.damp_threshold, dt);
            let mut vel = rec.velocity;
            timing.steer_ms += elapsed_ms(t0);

            // Integrate X then Y, resolving each axis before moving on
            let t1 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
            let shape = self.colliders.get(id).copied();
            pos.x += vel.x * dt;
            if let Some(shape) = shape {
                let neighbors = gather_neighbors(&self.partition, &self.colliders, &*store, id, shape.rect_at(pos));
                Narrowphase::resolve_axis(Axis::X, id, &mut pos, &mut vel, &shape, &neighbors);
            }
            pos.y += vel.y * dt;
            if let Some(shape) = shape {
                let neighbors = gather_neighbors(&self.partition, &self.colliders, &*store, id, shape.rect_at(pos));
                Narrowphase::resolve_axis(Axis::Y, id, &mut pos, &mut vel, &shape, &neighbors);
            }
            store.set_position(id, pos);
            timing.collide_ms += elapsed_ms(t1);

            // Re-index immediately so later entities this tick see the new cells
            let t2 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
            if self.partition.contains(id) && self.partition.update(id, pos, size) {
                timing.entities_reindexed += 1;
                log::trace!("[physics] re-indexed {id}");
            }
            let key = self.partition.footprint(id).cloned();
            if let Some(rec) = self.transforms.get_mut(id) {
                rec.velocity = vel;
                rec.spatial_key = key;
            }
            timing.reindex_ms += elapsed_ms(t2);
            timing.entities_stepped += 1;
        }

        self.tick = self.tick.wrapping_add(1);
        if let Some(t_all) = t_all {
            timing.step_ms = t_all.elapsed().as_secs_f64() * 1000.0;
            self.last_timing = Some(timing);
        }
    }

    fn insert<S: EntityStore>(&mut self, store: &S, id: EntityId) -> Status {
        let (Some(pos), Some(size)) = (store.position(id), store.size(id)) else {
            log::error!("[physics] invalid entity: {id}");
            return Status::EntityInvalid;
        };
        self.partition.insert(id, pos, size);
        self.sync_key(id);
        Status::EntityFound
    }

    fn remove(&mut self, id: EntityId) -> Status {
        let removed = self.partition.remove(id);
        self.sync_key(id);
        if removed {
            Status::EntityFound
        } else {
            log::error!("[physics] entity not in partition: {id}");
            Status::EntityNotFound
        }
    }

    fn reindex<S: EntityStore>(&mut self, store: &S, id: EntityId) -> Status {
        let (Some(pos), Some(size)) = (store.position(id), store.size(id)) else {
            log::error!("[physics] invalid entity: {id}");
            return Status::EntityInvalid;
        };
        if !self.partition.contains(id) {
            log::error!("[physics] entity not in partition: {id}");
            return Status::EntityNotFound;
        }
        self.partition.update(id, pos, size);
        self.sync_key(id);
        Status::EntityFound
    }
}

/// Boxes of collidable, live entities around the box `bounds`, excluding `id`.
fn gather_neighbors<S: EntityStore>(
    partition: &Partition,
    colliders: &AabbRegistry,
    store: &S,
    id: EntityId,
    bounds: Rect,
) -> Vec<(EntityId, Rect)> {
    partition
        .query_region_neighbors(bounds.min, bounds.size)
        .into_iter()
        .filter(|other| *other != id)
        .filter_map(|other| colliders.bounds(store, other).map(|r| (other, r)))
        .collect()
}

fn elapsed_ms(t: Option<Instant>) -> f64 {
    t.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0)
}

impl PhysicsWorld {
    fn transform_status<S: EntityStore>(&self, store: &S, id: EntityId) -> Status {
        if !store.is_alive(id) {
            Status::EntityInvalid
        } else if self.transforms.contains(id) {
            Status::EntityFound
        } else {
            Status::EntityNotFound
        }
    }

    fn record<S: EntityStore>(&self, store: &S, id: EntityId) -> Option<&TransformRecord> {
        if !self.transform_status(store, id).is_found() {
            log::error!("[physics] entity not found: {id}");
            return None;
        }
        self.transforms.get(id)
    }

    fn sync_key(&mut self, id: EntityId) {
        let key = self.partition.footprint(id).cloned();
        if let Some(rec) = self.transforms.get_mut(id) {
            rec.spatial_key = key;
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Direct partition access (zone streaming). Cached keys refresh on the next update.
    pub fn partition_mut(&mut self) -> &mut Partition {
        &mut self.partition
    }

    pub fn transform(&self, id: EntityId) -> Option<&TransformRecord> {
        self.transforms.get(id)
    }

    pub fn collider(&self, id: EntityId) -> Option<&AabbRecord> {
        self.colliders.get(id)
    }

    pub fn pending_commands(&self, id: EntityId) -> Option<usize> {
        self.transforms.get(id).map(|rec| rec.pending())
    }

    /// Return debug stats for registries and the partition.
    pub fn debug_stats(&self) -> WorldStats {
        WorldStats {
            transforms: self.transforms.len(),
            colliders: self.colliders.len(),
            pending_commands: self.transforms.pending_commands(),
            partition: self.partition.stats(),
        }
    }

    /// Return timing breakdown for the last `update` run.
    pub fn timing(&self) -> Option<StepTiming> { self.last_timing }
}
