use glam::DVec2;

use std::collections::{HashMap, VecDeque};

use crate::error::CommandError;
use crate::types::*;
use crate::vector::{distance, normalize};

/// Default arrival radius for move commands.
pub const DEFAULT_STOP_DISTANCE: f64 = 4.0;

impl MoveCommand {
    /// Move toward `target` at `speed`, replacing any queued goal and measuring from the center.
    pub fn new(target: DVec2, speed: f64) -> Self {
        Self {
            speed,
            target,
            stop_distance: DEFAULT_STOP_DISTANCE,
            flush: true,
            use_center: true,
        }
    }

    pub fn stop_distance(mut self, stop_distance: f64) -> Self {
        self.stop_distance = stop_distance;
        self
    }

    /// Append as a waypoint instead of replacing the queue.
    pub fn append(mut self) -> Self {
        self.flush = false;
        self
    }

    /// Measure arrival from the top-left corner.
    pub fn from_corner(mut self) -> Self {
        self.use_center = false;
        self
    }

    pub fn validate(&self) -> Result<(), CommandError> {
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(CommandError::Malformed { field: "speed", value: self.speed });
        }
        if !(self.stop_distance.is_finite() && self.stop_distance >= 0.0) {
            return Err(CommandError::Malformed { field: "stop_distance", value: self.stop_distance });
        }
        if !self.target.x.is_finite() {
            return Err(CommandError::Malformed { field: "target.x", value: self.target.x });
        }
        if !self.target.y.is_finite() {
            return Err(CommandError::Malformed { field: "target.y", value: self.target.y });
        }
        Ok(())
    }

    /// Arrival test against the integer-truncated distance.
    fn reached(&self, from: DVec2) -> bool {
        distance(self.target, from).trunc() <= self.stop_distance
    }
}

/// Per-entity integration state.
#[derive(Clone, Debug, Default)]
pub struct TransformRecord {
    pub velocity: DVec2,
    commands: VecDeque<MoveCommand>,
    /// Footprint occupied in the partition after the last re-index, if indexed.
    pub spatial_key: Option<Footprint>,
}

impl TransformRecord {
    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> impl Iterator<Item = &MoveCommand> {
        self.commands.iter()
    }

    /// Queue a command, honoring `flush`. Returns false, leaving the queue
    /// untouched, when there is no room.
    pub fn enqueue(&mut self, cmd: MoveCommand, capacity: usize) -> bool {
        if capacity == 0 || (!cmd.flush && self.commands.len() >= capacity) {
            return false;
        }
        if cmd.flush {
            self.commands.clear();
        }
        self.commands.push_back(cmd);
        true
    }

    /// Drive velocity from the command queue. Arrived commands are popped and the
    /// next one is tried in the same step; once the queue drains the entity halts.
    /// Returns true while a command is still steering.
    pub fn steer(&mut self, corner: DVec2, center: DVec2) -> bool {
        while let Some(cmd) = self.commands.front() {
            let from = if cmd.use_center { center } else { corner };
            if cmd.reached(from) {
                log::trace!("move command reached {:?}", cmd.target);
                self.commands.pop_front();
                if self.commands.is_empty() {
                    self.velocity = DVec2::ZERO;
                }
                continue;
            }
            self.velocity = normalize(cmd.target - from) * cmd.speed;
            return true;
        }
        false
    }

    /// `v *= 1 - damp_value * dt` per axis, snapping slow axes to zero.
    pub fn damp(&mut self, damp_value: f64, threshold: f64, dt: f64) {
        let factor = (1.0 - damp_value * dt).max(0.0);
        self.velocity *= factor;
        if self.velocity.x.abs() < threshold {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < threshold {
            self.velocity.y = 0.0;
        }
    }
}

/// Result of a toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Toggle {
    Enabled,
    Disabled,
}

/// Transform records keyed by entity, iterated in enable order.
#[derive(Default)]
pub struct TransformRegistry {
    records: HashMap<EntityId, TransformRecord>,
    order: Vec<EntityId>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a record if absent, drop it (with its queue) if present.
    pub fn toggle(&mut self, id: EntityId) -> Toggle {
        if self.records.remove(&id).is_some() {
            self.order.retain(|e| *e != id);
            Toggle::Disabled
        } else {
            self.records.insert(id, TransformRecord::default());
            self.order.push(id);
            Toggle::Enabled
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&TransformRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut TransformRecord> {
        self.records.get_mut(&id)
    }

    /// Entities in the order they were enabled.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn pending_commands(&self) -> usize {
        self.records.values().map(|r| r.pending()).sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_preserves_order() {
        let mut reg = TransformRegistry::new();
        let (a, b, c) = (EntityId(1), EntityId(2), EntityId(3));
        assert_eq!(reg.toggle(a), Toggle::Enabled);
        assert_eq!(reg.toggle(b), Toggle::Enabled);
        assert_eq!(reg.toggle(c), Toggle::Enabled);
        assert_eq!(reg.toggle(b), Toggle::Disabled);
        assert_eq!(reg.ids(), &[a, c]);
        assert!(!reg.contains(b));
        assert_eq!(reg.toggle(b), Toggle::Enabled);
        assert_eq!(reg.ids(), &[a, c, b]);
    }

    #[test]
    fn test_queue_bound_and_flush() {
        let mut rec = TransformRecord::default();
        for i in 0..20 {
            let cmd = MoveCommand::new(DVec2::new(i as f64, 0.0), 10.0).append();
            let queued = rec.enqueue(cmd, 16);
            assert_eq!(queued, i < 16);
        }
        assert_eq!(rec.pending(), 16);
        assert!(rec.enqueue(MoveCommand::new(DVec2::new(99.0, 0.0), 10.0), 16));
        assert_eq!(rec.pending(), 1);
        assert_eq!(rec.commands().next().map(|c| c.target.x), Some(99.0));
    }

    #[test]
    fn test_rejected_flush_keeps_queue() {
        let mut rec = TransformRecord::default();
        assert!(rec.enqueue(MoveCommand::new(DVec2::new(5.0, 0.0), 10.0), 1));
        assert!(!rec.enqueue(MoveCommand::new(DVec2::new(6.0, 0.0), 10.0).append(), 1));
        assert!(!rec.enqueue(MoveCommand::new(DVec2::new(7.0, 0.0), 10.0), 0));
        assert_eq!(rec.pending(), 1);
        assert_eq!(rec.commands().next().map(|c| c.target.x), Some(5.0));
    }

    #[test]
    fn test_steer_sets_velocity_toward_target() {
        let mut rec = TransformRecord::default();
        rec.velocity = DVec2::new(-100.0, 0.0);
        rec.enqueue(MoveCommand::new(DVec2::new(30.0, 40.0), 10.0).from_corner(), 16);
        assert!(rec.steer(DVec2::ZERO, DVec2::splat(100.0)));
        assert!((rec.velocity.x - 6.0).abs() < 1e-12);
        assert!((rec.velocity.y - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_steer_pops_on_truncated_distance() {
        let mut rec = TransformRecord::default();
        // Distance 4.9 truncates to 4 which is within the stop distance
        rec.enqueue(MoveCommand::new(DVec2::new(4.9, 0.0), 10.0).from_corner(), 16);
        rec.enqueue(MoveCommand::new(DVec2::new(0.0, 50.0), 10.0).from_corner().append(), 16);
        assert!(rec.steer(DVec2::ZERO, DVec2::ZERO));
        assert_eq!(rec.pending(), 1);
        assert!((rec.velocity.y - 10.0).abs() < 1e-12);

        rec.velocity = DVec2::new(3.0, 3.0);
        assert!(!rec.steer(DVec2::new(0.0, 48.0), DVec2::ZERO));
        assert_eq!(rec.pending(), 0);
        assert_eq!(rec.velocity, DVec2::ZERO);
    }

    #[test]
    fn test_damp_snaps_below_threshold() {
        let mut rec = TransformRecord { velocity: DVec2::new(100.0, 0.85), ..Default::default() };
        rec.damp(4.0, 0.8, 1.0 / 60.0);
        assert!((rec.velocity.x - 100.0 * (1.0 - 4.0 / 60.0)).abs() < 1e-9);
        assert_eq!(rec.velocity.y, 0.0);
        // A huge step never flips the sign
        rec.damp(4.0, 0.8, 1.0);
        assert_eq!(rec.velocity, DVec2::ZERO);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(MoveCommand::new(DVec2::ONE, 10.0).validate().is_ok());
        assert!(MoveCommand::new(DVec2::ONE, f64::NAN).validate().is_err());
        assert!(MoveCommand::new(DVec2::ONE, 10.0).stop_distance(-1.0).validate().is_err());
        let err = MoveCommand::new(DVec2::new(0.0, f64::INFINITY), 10.0).validate().unwrap_err();
        assert_eq!(err, CommandError::Malformed { field: "target.y", value: f64::INFINITY });
    }
}
