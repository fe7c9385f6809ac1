use glam::DVec2;

use crate::aabb::AabbRecord;
use crate::types::*;
use crate::vector::Rect;

/// Axis-separated AABB resolution (discrete; fast movers may tunnel through thin boxes).
pub struct Narrowphase;

impl Narrowphase {
    /// Push the box of an entity at `pos` out of every overlapping neighbor along `axis`.
    ///
    /// The direction of travel is sampled once before resolving, so a box that
    /// overlaps several neighbors ends flush against the nearest one. Any contact
    /// zeroes the velocity component. Returns the number of contacts.
    pub fn resolve_axis(
        axis: Axis,
        id: EntityId,
        pos: &mut DVec2,
        vel: &mut DVec2,
        shape: &AabbRecord,
        neighbors: &[(EntityId, Rect)],
    ) -> usize {
        let dir = match axis {
            Axis::X => vel.x,
            Axis::Y => vel.y,
        };
        let mut contacts = 0;
        for (other, rect) in neighbors {
            if *other == id { continue; }
            let bounds = shape.rect_at(*pos);
            if !bounds.intersects(rect) { continue; }

            match axis {
                Axis::X => {
                    if dir > 0.0 {
                        pos.x = rect.left() - shape.size.x - shape.offset.x;
                    } else if dir < 0.0 {
                        pos.x = rect.right() - shape.offset.x;
                    }
                    vel.x = 0.0;
                }
                Axis::Y => {
                    // Screen space: negative y is up
                    if dir > 0.0 {
                        pos.y = rect.top() - shape.size.y - shape.offset.y;
                    } else if dir < 0.0 {
                        pos.y = rect.bottom() - shape.offset.y;
                    }
                    vel.y = 0.0;
                }
            }
            contacts += 1;
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> AabbRecord {
        AabbRecord::new(DVec2::ZERO, DVec2::splat(10.0)).unwrap()
    }

    fn wall(x: f64, y: f64) -> (EntityId, Rect) {
        (EntityId(100), Rect::new(DVec2::new(x, y), DVec2::splat(10.0)))
    }

    #[test]
    fn test_moving_right_clamps_to_left_edge() {
        let mut pos = DVec2::new(13.0, 0.0);
        let mut vel = DVec2::new(50.0, 7.0);
        let n = Narrowphase::resolve_axis(Axis::X, EntityId(1), &mut pos, &mut vel, &unit_box(), &[wall(20.0, 0.0)]);
        assert_eq!(n, 1);
        assert_eq!(pos, DVec2::new(10.0, 0.0));
        assert_eq!(vel, DVec2::new(0.0, 7.0));
    }

    #[test]
    fn test_moving_left_respects_offset() {
        let shape = AabbRecord::new(DVec2::new(2.0, 0.0), DVec2::new(6.0, 10.0)).unwrap();
        let mut pos = DVec2::new(5.0, 0.0);
        let mut vel = DVec2::new(-50.0, 0.0);
        Narrowphase::resolve_axis(Axis::X, EntityId(1), &mut pos, &mut vel, &shape, &[wall(0.0, 0.0)]);
        // Box left edge (pos.x + 2) sits on the wall's right edge
        assert_eq!(pos.x, 8.0);
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn test_vertical_resolution() {
        let mut pos = DVec2::new(0.0, 15.0);
        let mut vel = DVec2::new(3.0, 40.0);
        Narrowphase::resolve_axis(Axis::Y, EntityId(1), &mut pos, &mut vel, &unit_box(), &[wall(0.0, 20.0)]);
        assert_eq!(pos.y, 10.0);
        assert_eq!(vel, DVec2::new(3.0, 0.0));

        let mut pos = DVec2::new(0.0, -5.0);
        let mut vel = DVec2::new(0.0, -40.0);
        Narrowphase::resolve_axis(Axis::Y, EntityId(1), &mut pos, &mut vel, &unit_box(), &[wall(0.0, -10.0)]);
        assert_eq!(pos.y, 0.0);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_touching_and_self_are_ignored() {
        let mut pos = DVec2::new(10.0, 0.0);
        let mut vel = DVec2::new(5.0, 0.0);
        let me = (EntityId(1), Rect::new(pos, DVec2::splat(10.0)));
        let n = Narrowphase::resolve_axis(Axis::X, EntityId(1), &mut pos, &mut vel, &unit_box(), &[me, wall(20.0, 0.0)]);
        assert_eq!(n, 0);
        assert_eq!(vel.x, 5.0);
    }

    #[test]
    fn test_nearest_of_several_neighbors_wins() {
        let mut pos = DVec2::new(16.0, 0.0);
        let mut vel = DVec2::new(50.0, 0.0);
        let far = wall(24.0, 0.0);
        let near = (EntityId(101), Rect::new(DVec2::new(20.0, 0.0), DVec2::splat(10.0)));
        let n = Narrowphase::resolve_axis(Axis::X, EntityId(1), &mut pos, &mut vel, &unit_box(), &[far, near]);
        assert_eq!(n, 2);
        assert_eq!(pos.x, 10.0);
    }

    #[test]
    fn test_resting_overlap_only_zeroes_velocity() {
        let mut pos = DVec2::new(15.0, 0.0);
        let mut vel = DVec2::new(0.0, 0.0);
        let n = Narrowphase::resolve_axis(Axis::X, EntityId(1), &mut pos, &mut vel, &unit_box(), &[wall(20.0, 0.0)]);
        assert_eq!(n, 1);
        assert_eq!(pos.x, 15.0);
    }
}
