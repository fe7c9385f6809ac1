//! 2-D vector helpers and the axis-aligned `Rect` used by the narrowphase.

use glam::DVec2;

use crate::types::CellCoord;

pub fn add(a: DVec2, b: DVec2) -> DVec2 {
    a + b
}

pub fn sub(a: DVec2, b: DVec2) -> DVec2 {
    a - b
}

pub fn scale(v: DVec2, s: f64) -> DVec2 {
    v * s
}

pub fn magnitude(v: DVec2) -> f64 {
    v.length()
}

pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (a - b).length()
}

/// Unit vector in the direction of `v`, or zero for a zero-length input.
pub fn normalize(v: DVec2) -> DVec2 {
    let len = v.length();
    if len > 0.0 { v / len } else { DVec2::ZERO }
}

pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Per-axis signum in {-1, 0, 1}. Unlike `f64::signum`, zero maps to zero.
pub fn direction(v: DVec2) -> (i8, i8) {
    let sign = |x: f64| ((x > 0.0) as i8) - ((x < 0.0) as i8);
    (sign(v.x), sign(v.y))
}

/// True floor division of a world position into integer grid coordinates.
/// Negative inputs round toward negative infinity (x = -1, extent 32 -> -1).
/// Coordinates beyond the `i32` range saturate at its bounds.
pub fn floor_div(p: DVec2, origin: DVec2, extent: DVec2) -> CellCoord {
    let local = (p - origin) / extent;
    (local.x.floor() as i32, local.y.floor() as i32)
}

/// Inclusive coordinate range covered by the half-open rectangle `[pos, pos + size)`.
/// A degenerate rectangle covers the single coordinate containing `pos`.
pub fn covered_range(pos: DVec2, size: DVec2, origin: DVec2, extent: DVec2) -> (CellCoord, CellCoord) {
    let lo = floor_div(pos, origin, extent);
    let far = (pos + size - origin) / extent;
    let hi = (
        (far.x.ceil() as i32).saturating_sub(1).max(lo.0),
        (far.y.ceil() as i32).saturating_sub(1).max(lo.1),
    );
    (lo, hi)
}

/// Axis-aligned box in world space: `min` is the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, size: DVec2) -> Self {
        Self { min, size }
    }

    pub fn left(&self) -> f64 {
        self.min.x
    }
    pub fn right(&self) -> f64 {
        self.min.x + self.size.x
    }
    pub fn top(&self) -> f64 {
        self.min.y
    }
    pub fn bottom(&self) -> f64 {
        self.min.y + self.size.y
    }
    pub fn max(&self) -> DVec2 {
        self.min + self.size
    }
    pub fn center(&self) -> DVec2 {
        self.min + self.size * 0.5
    }
    pub fn area(&self) -> f64 {
        self.size.x * self.size.y
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_div_negative() {
        let cs = DVec2::splat(32.0);
        assert_eq!(floor_div(DVec2::new(-1.0, -1.0), DVec2::ZERO, cs), (-1, -1));
        assert_eq!(floor_div(DVec2::new(-32.0, 0.0), DVec2::ZERO, cs), (-1, 0));
        assert_eq!(floor_div(DVec2::new(-33.0, 31.9), DVec2::ZERO, cs), (-2, 0));
        // Exact boundary belongs to the upper cell's lower edge
        assert_eq!(floor_div(DVec2::new(32.0, 64.0), DVec2::ZERO, cs), (1, 2));
    }

    #[test]
    fn test_floor_div_with_origin() {
        let cs = DVec2::splat(10.0);
        let origin = DVec2::new(5.0, -5.0);
        assert_eq!(floor_div(DVec2::new(5.0, -5.0), origin, cs), (0, 0));
        assert_eq!(floor_div(DVec2::new(4.9, -5.1), origin, cs), (-1, -1));
    }

    #[test]
    fn test_covered_range_half_open() {
        let cs = DVec2::splat(32.0);
        // Exactly one cell wide: the far edge is excluded
        let (lo, hi) = covered_range(DVec2::ZERO, DVec2::splat(32.0), DVec2::ZERO, cs);
        assert_eq!((lo, hi), ((0, 0), (0, 0)));
        // Straddling the origin
        let (lo, hi) = covered_range(DVec2::splat(-4.0), DVec2::splat(8.0), DVec2::ZERO, cs);
        assert_eq!((lo, hi), ((-1, -1), (0, 0)));
        // Zero-size still covers its own cell
        let (lo, hi) = covered_range(DVec2::new(40.0, 40.0), DVec2::ZERO, DVec2::ZERO, cs);
        assert_eq!((lo, hi), ((1, 1), (1, 1)));
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let cs = DVec2::splat(32.0);
        let (lo, hi) = covered_range(DVec2::new(-1e12, 1e12), DVec2::splat(2.0), DVec2::ZERO, cs);
        assert_eq!(lo, (i32::MIN, i32::MAX));
        assert_eq!(hi, (i32::MIN, i32::MAX));
        assert_eq!(floor_div(DVec2::new(1e300, -1e300), DVec2::ZERO, cs), (i32::MAX, i32::MIN));
    }

    #[test]
    fn test_normalize_and_direction() {
        assert_eq!(normalize(DVec2::ZERO), DVec2::ZERO);
        let n = normalize(DVec2::new(3.0, 4.0));
        assert!((n.x - 0.6).abs() < 1e-12 && (n.y - 0.8).abs() < 1e-12);
        assert_eq!(direction(DVec2::new(-2.5, 0.0)), (-1, 0));
        assert_eq!(direction(DVec2::new(0.1, 7.0)), (1, 1));
        assert!((distance(DVec2::ZERO, DVec2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert_eq!(clamp(5.0, 0.0, 2.0), 2.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = DVec2::new(1.0, 2.0);
        let b = DVec2::new(3.0, -4.0);
        assert_eq!(add(a, b), DVec2::new(4.0, -2.0));
        assert_eq!(sub(a, b), DVec2::new(-2.0, 6.0));
        assert_eq!(scale(b, 0.5), DVec2::new(1.5, -2.0));
        assert_eq!(magnitude(b), 5.0);
    }

    #[test]
    fn test_rect_strict_overlap() {
        let a = Rect::new(DVec2::ZERO, DVec2::splat(10.0));
        let touching = Rect::new(DVec2::new(10.0, 0.0), DVec2::splat(10.0));
        let overlapping = Rect::new(DVec2::new(9.0, 9.0), DVec2::splat(10.0));
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert_eq!(a.center(), DVec2::splat(5.0));
        assert!(a.contains_point(DVec2::ZERO));
        assert!(!a.contains_point(DVec2::splat(10.0)));
    }
}
