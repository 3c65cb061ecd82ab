//! Geometric primitives shared by every pipeline phase.
//!
//! Points carry a third coordinate so placements can be handed to a 3D host,
//! but all pipeline math is planar and ignores `z`.

use serde::{Deserialize, Serialize};

/// A position in dungeon space. Only `x` and `y` take part in layout math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point on the layout plane (`z = 0`).
    pub fn flat(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn distance_squared_2d(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_2d(&self, other: &Self) -> f64 {
        self.distance_squared_2d(other).sqrt()
    }

    pub fn length_2d(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the plane, or zero when the length is zero.
    pub fn normalize_2d(&self) -> Self {
        let len = self.length_2d();
        if len > 0.0 {
            Self::flat(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    pub fn is_zero_2d(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Hashable identity for exact-equality lookups.
    pub fn key(&self) -> PointKey {
        PointKey::from(*self)
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl std::ops::Div<f64> for Point {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

/// Bit-exact planar key for a [`Point`], usable in hash sets.
///
/// `-0.0` and `0.0` map to the same key so snapped coordinates compare the
/// same way `==` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(u64, u64);

impl From<Point> for PointKey {
    fn from(p: Point) -> Self {
        // adding 0.0 folds -0.0 into 0.0
        PointKey((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
    }
}

/// Half-sizes of a footprint along each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Extent {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar magnitude, used as the separation force divisor.
    pub fn magnitude_2d(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_positive(&self) -> bool {
        self.x > 0.0 && self.y > 0.0 && self.z > 0.0
    }
}

/// Axis-aligned rectangle: `origin ± extent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub origin: Point,
    pub extent: Extent,
}

impl Bounds {
    pub fn new(origin: Point, extent: Extent) -> Self {
        Self { origin, extent }
    }

    /// Inclusive containment on x and y; `z` is ignored.
    ///
    /// Every overlap decision in the crate goes through this test.
    pub fn contains(&self, p: &Point) -> bool {
        (p.x >= self.origin.x - self.extent.x && p.x <= self.origin.x + self.extent.x)
            && (p.y >= self.origin.y - self.extent.y && p.y <= self.origin.y + self.extent.y)
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x - self.extent.x
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.extent.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y - self.extent.y
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.extent.y
    }

    /// Smallest bounds covering every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut xmin, mut xmax, mut ymin, mut ymax) = (first.x, first.x, first.y, first.y);
        for p in points {
            xmin = xmin.min(p.x);
            xmax = xmax.max(p.x);
            ymin = ymin.min(p.y);
            ymax = ymax.max(p.y);
        }
        Some(Self {
            origin: Point::flat((xmin + xmax) / 2.0, (ymin + ymax) / 2.0),
            extent: Extent::new((xmax - xmin) / 2.0, (ymax - ymin) / 2.0, 0.0),
        })
    }

    /// Grow by `margin` on both planar axes.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            origin: self.origin,
            extent: Extent::new(
                self.extent.x + margin,
                self.extent.y + margin,
                self.extent.z,
            ),
        }
    }
}

/// Undirected connection between two points, weighted by truncated length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub p0: Point,
    pub p1: Point,
    pub weight: i64,
}

impl Edge {
    /// Build an edge; the weight is the planar distance truncated toward zero.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0,
            p1,
            weight: p0.distance_2d(&p1) as i64,
        }
    }

    pub fn touches(&self, p: &Point) -> bool {
        self.p0 == *p || self.p1 == *p
    }

    /// Weight-only ordering; endpoints play no part.
    pub fn cmp_weight(&self, other: &Self) -> std::cmp::Ordering {
        self.weight.cmp(&other.weight)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.p0 == other.p0 && self.p1 == other.p1) || (self.p0 == other.p1 && self.p1 == other.p0)
    }
}

/// Round `value` up to the next multiple of `snap`.
///
/// Ceiling-division semantics: `snap(101, 5) == 105`, `snap(100, 5) == 100`,
/// `snap(-3, 5) == 0`. The result is always a multiple of `snap` and never
/// smaller than `value`. `snap` must be positive.
pub fn snap(value: f64, snap: f64) -> f64 {
    let snapped = (value / snap).ceil() * snap;
    // -0.0 would print oddly and break nothing, but keep keys canonical
    snapped + 0.0
}

/// Snap both planar coordinates of a point; `z` passes through.
pub fn snap_point(p: Point, snap_size: f64) -> Point {
    Point::new(snap(p.x, snap_size), snap(p.y, snap_size), p.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_up_to_multiple() {
        assert_eq!(snap(100.0, 5.0), 100.0);
        assert_eq!(snap(101.0, 5.0), 105.0);
        assert_eq!(snap(104.0, 5.0), 105.0);
        assert_eq!(snap(-3.0, 5.0), 0.0);
        assert_eq!(snap(-5.0, 5.0), -5.0);
        assert_eq!(snap(-6.0, 5.0), -5.0);
    }

    #[test]
    fn test_snap_invariant_sweep() {
        for s in [1.0, 2.5, 5.0, 7.0, 100.0] {
            let mut v = -523.75;
            while v < 523.75 {
                let r = snap(v, s);
                assert!(r >= v, "snap({v}, {s}) = {r} is below input");
                let q = r / s;
                assert!((q - q.round()).abs() < 1e-9, "snap({v}, {s}) = {r} not a multiple");
                v += 3.3;
            }
        }
    }

    #[test]
    fn test_snap_matches_integer_ceiling_division() {
        // floor((v + s - 1) / s) * s for integer inputs
        for v in -40i64..40 {
            for s in [1i64, 3, 5, 8] {
                let expected = ((v + s - 1) as f64 / s as f64).floor() * s as f64;
                assert_eq!(snap(v as f64, s as f64), expected, "v={v} s={s}");
            }
        }
    }

    #[test]
    fn test_bounds_edge_is_contained() {
        let b = Bounds::new(Point::flat(10.0, 20.0), Extent::new(5.0, 3.0, 1.0));
        assert!(b.contains(&Point::flat(15.0, 20.0)));
        assert!(b.contains(&Point::flat(5.0, 20.0)));
        assert!(b.contains(&Point::flat(10.0, 23.0)));
        assert!(b.contains(&Point::flat(10.0, 17.0)));
        assert!(b.contains(&Point::flat(15.0, 23.0))); // corner
        assert!(!b.contains(&Point::flat(15.001, 20.0)));
        assert!(!b.contains(&Point::flat(10.0, 16.999)));
    }

    #[test]
    fn test_bounds_ignores_z() {
        let b = Bounds::new(Point::flat(0.0, 0.0), Extent::new(1.0, 1.0, 0.1));
        assert!(b.contains(&Point::new(0.5, 0.5, -35.0)));
    }

    #[test]
    fn test_edge_equality_is_symmetric() {
        let a = Point::flat(0.0, 0.0);
        let b = Point::flat(3.0, 4.0);
        let c = Point::flat(1.0, 1.0);
        assert_eq!(Edge::new(a, b), Edge::new(b, a));
        assert_ne!(Edge::new(a, b), Edge::new(a, c));
    }

    #[test]
    fn test_edge_weight_truncates() {
        let e = Edge::new(Point::flat(0.0, 0.0), Point::flat(3.0, 4.0));
        assert_eq!(e.weight, 5);
        let e = Edge::new(Point::flat(0.0, 0.0), Point::flat(1.0, 1.0));
        assert_eq!(e.weight, 1); // sqrt(2) truncated
    }

    #[test]
    fn test_edge_ordering_by_weight_only() {
        let short = Edge::new(Point::flat(100.0, 0.0), Point::flat(101.0, 0.0));
        let long = Edge::new(Point::flat(0.0, 0.0), Point::flat(10.0, 0.0));
        assert_eq!(short.cmp_weight(&long), std::cmp::Ordering::Less);
        let same = Edge::new(Point::flat(-5.0, -5.0), Point::flat(-4.0, -5.0));
        assert_eq!(short.cmp_weight(&same), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_point_key_folds_negative_zero() {
        assert_eq!(Point::flat(-0.0, 0.0).key(), Point::flat(0.0, -0.0).key());
        assert_ne!(Point::flat(1.0, 0.0).key(), Point::flat(0.0, 1.0).key());
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert!(Point::ZERO.normalize_2d().is_zero_2d());
        let n = Point::flat(3.0, 4.0).normalize_2d();
        assert!((n.length_2d() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_enclosing_bounds() {
        let pts = [Point::flat(0.0, 0.0), Point::flat(10.0, 4.0), Point::flat(-2.0, 8.0)];
        let b = Bounds::enclosing(&pts).unwrap();
        assert_eq!(b.min_x(), -2.0);
        assert_eq!(b.max_x(), 10.0);
        assert_eq!(b.min_y(), 0.0);
        assert_eq!(b.max_y(), 8.0);
        assert!(Bounds::enclosing(&[]).is_none());
    }
}
