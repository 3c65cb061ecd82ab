//! Planar Delaunay triangulation by Bowyer–Watson incremental insertion.
//!
//! Room centres are inserted one at a time into a triangulation seeded with a
//! super-triangle that encloses every input point. Each insertion removes the
//! triangles whose circumcircle contains the new point, keeps the boundary of
//! the resulting cavity (edges used by exactly one removed triangle) and fans
//! new triangles from that boundary to the point. Triangles still attached to
//! a super-triangle vertex are dropped at the end.
//!
//! Circumcircles store the *squared* radius; containment compares squared
//! distances with an [`EPSILON`] tolerance, so points on the circle count as
//! inside.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Edge, Point};

/// Tolerance for circumcircle containment.
pub const EPSILON: f64 = 1e-4;

/// Super-triangle size as a multiple of the input's larger bounding dimension.
pub const SUPER_TRIANGLE_SCALE: f64 = 20.0;

/// Circumscribed circle. `radius_sq` is the squared radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circumcircle {
    pub x: f64,
    pub y: f64,
    pub radius_sq: f64,
}

impl Circumcircle {
    /// Circumcircle through three points, or `None` when they are collinear.
    pub fn through(p0: &Point, p1: &Point, p2: &Point) -> Option<Self> {
        let ax = p1.x - p0.x;
        let ay = p1.y - p0.y;
        let bx = p2.x - p0.x;
        let by = p2.y - p0.y;

        let cross = ax * by - ay * bx;
        if cross == 0.0 {
            return None;
        }

        let m = p1.x * p1.x - p0.x * p0.x + p1.y * p1.y - p0.y * p0.y;
        let u = p2.x * p2.x - p0.x * p0.x + p2.y * p2.y - p0.y * p0.y;
        let s = 1.0 / (2.0 * cross);

        let x = ((p2.y - p0.y) * m + (p0.y - p1.y) * u) * s;
        let y = ((p0.x - p2.x) * m + (p1.x - p0.x) * u) * s;

        let dx = p0.x - x;
        let dy = p0.y - y;
        Some(Self {
            x,
            y,
            radius_sq: dx * dx + dy * dy,
        })
    }

    /// `true` when `p` lies inside or within [`EPSILON`] of the circle.
    pub fn contains(&self, p: &Point) -> bool {
        let dx = self.x - p.x;
        let dy = self.y - p.y;
        (dx * dx + dy * dy) - self.radius_sq <= EPSILON
    }
}

/// A triangle with its edges and circumcircle precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub e0: Edge,
    pub e1: Edge,
    pub e2: Edge,
    /// `None` for a degenerate (zero-area) triangle.
    pub circle: Option<Circumcircle>,
}

impl Triangle {
    pub fn new(p0: Point, p1: Point, p2: Point) -> Self {
        Self {
            p0,
            p1,
            p2,
            e0: Edge::new(p0, p1),
            e1: Edge::new(p1, p2),
            e2: Edge::new(p0, p2),
            circle: Circumcircle::through(&p0, &p1, &p2),
        }
    }

    pub fn edges(&self) -> [Edge; 3] {
        [self.e0, self.e1, self.e2]
    }

    pub fn vertices(&self) -> [Point; 3] {
        [self.p0, self.p1, self.p2]
    }

    pub fn has_vertex(&self, p: &Point) -> bool {
        self.p0 == *p || self.p1 == *p || self.p2 == *p
    }

    /// Degenerate triangles have no circle and are always considered violated
    /// so the next insertion replaces them.
    pub fn circumcircle_contains(&self, p: &Point) -> bool {
        match &self.circle {
            Some(c) => c.contains(p),
            None => true,
        }
    }
}

/// Result of a triangulation: triangles and their flattened edges.
///
/// `edges` holds three entries per triangle; edges shared by two triangles
/// appear twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangulation {
    pub triangles: Vec<Triangle>,
    pub edges: Vec<Edge>,
}

impl Triangulation {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Edges with shared duplicates removed, first occurrence kept.
    pub fn unique_edges(&self) -> Vec<Edge> {
        let mut unique: Vec<Edge> = Vec::with_capacity(self.edges.len() / 2 + 1);
        for e in &self.edges {
            if !unique.contains(e) {
                unique.push(*e);
            }
        }
        unique
    }
}

/// Triangulate `points` (planar, `z` ignored).
///
/// Fewer than three distinct points yields an empty triangulation. Exact
/// duplicate points are inserted once.
pub fn triangulate(points: &[Point]) -> Triangulation {
    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        let flat = Point::flat(p.x, p.y);
        if !unique.contains(&flat) {
            unique.push(flat);
        }
    }
    if unique.len() < 3 {
        return Triangulation::default();
    }

    let Some(bounds) = Bounds::enclosing(&unique) else {
        return Triangulation::default();
    };
    let [s0, s1, s2] = super_triangle(&bounds);
    let mut triangles = vec![Triangle::new(s0, s1, s2)];

    for pt in &unique {
        let mut cavity: Vec<Edge> = Vec::new();
        let mut kept: Vec<Triangle> = Vec::with_capacity(triangles.len() + 2);
        for tri in triangles {
            if tri.circumcircle_contains(pt) {
                cavity.extend(tri.edges());
            } else {
                kept.push(tri);
            }
        }

        for edge in boundary_edges(&cavity) {
            kept.push(Triangle::new(edge.p0, edge.p1, *pt));
        }
        triangles = kept;
    }

    triangles.retain(|t| {
        !(t.has_vertex(&s0) || t.has_vertex(&s1) || t.has_vertex(&s2)) && t.circle.is_some()
    });

    let edges = triangles.iter().flat_map(Triangle::edges).collect();
    Triangulation { triangles, edges }
}

/// Vertices of a triangle that strictly encloses `bounds`.
fn super_triangle(bounds: &Bounds) -> [Point; 3] {
    let dmax = (bounds.extent.x * 2.0).max(bounds.extent.y * 2.0);
    let mid = bounds.origin;
    [
        Point::flat(mid.x - SUPER_TRIANGLE_SCALE * dmax, mid.y - dmax),
        Point::flat(mid.x, mid.y + SUPER_TRIANGLE_SCALE * dmax),
        Point::flat(mid.x + SUPER_TRIANGLE_SCALE * dmax, mid.y - dmax),
    ]
}

/// Cavity boundary: every edge that occurs exactly once.
fn boundary_edges(cavity: &[Edge]) -> Vec<Edge> {
    cavity
        .iter()
        .enumerate()
        .filter(|(i, e)| {
            !cavity
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && other == *e)
        })
        .map(|(_, e)| *e)
        .collect()
}
