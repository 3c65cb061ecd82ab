//! Layout validation for generated dungeons.
//!
//! Pure functions over the pipeline's outputs that return validation errors.
//! Used by the headless harness and by integration tests; the generator itself
//! never fails on these.

use serde::Serialize;
use std::collections::HashSet;

use crate::cell::Cell;
use crate::geometry::{Edge, Point, PointKey};
use crate::triangulation::{Triangulation, EPSILON};

/// A layout validation error.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl ValidationError {
    fn error(category: &'static str, message: String) -> Self {
        Self {
            category,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(category: &'static str, message: String) -> Self {
        Self {
            category,
            severity: Severity::Warning,
            message,
        }
    }
}

// ── A. Rooms ────────────────────────────────────────────────────────────

/// Check that every kept room has positive extents on all axes.
pub fn check_room_extents(cells: &[Cell]) -> Vec<ValidationError> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kept && !c.half_extent.is_positive())
        .map(|(i, c)| {
            ValidationError::error(
                "room_geometry",
                format!(
                    "Room #{} has non-positive extent {:.1}×{:.1}×{:.1}",
                    i, c.half_extent.x, c.half_extent.y, c.half_extent.z
                ),
            )
        })
        .collect()
}

/// Check that kept room centres sit on the snap grid.
pub fn check_room_snapping(cells: &[Cell], snap_size: f64) -> Vec<ValidationError> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kept && !(on_grid(c.position.x, snap_size) && on_grid(c.position.y, snap_size)))
        .map(|(i, c)| {
            ValidationError::error(
                "room_geometry",
                format!(
                    "Room #{} centre ({:.2},{:.2}) is off the {} grid",
                    i, c.position.x, c.position.y, snap_size
                ),
            )
        })
        .collect()
}

// ── B. Corridors ────────────────────────────────────────────────────────

/// Check that no corridor segment lies inside a visible room.
pub fn check_corridors_clear_of_rooms(corridors: &[Point], cells: &[Cell]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, seg) in corridors.iter().enumerate() {
        if let Some(room) = cells.iter().position(|c| c.visible && c.bounds().contains(seg)) {
            errors.push(ValidationError::error(
                "corridor",
                format!(
                    "Corridor #{} at ({:.1},{:.1}) lies inside room #{}",
                    i, seg.x, seg.y, room
                ),
            ));
        }
    }
    errors
}

/// Check that no location carries two corridor segments.
pub fn check_duplicate_corridors(corridors: &[Point]) -> Vec<ValidationError> {
    let mut seen: HashSet<PointKey> = HashSet::new();
    let mut errors = Vec::new();
    for (i, seg) in corridors.iter().enumerate() {
        if !seen.insert(seg.key()) {
            errors.push(ValidationError::error(
                "corridor",
                format!("Corridor #{} duplicates location ({:.1},{:.1})", i, seg.x, seg.y),
            ));
        }
    }
    errors
}

/// Check that corridor segments sit on the snap grid.
pub fn check_corridor_snapping(corridors: &[Point], snap_size: f64) -> Vec<ValidationError> {
    corridors
        .iter()
        .enumerate()
        .filter(|(_, p)| !(on_grid(p.x, snap_size) && on_grid(p.y, snap_size)))
        .map(|(i, p)| {
            ValidationError::error(
                "corridor",
                format!("Corridor #{} at ({:.2},{:.2}) is off the grid", i, p.x, p.y),
            )
        })
        .collect()
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Check that the spanning tree reaches every room centre.
///
/// A partial tree is legal (the triangulation may be empty or disconnected),
/// so this is a warning.
pub fn check_tree_reaches_rooms(rooms: &[Point], tree: &[Edge]) -> Vec<ValidationError> {
    if rooms.len() < 2 {
        return Vec::new();
    }
    let reached: HashSet<PointKey> = tree
        .iter()
        .flat_map(|e| [e.p0.key(), e.p1.key()])
        .collect();
    let missing = rooms.iter().filter(|r| !reached.contains(&r.key())).count();
    if missing == 0 {
        return Vec::new();
    }
    vec![ValidationError::warning(
        "connectivity",
        format!(
            "{} of {} rooms are not reached by the spanning tree",
            missing,
            rooms.len()
        ),
    )]
}

/// Check that the tree has no more than K − 1 edges and never closes a cycle.
pub fn check_tree_is_acyclic(tree: &[Edge]) -> Vec<ValidationError> {
    let mut closed: HashSet<PointKey> = HashSet::new();
    let mut errors = Vec::new();
    for (i, e) in tree.iter().enumerate() {
        let a = closed.contains(&e.p0.key());
        let b = closed.contains(&e.p1.key());
        if i > 0 && a == b {
            errors.push(ValidationError::error(
                "connectivity",
                format!("Tree edge #{} does not extend the tree by one room", i),
            ));
        }
        closed.insert(e.p0.key());
        closed.insert(e.p1.key());
    }
    errors
}

// ── D. Triangulation ────────────────────────────────────────────────────

/// Check the empty-circumcircle property against every input point.
///
/// Cocircular points are allowed; only points clearly inside a circle fail.
pub fn check_delaunay(points: &[Point], triangulation: &Triangulation) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (t, tri) in triangulation.triangles.iter().enumerate() {
        let Some(circle) = tri.circle else {
            errors.push(ValidationError::error(
                "triangulation",
                format!("Triangle #{} is degenerate", t),
            ));
            continue;
        };
        for p in points {
            if tri.has_vertex(p) {
                continue;
            }
            let dx = circle.x - p.x;
            let dy = circle.y - p.y;
            let inside_by = circle.radius_sq - (dx * dx + dy * dy);
            if inside_by > EPSILON * circle.radius_sq.max(1.0) {
                errors.push(ValidationError::error(
                    "triangulation",
                    format!(
                        "Point ({:.1},{:.1}) lies inside the circumcircle of triangle #{}",
                        p.x, p.y, t
                    ),
                ));
            }
        }
    }
    errors
}

fn on_grid(v: f64, snap_size: f64) -> bool {
    (v / snap_size).fract() == 0.0
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_all(
    cells: &[Cell],
    rooms: &[Point],
    triangulation: &Triangulation,
    tree: &[Edge],
    corridors: &[Point],
    snap_size: f64,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_room_extents(cells));
    all.extend(check_room_snapping(cells, snap_size));
    all.extend(check_corridors_clear_of_rooms(corridors, cells));
    all.extend(check_duplicate_corridors(corridors));
    all.extend(check_corridor_snapping(corridors, snap_size));
    all.extend(check_tree_reaches_rooms(rooms, tree));
    all.extend(check_tree_is_acyclic(tree));
    all.extend(check_delaunay(rooms, triangulation));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extent;
    use crate::triangulation::triangulate;

    fn room(x: f64, y: f64, size: f64) -> Cell {
        let mut c = Cell::new(Point::flat(x, y), Extent::new(size, size, 1.0));
        c.kept = true;
        c
    }

    #[test]
    fn test_clean_layout_passes() {
        let cells = vec![room(0.0, 0.0, 20.0), room(300.0, 0.0, 20.0), room(0.0, 300.0, 20.0)];
        let rooms: Vec<Point> = cells.iter().map(|c| c.position).collect();
        let t = triangulate(&rooms);
        let tree = vec![
            Edge::new(rooms[0], rooms[1]),
            Edge::new(rooms[0], rooms[2]),
        ];
        let corridors = vec![Point::flat(100.0, 0.0), Point::flat(200.0, 0.0)];
        let errors = validate_all(&cells, &rooms, &t, &tree, &corridors, 5.0);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_non_positive_extent() {
        let mut cells = vec![room(0.0, 0.0, 10.0)];
        cells[0].half_extent.y = 0.0;
        let errors = check_room_extents(&cells);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Error);
    }

    #[test]
    fn test_discarded_cells_are_not_checked() {
        let mut cells = vec![room(1.0, 2.0, 0.0)];
        cells[0].kept = false;
        assert!(check_room_extents(&cells).is_empty());
        assert!(check_room_snapping(&cells, 5.0).is_empty());
    }

    #[test]
    fn test_off_grid_room() {
        let cells = vec![room(2.0, 0.0, 10.0)];
        assert_eq!(check_room_snapping(&cells, 5.0).len(), 1);
    }

    #[test]
    fn test_corridor_inside_room() {
        let cells = vec![room(0.0, 0.0, 50.0)];
        let errors = check_corridors_clear_of_rooms(&[Point::flat(50.0, 0.0)], &cells);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, "corridor");
    }

    #[test]
    fn test_corridor_in_invisible_room_is_fine() {
        let mut cells = vec![room(0.0, 0.0, 50.0)];
        cells[0].visible = false;
        assert!(check_corridors_clear_of_rooms(&[Point::flat(0.0, 0.0)], &cells).is_empty());
    }

    #[test]
    fn test_duplicate_corridor() {
        let corridors = vec![Point::flat(5.0, 5.0), Point::flat(10.0, 5.0), Point::flat(5.0, 5.0)];
        assert_eq!(check_duplicate_corridors(&corridors).len(), 1);
    }

    #[test]
    fn test_unreached_room_is_warning() {
        let rooms = vec![Point::flat(0.0, 0.0), Point::flat(10.0, 0.0), Point::flat(99.0, 99.0)];
        let tree = vec![Edge::new(rooms[0], rooms[1])];
        let errors = check_tree_reaches_rooms(&rooms, &tree);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_cycle_in_tree() {
        let a = Point::flat(0.0, 0.0);
        let b = Point::flat(10.0, 0.0);
        let c = Point::flat(0.0, 10.0);
        let tree = vec![Edge::new(a, b), Edge::new(a, c), Edge::new(b, c)];
        assert_eq!(check_tree_is_acyclic(&tree).len(), 1);
    }

    #[test]
    fn test_delaunay_violation_detected() {
        let a = Point::flat(0.0, 0.0);
        let b = Point::flat(10.0, 0.0);
        let c = Point::flat(5.0, 10.0);
        let t = triangulate(&[a, b, c]);
        let inside = Point::flat(5.0, 3.0);
        let errors = check_delaunay(&[a, b, c, inside], &t);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, "triangulation");
    }

    #[test]
    fn test_cocircular_square_is_accepted() {
        let pts = vec![
            Point::flat(0.0, 0.0),
            Point::flat(10.0, 0.0),
            Point::flat(0.0, 10.0),
            Point::flat(10.0, 10.0),
        ];
        let t = triangulate(&pts);
        assert!(check_delaunay(&pts, &t).is_empty());
    }
}
