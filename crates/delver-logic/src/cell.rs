//! Candidate room cells.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Extent, Point};

/// A candidate room footprint.
///
/// `kept` records the selector's decision. `visible` records whether the cell
/// currently occupies space for overlap checks; a kept room whose placement
/// was rejected by the host stays kept but turns invisible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Point,
    pub half_extent: Extent,
    pub kept: bool,
    pub visible: bool,
}

impl Cell {
    pub fn new(position: Point, half_extent: Extent) -> Self {
        Self {
            position,
            half_extent,
            kept: false,
            visible: true,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.half_extent)
    }

    /// Kept and still visible: the cell counts as a room for overlap checks.
    pub fn is_room(&self) -> bool {
        self.kept && self.visible
    }
}

/// Bounds of every visible room, in cell order.
pub fn visible_room_bounds(cells: &[Cell]) -> Vec<Bounds> {
    cells.iter().filter(|c| c.is_room()).map(Cell::bounds).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_visible_not_kept() {
        let c = Cell::new(Point::flat(1.0, 2.0), Extent::new(3.0, 4.0, 0.5));
        assert!(c.visible);
        assert!(!c.kept);
        assert!(!c.is_room());
    }

    #[test]
    fn test_visible_room_bounds_skips_hidden() {
        let mut a = Cell::new(Point::flat(0.0, 0.0), Extent::new(1.0, 1.0, 0.5));
        let mut b = Cell::new(Point::flat(10.0, 0.0), Extent::new(1.0, 1.0, 0.5));
        let c = Cell::new(Point::flat(20.0, 0.0), Extent::new(1.0, 1.0, 0.5));
        a.kept = true;
        b.kept = true;
        b.visible = false;
        let bounds = visible_room_bounds(&[a, b, c]);
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].origin, a.position);
    }
}
