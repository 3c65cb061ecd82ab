//! Room selection: decide which settled cells become rooms.

use rand::Rng;

use crate::cell::Cell;
use crate::geometry::{snap_point, Point};

/// Selection thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    pub min_size: f64,
    /// Both half-extents must exceed `min_size + threshold`.
    pub threshold: f64,
    /// Chance that an undersized cell is kept anyway.
    pub retain_probability: f64,
    pub snap_size: f64,
}

/// Classify every cell and return the snapped centres of the kept rooms,
/// in cell order.
///
/// Kept cells are moved onto their snapped centre so footprints, overlap
/// checks and the triangulation all agree on the same coordinates.
/// Discarded cells become invisible.
pub fn select_rooms(cells: &mut [Cell], params: &SelectionParams, rng: &mut impl Rng) -> Vec<Point> {
    let cutoff = params.min_size + params.threshold;
    let mut rooms = Vec::new();

    for cell in cells.iter_mut() {
        let large = cell.half_extent.x > cutoff && cell.half_extent.y > cutoff;
        // draw only for undersized cells so the stream matches cell order
        let kept = large || rng.gen_bool(params.retain_probability);

        cell.kept = kept;
        cell.visible = kept;
        if kept {
            cell.position = snap_point(cell.position, params.snap_size);
            rooms.push(cell.position);
        }
    }

    rooms
}
