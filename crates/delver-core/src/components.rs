//! Components attached to placement entities.
//!
//! Components are pure data structs. The world only records what was placed;
//! layout decisions live in `delver-logic`.

use delver_logic::geometry::{Bounds, Extent, Point};
use serde::{Deserialize, Serialize};

/// A room footprint placed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomFootprint {
    pub center: Point,
    pub half_extent: Extent,
}

impl RoomFootprint {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.center, self.half_extent)
    }
}

/// One corridor section placed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorSegment {
    pub location: Point,
}
