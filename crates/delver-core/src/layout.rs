//! Serializable summary of a finished generation run.

use delver_logic::geometry::{Extent, Point};
use delver_logic::separation::SeparationReport;
use serde::{Deserialize, Serialize};

/// A kept room as reported to hosts and tools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub center: Point,
    pub half_extent: Extent,
    /// `false` when the host rejected the placement.
    pub placed: bool,
}

/// Counts of placements that did not make it into the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementStats {
    pub rooms_rejected: u32,
    pub corridors_rejected: u32,
    /// Corridor steps that fell inside a visible room.
    pub corridor_overlaps: u32,
    /// Corridor steps that repeated an emitted location.
    pub corridor_duplicates: u32,
}

/// Everything a host or harness wants to know about a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub seed: u64,
    pub cell_count: usize,
    pub rooms: Vec<RoomSummary>,
    pub corridors: Vec<Point>,
    pub tree_edges: usize,
    pub loop_edges: usize,
    pub separation: SeparationReport,
    pub stats: PlacementStats,
}

impl DungeonLayout {
    pub fn placed_rooms(&self) -> usize {
        self.rooms.iter().filter(|r| r.placed).count()
    }
}
