//! Whole-pipeline composition without a host.
//!
//! Runs every stage in order against one random stream and returns all
//! intermediate products. Hosts that place things in a world drive the stages
//! themselves (see `delver-core`); this is the reference they must agree with
//! when every placement succeeds.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::{visible_room_bounds, Cell};
use crate::config::DungeonConfig;
use crate::corridors::{rasterize_corridors, CorridorPlan};
use crate::geometry::Point;
use crate::sampler::sample_cells;
use crate::selection::select_rooms;
use crate::separation::{separate, SeparationReport};
use crate::spanning::{span, Spanning};
use crate::triangulation::{triangulate, Triangulation};

/// Every product of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub cells: Vec<Cell>,
    pub separation: SeparationReport,
    /// Snapped centres of kept rooms, in cell order.
    pub rooms: Vec<Point>,
    pub triangulation: Triangulation,
    pub spanning: Spanning,
    pub corridors: CorridorPlan,
}

/// Run sampling through rasterization. The config is assumed valid.
pub fn plan_layout(config: &DungeonConfig, rng: &mut impl Rng) -> LayoutPlan {
    let mut cells = sample_cells(&config.sample_params(), rng);
    let separation = separate(&mut cells, &config.separation_params());
    let rooms = select_rooms(&mut cells, &config.selection_params(), rng);
    let triangulation = triangulate(&rooms);
    let spanning = span(&triangulation.edges, config.loop_probability, rng);
    let corridors = rasterize_corridors(
        spanning.edges(),
        visible_room_bounds(&cells),
        &config.corridor_params(),
    );

    LayoutPlan {
        cells,
        separation,
        rooms,
        triangulation,
        spanning,
        corridors,
    }
}
