//! Corridor rasterization: turn connection edges into grid-aligned segments.
//!
//! Each edge is walked from `p0` towards `p1` along one axis at a time in
//! fixed `section_length` increments. Every step is snapped to the grid and
//! becomes a corridor segment unless it lands inside a visible room or on a
//! segment that was already emitted. Rejected steps leave gaps; that is
//! accepted, not repaired (see [`GapPolicy`] for the one optional repair).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::geometry::{snap_point, Bounds, Edge, Point, PointKey};

/// Which axis is exhausted first on each walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WalkOrder {
    #[default]
    YFirst,
    XFirst,
}

/// What to do with the remainder when a delta is not a whole number of
/// sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GapPolicy {
    /// Truncated step counts only; the walk may stop short of `p1`.
    #[default]
    Leave,
    /// Add one final partial step per axis that lands exactly on the target
    /// coordinate.
    Bridge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorParams {
    pub section_length: f64,
    pub snap_size: f64,
    pub walk_order: WalkOrder,
    pub gap_policy: GapPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn get(self, p: &Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    fn set(self, p: &mut Point, v: f64) {
        match self {
            Axis::X => p.x = v,
            Axis::Y => p.y = v,
        }
    }
}

/// Snapped step locations for one edge, in walk order, start point excluded.
///
/// No filtering is applied here; the same location may repeat when snapping
/// collapses two steps together.
pub fn walk_edge(edge: &Edge, params: &CorridorParams) -> Vec<Point> {
    let axes = match params.walk_order {
        WalkOrder::YFirst => [Axis::Y, Axis::X],
        WalkOrder::XFirst => [Axis::X, Axis::Y],
    };

    let mut position = Point::flat(edge.p0.x, edge.p0.y);
    let mut steps = Vec::new();
    for axis in axes {
        let target = axis.get(&edge.p1);
        let delta = target - axis.get(&edge.p0);
        let count = (delta / params.section_length).trunc().abs() as u64;
        let direction = delta.signum();

        for _ in 0..count {
            let next = axis.get(&position) + direction * params.section_length;
            axis.set(&mut position, next);
            steps.push(snap_point(position, params.snap_size));
        }

        if params.gap_policy == GapPolicy::Bridge && axis.get(&position) != target {
            axis.set(&mut position, target);
            steps.push(snap_point(position, params.snap_size));
        }
    }
    steps
}

/// Segments produced by a rasterization run plus what was filtered out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorridorPlan {
    /// Emitted locations, in edge order then walk order.
    pub segments: Vec<Point>,
    /// Steps that fell inside a visible room.
    pub overlapped: u32,
    /// Steps that repeated an already-emitted location.
    pub duplicates: u32,
}

/// Stateful rasterizer that remembers every emitted location across edges.
#[derive(Debug, Clone)]
pub struct CorridorRasterizer {
    params: CorridorParams,
    rooms: Vec<Bounds>,
    emitted: HashSet<PointKey>,
    plan: CorridorPlan,
}

impl CorridorRasterizer {
    /// `rooms` are the bounds of the currently visible rooms.
    pub fn new(params: CorridorParams, rooms: Vec<Bounds>) -> Self {
        Self {
            params,
            rooms,
            emitted: HashSet::new(),
            plan: CorridorPlan::default(),
        }
    }

    /// Walk one edge; returns the number of new segments it contributed.
    pub fn add_edge(&mut self, edge: &Edge) -> usize {
        let before = self.plan.segments.len();
        for step in walk_edge(edge, &self.params) {
            if self.rooms.iter().any(|b| b.contains(&step)) {
                self.plan.overlapped += 1;
                continue;
            }
            if !self.emitted.insert(step.key()) {
                self.plan.duplicates += 1;
                continue;
            }
            self.plan.segments.push(step);
        }
        self.plan.segments.len() - before
    }

    pub fn segments(&self) -> &[Point] {
        &self.plan.segments
    }

    pub fn finish(self) -> CorridorPlan {
        self.plan
    }
}

/// Rasterize `edges` in order against the given visible room bounds.
pub fn rasterize_corridors<'a>(
    edges: impl IntoIterator<Item = &'a Edge>,
    rooms: Vec<Bounds>,
    params: &CorridorParams,
) -> CorridorPlan {
    let mut rasterizer = CorridorRasterizer::new(*params, rooms);
    for edge in edges {
        rasterizer.add_edge(edge);
    }
    rasterizer.finish()
}
