//! Minimum spanning tree over triangulation edges, plus random loop edges.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::geometry::{Edge, Point, PointKey};

/// Tree edges in growth order, followed by the loop edges kept on re-scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spanning {
    pub tree: Vec<Edge>,
    pub loops: Vec<Edge>,
}

impl Spanning {
    /// Tree edges then loop edges, the order corridors are carved in.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.tree.iter().chain(self.loops.iter())
    }

    pub fn len(&self) -> usize {
        self.tree.len() + self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.loops.is_empty()
    }

    pub fn tree_weight(&self) -> i64 {
        self.tree.iter().map(|e| e.weight).sum()
    }
}

/// Grow a minimum spanning tree from `start` (Prim's frontier rule).
///
/// Each round picks the lightest edge with exactly one endpoint already
/// closed; the first edge seen wins a tie. Growth stops silently when no such
/// edge exists, so a graph disconnected from `start` yields a partial tree.
/// Duplicate edges in `edges` are harmless.
pub fn minimum_spanning_tree(edges: &[Edge], start: Point) -> Vec<Edge> {
    let mut open: HashSet<PointKey> = HashSet::new();
    for e in edges {
        open.insert(e.p0.key());
        open.insert(e.p1.key());
    }
    let mut closed: HashSet<PointKey> = HashSet::new();
    closed.insert(start.key());
    open.remove(&start.key());

    let mut tree = Vec::new();
    while !open.is_empty() {
        let mut chosen: Option<&Edge> = None;
        for edge in edges {
            let in0 = closed.contains(&edge.p0.key());
            let in1 = closed.contains(&edge.p1.key());
            if in0 == in1 {
                continue;
            }
            if chosen.map_or(true, |c| edge.weight < c.weight) {
                chosen = Some(edge);
            }
        }

        let Some(edge) = chosen else {
            break;
        };
        tree.push(*edge);
        for key in [edge.p0.key(), edge.p1.key()] {
            closed.insert(key);
            open.remove(&key);
        }
    }
    tree
}

/// Keep each edge independently with probability `probability`.
///
/// Tree edges are not excluded, so a loop may retrace a tree corridor.
pub fn loop_edges(edges: &[Edge], probability: f64, rng: &mut impl Rng) -> Vec<Edge> {
    edges
        .iter()
        .filter(|_| rng.gen_bool(probability))
        .copied()
        .collect()
}

/// Tree seeded at the first edge's first point, then loop edges.
pub fn span(edges: &[Edge], loop_probability: f64, rng: &mut impl Rng) -> Spanning {
    let Some(first) = edges.first() else {
        return Spanning::default();
    };
    let tree = minimum_spanning_tree(edges, first.p0);
    let loops = loop_edges(edges, loop_probability, rng);
    Spanning { tree, loops }
}
