//! Separation solver: pushes crowded cells apart.
//!
//! A simplified flocking "separation" rule: every cell is repelled by the
//! cells whose centres lie within the neighbour radius. Contributions are the
//! unit direction away from the neighbour divided by an extent magnitude, so
//! large cells move less per unit of crowding. The averaged vector is
//! normalized and scaled by a fixed push distance.
//!
//! The solver is bounded: it always terminates, converged or not.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::geometry::Point;

/// How displacements are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeparationMode {
    /// Resolve one cell fully (up to `max_attempts` moves) before the next.
    /// Later cells see the already-moved positions of earlier ones.
    #[default]
    Sequential,
    /// Compute every displacement from the same snapshot, apply them at once,
    /// and repeat until nothing moves or `max_passes` is spent.
    Simultaneous,
}

/// Which extent divides a neighbour's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceScaling {
    /// The moving cell's own extent. Forces are asymmetric between a pair.
    #[default]
    OwnExtent,
    /// The neighbour's extent: big neighbours push softer.
    NeighborExtent,
}

/// Tuning for the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationParams {
    pub neighbor_radius: f64,
    pub push_distance: f64,
    /// Centres closer than this count as coincident.
    pub min_distance: f64,
    pub max_attempts: u32,
    pub max_passes: u32,
    pub mode: SeparationMode,
    pub scaling: ForceScaling,
}

/// Outcome of a separation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeparationReport {
    /// Sequential: cells resolved. Simultaneous: passes that moved something.
    pub steps: u32,
    /// Individual cell moves applied.
    pub moves: u32,
    /// Sequential: cells still moving when their attempts ran out.
    /// Simultaneous: 1 if the pass budget ran out.
    pub exhausted: u32,
    pub converged: bool,
}

/// Displacement for `cells[index]` given everyone's current position.
///
/// Returns zero when the cell has no neighbours or the contributions cancel.
pub fn displacement(cells: &[Cell], index: usize, params: &SeparationParams) -> Point {
    let current = &cells[index];
    let mut velocity = Point::ZERO;
    let mut neighbor_count = 0u32;

    for (j, other) in cells.iter().enumerate() {
        if j == index {
            continue;
        }
        let distance = current.position.distance_2d(&other.position);
        if distance >= params.neighbor_radius {
            continue;
        }

        let direction = if distance < params.min_distance {
            tie_break_direction(index, j)
        } else {
            (current.position - other.position).normalize_2d()
        };
        let divisor = match params.scaling {
            ForceScaling::OwnExtent => current.half_extent.magnitude_2d(),
            ForceScaling::NeighborExtent => other.half_extent.magnitude_2d(),
        };
        velocity += direction / divisor;
        neighbor_count += 1;
    }

    if neighbor_count == 0 {
        return Point::ZERO;
    }

    velocity = velocity / neighbor_count as f64;
    velocity.normalize_2d() * params.push_distance
}

/// Coincident pair: the higher index moves +x, the lower -x, so the pair
/// splits even when both are displaced from the same snapshot.
fn tie_break_direction(index: usize, other: usize) -> Point {
    if index > other {
        Point::flat(1.0, 0.0)
    } else {
        Point::flat(-1.0, 0.0)
    }
}

/// Incremental solver; one [`step`](Self::step) is one unit of cooperative work.
#[derive(Debug, Clone)]
pub struct SeparationSolver {
    params: SeparationParams,
    cursor: usize,
    passes: u32,
    finished: bool,
    report: SeparationReport,
}

impl SeparationSolver {
    pub fn new(params: SeparationParams) -> Self {
        Self {
            params,
            cursor: 0,
            passes: 0,
            finished: false,
            report: SeparationReport::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn report(&self) -> SeparationReport {
        self.report
    }

    /// Advance by one cell (sequential) or one pass (simultaneous).
    /// Returns `true` once the solver has nothing left to do.
    pub fn step(&mut self, cells: &mut [Cell]) -> bool {
        if self.finished {
            return true;
        }
        match self.params.mode {
            SeparationMode::Sequential => self.step_sequential(cells),
            SeparationMode::Simultaneous => self.step_simultaneous(cells),
        }
        self.finished
    }

    /// Drive the solver to completion.
    pub fn run(&mut self, cells: &mut [Cell]) -> SeparationReport {
        while !self.step(cells) {}
        self.report
    }

    fn step_sequential(&mut self, cells: &mut [Cell]) {
        if self.cursor >= cells.len() {
            self.finish(self.report.exhausted == 0);
            return;
        }

        let index = self.cursor;
        let mut velocity = displacement(cells, index, &self.params);
        let mut attempts = 0;
        while !velocity.is_zero_2d() && attempts < self.params.max_attempts {
            cells[index].position += velocity;
            self.report.moves += 1;
            velocity = displacement(cells, index, &self.params);
            attempts += 1;
        }
        if !velocity.is_zero_2d() {
            self.report.exhausted += 1;
        }

        self.report.steps += 1;
        self.cursor += 1;
        if self.cursor >= cells.len() {
            self.finish(self.report.exhausted == 0);
        }
    }

    fn step_simultaneous(&mut self, cells: &mut [Cell]) {
        if self.passes >= self.params.max_passes {
            self.report.exhausted = 1;
            self.finish(false);
            return;
        }

        // collect from one snapshot, then apply
        let moves: Vec<Point> = (0..cells.len())
            .map(|i| displacement(cells, i, &self.params))
            .collect();
        if moves.iter().all(Point::is_zero_2d) {
            self.finish(true);
            return;
        }

        for (cell, velocity) in cells.iter_mut().zip(&moves) {
            if !velocity.is_zero_2d() {
                cell.position += *velocity;
                self.report.moves += 1;
            }
        }
        self.passes += 1;
        self.report.steps += 1;
    }

    fn finish(&mut self, converged: bool) {
        self.finished = true;
        self.report.converged = converged;
    }
}

/// Run a solver to completion over `cells`.
pub fn separate(cells: &mut [Cell], params: &SeparationParams) -> SeparationReport {
    SeparationSolver::new(*params).run(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extent;

    fn params(mode: SeparationMode) -> SeparationParams {
        SeparationParams {
            neighbor_radius: 20.0,
            push_distance: 5.0,
            min_distance: 0.01,
            max_attempts: 10,
            max_passes: 10,
            mode,
            scaling: ForceScaling::OwnExtent,
        }
    }

    fn cell(x: f64, y: f64, size: f64) -> Cell {
        Cell::new(Point::flat(x, y), Extent::new(size, size, 0.5))
    }

    #[test]
    fn test_isolated_cell_does_not_move() {
        let cells = vec![cell(0.0, 0.0, 2.0), cell(100.0, 0.0, 2.0)];
        let p = params(SeparationMode::Sequential);
        assert!(displacement(&cells, 0, &p).is_zero_2d());
    }

    #[test]
    fn test_displacement_points_away_with_push_length() {
        let cells = vec![cell(0.0, 0.0, 2.0), cell(3.0, 0.0, 2.0)];
        let p = params(SeparationMode::Sequential);
        let d = displacement(&cells, 0, &p);
        assert!((d.x + 5.0).abs() < 1e-12);
        assert!(d.y.abs() < 1e-12);
    }

    #[test]
    fn test_coincident_centres_split() {
        let cells = vec![cell(0.0, 0.0, 2.0), cell(0.0, 0.0, 2.0)];
        let p = params(SeparationMode::Simultaneous);
        let a = displacement(&cells, 0, &p);
        let b = displacement(&cells, 1, &p);
        assert!(a.x.is_finite() && b.x.is_finite());
        assert!(a.x < 0.0 && b.x > 0.0);
        assert!((a.length_2d() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_sequential_separates_pair() {
        let mut cells = vec![cell(0.0, 0.0, 2.0), cell(1.0, 0.0, 2.0)];
        let report = separate(&mut cells, &params(SeparationMode::Sequential));
        assert!(report.converged);
        assert_eq!(report.steps, 2);
        assert!(cells[0].position.distance_2d(&cells[1].position) >= 20.0);
    }

    #[test]
    fn test_simultaneous_separates_coincident_pair() {
        let mut cells = vec![cell(5.0, 5.0, 2.0), cell(5.0, 5.0, 2.0)];
        let report = separate(&mut cells, &params(SeparationMode::Simultaneous));
        assert!(report.converged);
        assert!(cells[0].position.distance_2d(&cells[1].position) >= 20.0);
    }

    #[test]
    fn test_budget_exhaustion_is_not_an_error() {
        // push of 0.5 cannot clear a 20-unit radius within one attempt
        let mut p = params(SeparationMode::Sequential);
        p.push_distance = 0.5;
        p.max_attempts = 1;
        let mut cells = vec![cell(0.0, 0.0, 2.0), cell(1.0, 0.0, 2.0)];
        let report = separate(&mut cells, &p);
        assert!(!report.converged);
        assert_eq!(report.exhausted, 2);
        assert_eq!(report.moves, 2);
    }

    #[test]
    fn test_simultaneous_pass_budget() {
        let mut p = params(SeparationMode::Simultaneous);
        p.push_distance = 0.5;
        p.max_passes = 3;
        let mut cells = vec![cell(0.0, 0.0, 2.0), cell(1.0, 0.0, 2.0)];
        let report = separate(&mut cells, &p);
        assert!(!report.converged);
        assert_eq!(report.steps, 3);
        assert_eq!(report.exhausted, 1);
        // both move apart each pass
        assert!((cells[1].position.x - cells[0].position.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_own_extent_scaling_is_asymmetric_in_magnitude_only() {
        // with two cells the averaged vector is renormalised, so both still
        // move the full push distance
        let cells = vec![cell(0.0, 0.0, 1.0), cell(2.0, 0.0, 50.0)];
        let p = params(SeparationMode::Simultaneous);
        let a = displacement(&cells, 0, &p);
        let b = displacement(&cells, 1, &p);
        assert!((a.length_2d() - 5.0).abs() < 1e-9);
        assert!((b.length_2d() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaling_changes_direction_with_three_cells() {
        // cell 0 is crowded by a small neighbour to the left and a large one
        // below; neighbour-extent scaling favours the small neighbour's push
        let cells = vec![cell(0.0, 0.0, 4.0), cell(-3.0, 0.0, 1.0), cell(0.0, -3.0, 40.0)];
        let mut p = params(SeparationMode::Sequential);
        let own = displacement(&cells, 0, &p);
        p.scaling = ForceScaling::NeighborExtent;
        let neighbor = displacement(&cells, 0, &p);
        assert!((own.x - own.y).abs() < 1e-9, "own-extent push is diagonal");
        assert!(neighbor.x > neighbor.y, "small neighbour dominates");
    }

    #[test]
    fn test_step_on_empty_finishes() {
        let mut solver = SeparationSolver::new(params(SeparationMode::Sequential));
        assert!(solver.step(&mut []));
        assert!(solver.is_finished());
        assert!(solver.report().converged);
    }
}
