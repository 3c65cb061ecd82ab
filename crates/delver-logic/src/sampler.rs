//! Cell sampling: scatter candidate footprints inside a disc.

use rand::Rng;
use std::f64::consts::TAU;

use crate::cell::Cell;
use crate::geometry::{Extent, Point};

/// Parameters for one sampling run.
#[derive(Debug, Clone, Copy)]
pub struct SampleParams {
    pub count: usize,
    pub radius: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub height: f64,
}

/// Uniformly distributed point inside a disc of `radius` centred on the origin.
///
/// The radial factor folds the sum of two uniform draws (`u > 1 → 2 - u`),
/// a triangular distribution whose density grows linearly with `r` and so
/// avoids clustering at the centre.
pub fn random_point_in_disc(radius: f64, rng: &mut impl Rng) -> Point {
    let t = TAU * rng.gen::<f64>();
    let u = rng.gen::<f64>() + rng.gen::<f64>();
    let r = if u > 1.0 { 2.0 - u } else { u };
    Point::flat(radius * r * t.cos(), radius * r * t.sin())
}

/// Produce `params.count` cells with disc-uniform centres and independent
/// half-extents per axis in `[min_size, max_size]`.
pub fn sample_cells(params: &SampleParams, rng: &mut impl Rng) -> Vec<Cell> {
    (0..params.count)
        .map(|_| {
            let position = random_point_in_disc(params.radius, rng);
            let half_extent = Extent::new(
                random_size(params.min_size, params.max_size, rng),
                random_size(params.min_size, params.max_size, rng),
                params.height,
            );
            Cell::new(position, half_extent)
        })
        .collect()
}

fn random_size(min: f64, max: f64, rng: &mut impl Rng) -> f64 {
    if min >= max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}
