//! Pure dungeon layout logic for Delver.
//!
//! This crate contains every layout algorithm, independent of any engine,
//! world or runtime. Functions take plain data and an injected random source
//! and return results, making them unit-testable and portable across native
//! tools, the ECS-backed core and C hosts.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cell`] | Candidate room cells with kept/visible flags |
//! | [`config`] | Generation configuration, defaults and validation |
//! | [`corridors`] | Axis-aligned corridor walks with grid snapping and room avoidance |
//! | [`geometry`] | Points, extents, bounds, weighted edges, grid snap |
//! | [`pipeline`] | Whole-pipeline composition for headless use |
//! | [`sampler`] | Disc-uniform cell scattering |
//! | [`selection`] | Size-threshold room selection with random retention |
//! | [`separation`] | Bounded repulsion solver (sequential or simultaneous) |
//! | [`spanning`] | Prim minimum spanning tree plus random loop edges |
//! | [`triangulation`] | Bowyer–Watson Delaunay triangulation |
//! | [`validation`] | Layout checks for harnesses and tests |

pub mod cell;
pub mod config;
pub mod corridors;
pub mod geometry;
pub mod pipeline;
pub mod sampler;
pub mod selection;
pub mod separation;
pub mod spanning;
pub mod triangulation;
pub mod validation;
