//! Generation configuration and validation.
//!
//! A single [`DungeonConfig`] carries every tunable of the pipeline. It is
//! plain serde data so hosts can load it from JSON, and it hands out the
//! per-stage parameter structs each module consumes.
//!
//! ```
//! use delver_logic::config::DungeonConfig;
//!
//! let mut config = DungeonConfig::default();
//! config.cell_count = 120;
//! config.seed = Some(7);
//! assert!(config.validate().is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corridors::{CorridorParams, GapPolicy, WalkOrder};
use crate::sampler::SampleParams;
use crate::selection::SelectionParams;
use crate::separation::{ForceScaling, SeparationMode, SeparationParams};

/// Everything a generation run needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Candidate cells scattered before separation.
    pub cell_count: usize,
    /// Half-extent range for each horizontal axis.
    pub min_size: f64,
    pub max_size: f64,
    /// Fixed half-extent on z.
    pub cell_height: f64,
    pub spawn_radius: f64,

    pub neighbor_radius: f64,
    pub push_distance: f64,
    /// Centres closer than this are treated as coincident.
    pub min_distance: f64,
    pub max_attempts: u32,
    pub max_passes: u32,
    pub separation_mode: SeparationMode,
    pub force_scaling: ForceScaling,

    /// Margin above `min_size` a cell must exceed on both axes to be a room.
    pub room_threshold: f64,
    pub retain_probability: f64,

    pub section_length: f64,
    pub snap_size: f64,
    pub loop_probability: f64,
    pub walk_order: WalkOrder,
    pub gap_policy: GapPolicy,

    /// Random seed for generation (None = fresh seed per run).
    pub seed: Option<u64>,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            cell_count: 60,
            min_size: 100.0,
            max_size: 500.0,
            cell_height: 25.0,
            spawn_radius: 2000.0,
            neighbor_radius: 800.0,
            push_distance: 100.0,
            min_distance: 0.01,
            max_attempts: 10,
            max_passes: 10,
            separation_mode: SeparationMode::Sequential,
            force_scaling: ForceScaling::OwnExtent,
            room_threshold: 150.0,
            retain_probability: 0.05,
            section_length: 100.0,
            snap_size: 5.0,
            loop_probability: 0.1,
            walk_order: WalkOrder::YFirst,
            gap_policy: GapPolicy::Leave,
            seed: None,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("min_size {min} is larger than max_size {max}")]
    SizeRangeInverted { min: f64, max: f64 },
    #[error("{field} must be a probability in [0, 1], got {value}")]
    NotAProbability { field: &'static str, value: f64 },
}

impl DungeonConfig {
    /// Validate the configuration, returning all errors found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("min_size", self.min_size),
            ("max_size", self.max_size),
            ("cell_height", self.cell_height),
            ("spawn_radius", self.spawn_radius),
            ("neighbor_radius", self.neighbor_radius),
            ("min_distance", self.min_distance),
            ("section_length", self.section_length),
            ("snap_size", self.snap_size),
        ] {
            // NaN fails this too
            if !(value > 0.0) {
                errors.push(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("push_distance", self.push_distance),
            ("room_threshold", self.room_threshold),
        ] {
            if !(value >= 0.0) {
                errors.push(ConfigError::Negative { field, value });
            }
        }
        if self.min_size > self.max_size {
            errors.push(ConfigError::SizeRangeInverted {
                min: self.min_size,
                max: self.max_size,
            });
        }
        for (field, value) in [
            ("retain_probability", self.retain_probability),
            ("loop_probability", self.loop_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::NotAProbability { field, value });
            }
        }

        errors
    }

    pub fn sample_params(&self) -> SampleParams {
        SampleParams {
            count: self.cell_count,
            radius: self.spawn_radius,
            min_size: self.min_size,
            max_size: self.max_size,
            height: self.cell_height,
        }
    }

    pub fn separation_params(&self) -> SeparationParams {
        SeparationParams {
            neighbor_radius: self.neighbor_radius,
            push_distance: self.push_distance,
            min_distance: self.min_distance,
            max_attempts: self.max_attempts,
            max_passes: self.max_passes,
            mode: self.separation_mode,
            scaling: self.force_scaling,
        }
    }

    pub fn selection_params(&self) -> SelectionParams {
        SelectionParams {
            min_size: self.min_size,
            threshold: self.room_threshold,
            retain_probability: self.retain_probability,
            snap_size: self.snap_size,
        }
    }

    pub fn corridor_params(&self) -> CorridorParams {
        CorridorParams {
            section_length: self.section_length,
            snap_size: self.snap_size,
            walk_order: self.walk_order,
            gap_policy: self.gap_policy,
        }
    }
}
