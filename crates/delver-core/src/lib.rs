//! Delver Core - Dungeon Generation Engine
//!
//! Drives the pure layout pipeline from `delver-logic` through a phase state
//! machine and hands every room and corridor to a placement provider.
//!
//! # Architecture
//!
//! - **Generator**: owns the run state (cells, rooms, edges, corridors) and the
//!   seeded random stream
//! - **Providers**: host capabilities to spawn and destroy placements; the
//!   bundled [`provider::WorldProvider`] records them as `hecs` entities
//! - **Components**: pure data attached to placement entities
//!
//! # Example
//!
//! ```rust
//! use delver_core::prelude::*;
//!
//! let mut generator = DungeonGenerator::new(WorldProvider::new());
//! let layout = generator
//!     .generate(DungeonConfig {
//!         seed: Some(42),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(generator.provider().corridor_count(), layout.corridors.len());
//!
//! // Remove everything before the next run
//! generator.clear();
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod layout;
pub mod provider;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{DungeonGenerator, Phase};
    pub use crate::error::GenerationError;
    pub use crate::layout::DungeonLayout;
    pub use crate::provider::{PlacementError, PlacementId, PlacementProvider, WorldProvider};
    pub use delver_logic::config::DungeonConfig;
}
