//! Placement providers: where generated rooms and corridors end up.
//!
//! The generator never holds host handles. It asks a [`PlacementProvider`] to
//! spawn things and keeps the opaque [`PlacementId`]s it gets back so it can
//! destroy them again on clear.

use delver_logic::geometry::{Extent, Point};
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{CorridorSegment, RoomFootprint};

/// Opaque handle to something a provider placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementId(pub u64);

/// Why a provider refused a placement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("placement at ({x:.1}, {y:.1}) was rejected by the host")]
    Rejected { x: f64, y: f64 },
}

impl PlacementError {
    pub fn rejected_at(p: &Point) -> Self {
        Self::Rejected { x: p.x, y: p.y }
    }
}

/// Spawn/destroy capabilities the generator needs from its host.
///
/// Calls are synchronous. A failed spawn is not fatal: the generator logs it
/// and carries on.
pub trait PlacementProvider {
    fn spawn_room(&mut self, center: Point, half_extent: Extent) -> Result<PlacementId, PlacementError>;

    fn spawn_corridor(&mut self, location: Point) -> Result<PlacementId, PlacementError>;

    /// Remove a previous placement. Unknown ids are ignored.
    fn destroy(&mut self, id: PlacementId);
}

impl<P: PlacementProvider + ?Sized> PlacementProvider for &mut P {
    fn spawn_room(&mut self, center: Point, half_extent: Extent) -> Result<PlacementId, PlacementError> {
        (**self).spawn_room(center, half_extent)
    }

    fn spawn_corridor(&mut self, location: Point) -> Result<PlacementId, PlacementError> {
        (**self).spawn_corridor(location)
    }

    fn destroy(&mut self, id: PlacementId) {
        (**self).destroy(id)
    }
}

impl<P: PlacementProvider + ?Sized> PlacementProvider for Box<P> {
    fn spawn_room(&mut self, center: Point, half_extent: Extent) -> Result<PlacementId, PlacementError> {
        (**self).spawn_room(center, half_extent)
    }

    fn spawn_corridor(&mut self, location: Point) -> Result<PlacementId, PlacementError> {
        (**self).spawn_corridor(location)
    }

    fn destroy(&mut self, id: PlacementId) {
        (**self).destroy(id)
    }
}

/// Provider that records placements as entities in a `hecs` world.
pub struct WorldProvider {
    /// ECS world holding one entity per placement
    pub world: World,
    /// Live entities in spawn order
    spawned: Vec<Entity>,
}

impl WorldProvider {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            spawned: Vec::new(),
        }
    }

    /// Count room footprints
    pub fn room_count(&self) -> usize {
        self.world.query::<&RoomFootprint>().iter().count()
    }

    /// Count corridor segments
    pub fn corridor_count(&self) -> usize {
        self.world.query::<&CorridorSegment>().iter().count()
    }

    /// Room footprints in spawn order
    pub fn rooms(&self) -> Vec<RoomFootprint> {
        self.spawned
            .iter()
            .filter_map(|&e| self.world.get::<&RoomFootprint>(e).ok().map(|r| *r))
            .collect()
    }

    /// Corridor locations in spawn order
    pub fn corridors(&self) -> Vec<Point> {
        self.spawned
            .iter()
            .filter_map(|&e| self.world.get::<&CorridorSegment>(e).ok().map(|c| c.location))
            .collect()
    }

    /// `true` when a placed room covers `p`.
    pub fn room_at(&self, p: &Point) -> bool {
        self.world
            .query::<&RoomFootprint>()
            .iter()
            .any(|(_, r)| r.bounds().contains(p))
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
    }

    fn track(&mut self, entity: Entity) -> PlacementId {
        self.spawned.push(entity);
        PlacementId(entity.to_bits().get())
    }
}

impl Default for WorldProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementProvider for WorldProvider {
    fn spawn_room(&mut self, center: Point, half_extent: Extent) -> Result<PlacementId, PlacementError> {
        let entity = self.world.spawn((RoomFootprint {
            center,
            half_extent,
        },));
        Ok(self.track(entity))
    }

    fn spawn_corridor(&mut self, location: Point) -> Result<PlacementId, PlacementError> {
        let entity = self.world.spawn((CorridorSegment { location },));
        Ok(self.track(entity))
    }

    fn destroy(&mut self, id: PlacementId) {
        let Some(entity) = Entity::from_bits(id.0) else {
            return;
        };
        if self.world.despawn(entity).is_ok() {
            self.spawned.retain(|&e| e != entity);
        } else {
            log::debug!("destroy of unknown placement {:?}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_provider_spawns_entities() {
        let mut provider = WorldProvider::new();
        provider
            .spawn_room(Point::flat(0.0, 0.0), Extent::new(10.0, 10.0, 1.0))
            .unwrap();
        provider.spawn_corridor(Point::flat(50.0, 0.0)).unwrap();
        provider.spawn_corridor(Point::flat(60.0, 0.0)).unwrap();

        assert_eq!(provider.room_count(), 1);
        assert_eq!(provider.corridor_count(), 2);
        assert_eq!(
            provider.corridors(),
            vec![Point::flat(50.0, 0.0), Point::flat(60.0, 0.0)]
        );
        assert!(provider.room_at(&Point::flat(10.0, -10.0)));
        assert!(!provider.room_at(&Point::flat(10.5, 0.0)));
    }

    #[test]
    fn test_destroy_removes_entity() {
        let mut provider = WorldProvider::new();
        let id = provider.spawn_corridor(Point::flat(5.0, 5.0)).unwrap();
        provider.destroy(id);
        assert_eq!(provider.corridor_count(), 0);
        assert!(provider.is_empty());
        // second destroy is a no-op
        provider.destroy(id);
    }

    #[test]
    fn test_ids_are_distinct() {
        let mut provider = WorldProvider::new();
        let a = provider.spawn_corridor(Point::flat(0.0, 0.0)).unwrap();
        let b = provider.spawn_corridor(Point::flat(5.0, 0.0)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_placement_error_message() {
        let e = PlacementError::rejected_at(&Point::flat(1.0, 2.5));
        assert_eq!(e.to_string(), "placement at (1.0, 2.5) was rejected by the host");
    }
}
