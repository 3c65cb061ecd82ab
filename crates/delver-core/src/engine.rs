//! Dungeon generator - main entry point for running the layout pipeline.
//!
//! One state machine drives every run through
//! `Idle → Spawning → Separating → Connecting → Done`. [`DungeonGenerator::generate`]
//! runs it to completion; [`DungeonGenerator::begin`] plus repeated
//! [`DungeonGenerator::step`] calls advance it one unit of work at a time for
//! hosts that spread generation across frames. Both paths produce the same
//! layout for the same seed.

use delver_logic::cell::{visible_room_bounds, Cell};
use delver_logic::config::DungeonConfig;
use delver_logic::corridors::CorridorRasterizer;
use delver_logic::geometry::Point;
use delver_logic::sampler::sample_cells;
use delver_logic::selection::select_rooms;
use delver_logic::separation::{SeparationReport, SeparationSolver};
use delver_logic::spanning::{span, Spanning};
use delver_logic::triangulation::{triangulate, Triangulation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::layout::{DungeonLayout, PlacementStats, RoomSummary};
use crate::provider::{PlacementId, PlacementProvider};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing generated (new, or cleared).
    Idle,
    /// Next step scatters the candidate cells.
    Spawning,
    /// Each step is one separation unit (a cell, or a simultaneous pass).
    Separating,
    /// Next step selects rooms, places them, and carves corridors.
    Connecting,
    /// Finished; call `clear` before the next run.
    Done,
}

/// A kept room and its placement, if the host accepted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedRoom {
    /// Index into [`DungeonGenerator::cells`].
    pub cell: usize,
    pub id: Option<PlacementId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCorridor {
    pub id: PlacementId,
    pub location: Point,
}

/// Main generation engine
pub struct DungeonGenerator<P: PlacementProvider> {
    provider: P,
    config: DungeonConfig,
    phase: Phase,
    rng: ChaCha8Rng,
    last_seed: Option<u64>,

    cells: Vec<Cell>,
    solver: Option<SeparationSolver>,
    separation: SeparationReport,
    rooms: Vec<PlacedRoom>,
    room_centers: Vec<Point>,
    triangulation: Triangulation,
    spanning: Spanning,
    corridors: Vec<PlacedCorridor>,
    stats: PlacementStats,
}

impl<P: PlacementProvider> DungeonGenerator<P> {
    /// Create an idle generator that places through `provider`
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: DungeonConfig::default(),
            phase: Phase::Idle,
            rng: ChaCha8Rng::seed_from_u64(0),
            last_seed: None,
            cells: Vec::new(),
            solver: None,
            separation: SeparationReport::default(),
            rooms: Vec::new(),
            room_centers: Vec::new(),
            triangulation: Triangulation::default(),
            spanning: Spanning::default(),
            corridors: Vec::new(),
            stats: PlacementStats::default(),
        }
    }

    /// Run the whole pipeline and return its summary.
    pub fn generate(&mut self, config: DungeonConfig) -> Result<DungeonLayout, GenerationError> {
        self.begin(config)?;
        while self.step() != Phase::Done {}
        Ok(self.layout())
    }

    /// Clear any previous run, then generate.
    pub fn regenerate(&mut self, config: DungeonConfig) -> Result<DungeonLayout, GenerationError> {
        self.clear();
        self.generate(config)
    }

    /// Validate `config`, seed the run and enter [`Phase::Spawning`].
    ///
    /// Returns the seed in use. Nothing is placed until [`step`](Self::step).
    pub fn begin(&mut self, config: DungeonConfig) -> Result<u64, GenerationError> {
        if self.phase != Phase::Idle {
            return Err(GenerationError::AlreadyGenerated);
        }
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(GenerationError::InvalidConfig(errors));
        }

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.last_seed = Some(seed);
        log::info!(
            "Generating dungeon: {} cells, seed {}, {:?} separation",
            config.cell_count,
            seed,
            config.separation_mode
        );
        self.config = config;
        self.phase = Phase::Spawning;
        Ok(seed)
    }

    /// Do one unit of work and return the phase reached.
    ///
    /// A no-op in [`Phase::Idle`] and [`Phase::Done`].
    pub fn step(&mut self) -> Phase {
        match self.phase {
            Phase::Idle | Phase::Done => {}
            Phase::Spawning => self.spawn_cells(),
            Phase::Separating => self.separate_step(),
            Phase::Connecting => self.connect(),
        }
        self.phase
    }

    /// Destroy every placement and reset to [`Phase::Idle`].
    ///
    /// The last seed is kept so a run can be reproduced.
    pub fn clear(&mut self) {
        let mut destroyed = 0;
        for corridor in self.corridors.drain(..) {
            self.provider.destroy(corridor.id);
            destroyed += 1;
        }
        for room in self.rooms.drain(..) {
            if let Some(id) = room.id {
                self.provider.destroy(id);
                destroyed += 1;
            }
        }

        self.cells.clear();
        self.solver = None;
        self.separation = SeparationReport::default();
        self.room_centers.clear();
        self.triangulation = Triangulation::default();
        self.spanning = Spanning::default();
        self.stats = PlacementStats::default();
        self.phase = Phase::Idle;
        log::info!("Dungeon cleared ({} placements destroyed)", destroyed);
    }

    fn spawn_cells(&mut self) {
        self.cells = sample_cells(&self.config.sample_params(), &mut self.rng);
        self.solver = Some(SeparationSolver::new(self.config.separation_params()));
        self.phase = Phase::Separating;
        log::debug!("Spawned {} candidate cells", self.cells.len());
    }

    fn separate_step(&mut self) {
        let Some(solver) = self.solver.as_mut() else {
            self.phase = Phase::Connecting;
            return;
        };
        if !solver.step(&mut self.cells) {
            return;
        }

        self.separation = solver.report();
        self.solver = None;
        self.phase = Phase::Connecting;
        if self.separation.converged {
            log::debug!(
                "Separation settled after {} steps ({} moves)",
                self.separation.steps,
                self.separation.moves
            );
        } else {
            log::debug!(
                "Separation budget exhausted ({} unresolved), keeping layout",
                self.separation.exhausted
            );
        }
    }

    fn connect(&mut self) {
        let centers = select_rooms(&mut self.cells, &self.config.selection_params(), &mut self.rng);
        self.place_rooms();

        self.triangulation = triangulate(&centers);
        self.spanning = span(
            &self.triangulation.edges,
            self.config.loop_probability,
            &mut self.rng,
        );
        self.room_centers = centers;

        let mut rasterizer =
            CorridorRasterizer::new(self.config.corridor_params(), visible_room_bounds(&self.cells));
        for edge in self.spanning.edges() {
            rasterizer.add_edge(edge);
        }
        let plan = rasterizer.finish();
        self.stats.corridor_overlaps = plan.overlapped;
        self.stats.corridor_duplicates = plan.duplicates;

        for location in plan.segments {
            match self.provider.spawn_corridor(location) {
                Ok(id) => self.corridors.push(PlacedCorridor { id, location }),
                Err(e) => {
                    self.stats.corridors_rejected += 1;
                    log::warn!("Corridor segment skipped: {}", e);
                }
            }
        }

        self.phase = Phase::Done;
        log::info!(
            "Dungeon generated: {} rooms, {} tree + {} loop edges, {} corridor segments",
            self.rooms.len(),
            self.spanning.tree.len(),
            self.spanning.loops.len(),
            self.corridors.len()
        );
    }

    /// Place every kept cell. A rejected room stays kept but stops occupying
    /// space for corridor avoidance.
    fn place_rooms(&mut self) {
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if !cell.kept {
                continue;
            }
            let id = match self.provider.spawn_room(cell.position, cell.half_extent) {
                Ok(id) => Some(id),
                Err(e) => {
                    cell.visible = false;
                    self.stats.rooms_rejected += 1;
                    log::warn!("Room #{} not placed: {}", index, e);
                    None
                }
            };
            self.rooms.push(PlacedRoom { cell: index, id });
        }
    }

    /// Summary of the current run.
    pub fn layout(&self) -> DungeonLayout {
        DungeonLayout {
            seed: self.last_seed.unwrap_or_default(),
            cell_count: self.cells.len(),
            rooms: self
                .rooms
                .iter()
                .filter_map(|r| {
                    self.cells.get(r.cell).map(|c| RoomSummary {
                        center: c.position,
                        half_extent: c.half_extent,
                        placed: r.id.is_some(),
                    })
                })
                .collect(),
            corridors: self.corridors.iter().map(|c| c.location).collect(),
            tree_edges: self.spanning.tree.len(),
            loop_edges: self.spanning.loops.len(),
            separation: self.separation,
            stats: self.stats,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Seed of the most recent run, if any.
    pub fn last_seed(&self) -> Option<u64> {
        self.last_seed
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn rooms(&self) -> &[PlacedRoom] {
        &self.rooms
    }

    /// Snapped centres of every kept room, placed or not.
    pub fn room_centers(&self) -> &[Point] {
        &self.room_centers
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    pub fn spanning(&self) -> &Spanning {
        &self.spanning
    }

    pub fn corridors(&self) -> &[PlacedCorridor] {
        &self.corridors
    }

    pub fn separation_report(&self) -> SeparationReport {
        self.separation
    }

    pub fn stats(&self) -> PlacementStats {
        self.stats
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{PlacementError, WorldProvider};
    use delver_logic::geometry::Extent;
    use delver_logic::pipeline::plan_layout;
    use delver_logic::separation::SeparationMode;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Room(Point, Extent),
        Corridor(Point),
        Destroy(PlacementId),
    }

    /// Records every call; optionally rejects rooms or every nth corridor.
    #[derive(Default)]
    struct RecordingProvider {
        calls: Vec<Call>,
        next: u64,
        reject_rooms: bool,
        reject_every_nth_corridor: Option<usize>,
        corridors_seen: usize,
    }

    impl RecordingProvider {
        fn spawns(&self) -> Vec<Call> {
            self.calls
                .iter()
                .filter(|c| !matches!(c, Call::Destroy(_)))
                .cloned()
                .collect()
        }

        fn destroys(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Destroy(_)))
                .count()
        }

        fn issue(&mut self) -> PlacementId {
            self.next += 1;
            PlacementId(self.next)
        }
    }

    impl PlacementProvider for RecordingProvider {
        fn spawn_room(&mut self, center: Point, half_extent: Extent) -> Result<PlacementId, PlacementError> {
            if self.reject_rooms {
                return Err(PlacementError::rejected_at(&center));
            }
            self.calls.push(Call::Room(center, half_extent));
            Ok(self.issue())
        }

        fn spawn_corridor(&mut self, location: Point) -> Result<PlacementId, PlacementError> {
            self.corridors_seen += 1;
            if let Some(n) = self.reject_every_nth_corridor {
                if self.corridors_seen % n == 0 {
                    return Err(PlacementError::rejected_at(&location));
                }
            }
            self.calls.push(Call::Corridor(location));
            Ok(self.issue())
        }

        fn destroy(&mut self, id: PlacementId) {
            self.calls.push(Call::Destroy(id));
        }
    }

    fn seeded(seed: u64) -> DungeonConfig {
        DungeonConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_generator_creation() {
        let generator = DungeonGenerator::new(WorldProvider::new());
        assert_eq!(generator.phase(), Phase::Idle);
        assert!(generator.last_seed().is_none());
        assert!(generator.cells().is_empty());
    }

    #[test]
    fn test_generate_places_rooms_and_corridors() {
        let mut generator = DungeonGenerator::new(WorldProvider::new());
        let layout = generator.generate(seeded(42)).unwrap();

        assert_eq!(generator.phase(), Phase::Done);
        assert_eq!(layout.seed, 42);
        assert_eq!(layout.cell_count, 60);
        assert!(!layout.rooms.is_empty());
        assert_eq!(generator.provider().room_count(), layout.rooms.len());
        assert_eq!(generator.provider().corridor_count(), layout.corridors.len());
        assert_eq!(generator.provider().corridors(), layout.corridors);
    }

    #[test]
    fn test_matches_headless_pipeline() {
        let config = seeded(7);
        let plan = plan_layout(&config, &mut ChaCha8Rng::seed_from_u64(7));

        let mut generator = DungeonGenerator::new(WorldProvider::new());
        let layout = generator.generate(config).unwrap();

        assert_eq!(generator.cells(), &plan.cells[..]);
        assert_eq!(generator.room_centers(), &plan.rooms[..]);
        assert_eq!(generator.spanning(), &plan.spanning);
        assert_eq!(layout.corridors, plan.corridors.segments);
        assert_eq!(layout.separation, plan.separation);
    }

    #[test]
    fn test_clear_then_regenerate_is_identical() {
        let mut generator = DungeonGenerator::new(RecordingProvider::default());
        generator.generate(seeded(1234)).unwrap();
        let first = generator.provider().spawns();
        assert!(!first.is_empty());

        generator.clear();
        assert_eq!(generator.phase(), Phase::Idle);
        assert_eq!(generator.provider().destroys(), first.len());
        assert!(generator.corridors().is_empty());
        assert!(generator.rooms().is_empty());

        generator.provider_mut().calls.clear();
        generator.generate(seeded(1234)).unwrap();
        assert_eq!(generator.provider().spawns(), first);
    }

    #[test]
    fn test_stepping_matches_generate() {
        let mut direct = DungeonGenerator::new(WorldProvider::new());
        let expected = direct.generate(seeded(99)).unwrap();

        let mut stepped = DungeonGenerator::new(WorldProvider::new());
        stepped.begin(seeded(99)).unwrap();
        let mut separating_steps = 0;
        loop {
            match stepped.step() {
                Phase::Separating => separating_steps += 1,
                Phase::Done => break,
                _ => {}
            }
        }
        // sequential mode resolves one cell per step
        assert!(separating_steps >= 59);
        assert_eq!(stepped.layout(), expected);
    }

    #[test]
    fn test_simultaneous_mode_steps_per_pass() {
        let config = DungeonConfig {
            separation_mode: SeparationMode::Simultaneous,
            max_passes: 4,
            ..seeded(5)
        };
        let mut generator = DungeonGenerator::new(WorldProvider::new());
        generator.begin(config).unwrap();
        assert_eq!(generator.step(), Phase::Separating);
        let mut steps = 0;
        while generator.step() == Phase::Separating {
            steps += 1;
        }
        assert!(steps <= 4);
        assert_eq!(generator.step(), Phase::Done);
    }

    #[test]
    fn test_random_seed_is_recorded_and_reusable() {
        let mut generator = DungeonGenerator::new(WorldProvider::new());
        let first = generator.generate(DungeonConfig::default()).unwrap();
        let seed = generator.last_seed().unwrap();
        assert_eq!(first.seed, seed);

        let again = generator.regenerate(seeded(seed)).unwrap();
        assert_eq!(again.rooms, first.rooms);
        assert_eq!(again.corridors, first.corridors);
    }

    #[test]
    fn test_invalid_config_places_nothing() {
        let mut generator = DungeonGenerator::new(RecordingProvider::default());
        let config = DungeonConfig {
            min_size: 10.0,
            max_size: 1.0,
            ..Default::default()
        };
        let err = generator.generate(config).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidConfig(ref e) if e.len() == 1));
        assert!(generator.provider().calls.is_empty());
        assert_eq!(generator.phase(), Phase::Idle);
    }

    #[test]
    fn test_second_generate_requires_clear() {
        let mut generator = DungeonGenerator::new(WorldProvider::new());
        generator.generate(seeded(1)).unwrap();
        assert_eq!(
            generator.generate(seeded(1)),
            Err(GenerationError::AlreadyGenerated)
        );
    }

    #[test]
    fn test_rejected_rooms_turn_invisible() {
        let provider = RecordingProvider {
            reject_rooms: true,
            ..Default::default()
        };
        let mut generator = DungeonGenerator::new(provider);
        let layout = generator.generate(seeded(3)).unwrap();

        let kept = generator.cells().iter().filter(|c| c.kept).count();
        assert!(kept > 0);
        assert_eq!(layout.stats.rooms_rejected as usize, kept);
        assert_eq!(layout.placed_rooms(), 0);
        assert!(generator.cells().iter().all(|c| !c.visible));
        // rooms stay part of the graph even when unplaced
        assert_eq!(generator.room_centers().len(), kept);
        assert_eq!(layout.stats.corridor_overlaps, 0);
    }

    #[test]
    fn test_rejected_corridors_are_skipped() {
        let provider = RecordingProvider {
            reject_every_nth_corridor: Some(3),
            ..Default::default()
        };
        let mut generator = DungeonGenerator::new(provider);
        let layout = generator.generate(seeded(11)).unwrap();

        let attempted = generator.provider().corridors_seen;
        assert_eq!(attempted / 3, layout.stats.corridors_rejected as usize);
        assert_eq!(layout.corridors.len(), attempted - attempted / 3);
    }

    #[test]
    fn test_step_when_idle_is_noop() {
        let mut generator = DungeonGenerator::new(WorldProvider::new());
        assert_eq!(generator.step(), Phase::Idle);
        generator.clear();
        assert_eq!(generator.phase(), Phase::Idle);
    }

    #[test]
    fn test_layout_serializes() {
        let mut generator = DungeonGenerator::new(WorldProvider::new());
        let layout = generator.generate(seeded(8)).unwrap();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["seed"], 8);
        assert_eq!(json["rooms"].as_array().unwrap().len(), layout.rooms.len());
        assert_eq!(json["corridors"].as_array().unwrap().len(), layout.corridors.len());
        assert_eq!(json["separation"]["converged"], layout.separation.converged);
    }
}
