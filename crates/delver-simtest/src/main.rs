//! Delver Headless Generation Harness
//!
//! Runs the full dungeon pipeline across a sweep of seeds and validates every
//! layout. Runs entirely in-process without a host engine.
//!
//! Usage:
//!   cargo run -p delver-simtest
//!   cargo run -p delver-simtest -- --verbose
//!   cargo run -p delver-simtest -- --seeds 50 --config dungeon.json
//!   cargo run -p delver-simtest -- --json

use delver_core::prelude::*;
use delver_logic::corridors::rasterize_corridors;
use delver_logic::geometry::{snap, Bounds, Edge, Extent, Point};
use delver_logic::separation::{ForceScaling, SeparationMode};
use delver_logic::spanning::minimum_spanning_tree;
use delver_logic::triangulation::triangulate;
use delver_logic::validation::{validate_all, Severity};
use log::{LevelFilter, Metadata, Record};

// ── Logging ─────────────────────────────────────────────────────────────

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!("[{:<5}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    seeds: u64,
    config: DungeonConfig,
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        verbose: false,
        json: false,
        seeds: 20,
        config: DungeonConfig::default(),
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--seeds" => {
                let value = args.next().ok_or("--seeds needs a value")?;
                options.seeds = value
                    .parse()
                    .map_err(|e| format!("bad --seeds value {:?}: {}", value, e))?;
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read {}: {}", path, e))?;
                options.config = serde_json::from_str(&text)
                    .map_err(|e| format!("cannot parse {}: {}", path, e))?;
            }
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(options)
}

fn main() {
    let options = match parse_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    if options.verbose && log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }

    if options.json {
        print_layout_json(&options.config);
        return;
    }

    println!("=== Delver Generation Harness ===\n");
    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(&options.config));

    // 2. Fixed geometry scenarios
    results.extend(validate_scenarios());

    // 3. Seed sweep with layout validation
    results.extend(validate_seed_sweep(&options.config, options.seeds, options.verbose));

    // 4. Determinism across clear/regenerate and stepping
    results.extend(validate_determinism(&options.config));

    // 5. Separation policy variants
    results.extend(validate_policy_variants(&options.config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_layout_json(config: &DungeonConfig) {
    let mut generator = DungeonGenerator::new(WorldProvider::new());
    let layout = match generator.generate(config.clone()) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::to_string_pretty(&layout) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn with_seed(config: &DungeonConfig, seed: u64) -> DungeonConfig {
    DungeonConfig {
        seed: Some(seed),
        ..config.clone()
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let errors = config.validate();
    results.push(TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} cells, radius {}", config.cell_count, config.spawn_radius)
        } else {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let broken = DungeonConfig {
        min_size: config.max_size + 1.0,
        ..config.clone()
    };
    let mut generator = DungeonGenerator::new(WorldProvider::new());
    let rejected = generator.generate(broken).is_err();
    results.push(TestResult {
        name: "config_inverted_sizes_rejected".into(),
        passed: rejected && generator.provider().is_empty(),
        detail: "min_size > max_size fails before placement".into(),
    });

    results
}

// ── 2. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios() -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    let right = triangulate(&[
        Point::flat(0.0, 0.0),
        Point::flat(10.0, 0.0),
        Point::flat(0.0, 10.0),
    ]);
    results.push(TestResult {
        name: "right_triangle".into(),
        passed: right.triangles.len() == 1 && right.edges.len() == 3,
        detail: format!("{} triangles, {} edges", right.triangles.len(), right.edges.len()),
    });

    let square = triangulate(&[
        Point::flat(0.0, 0.0),
        Point::flat(10.0, 0.0),
        Point::flat(0.0, 10.0),
        Point::flat(10.0, 10.0),
    ]);
    let tree = minimum_spanning_tree(&square.edges, Point::flat(0.0, 0.0));
    let weight: i64 = tree.iter().map(|e| e.weight).sum();
    results.push(TestResult {
        name: "square_mst".into(),
        passed: tree.len() == 3 && weight == 30,
        detail: format!("{} edges, weight {}", tree.len(), weight),
    });

    let config = DungeonConfig::default();
    let plan = rasterize_corridors(
        &[Edge::new(Point::flat(0.0, 0.0), Point::flat(300.0, 0.0))],
        Vec::new(),
        &config.corridor_params(),
    );
    let xs: Vec<f64> = plan.segments.iter().map(|p| p.x).collect();
    results.push(TestResult {
        name: "straight_corridor".into(),
        passed: xs == [100.0, 200.0, 300.0],
        detail: format!("segments at x = {:?}", xs),
    });

    let room = Bounds::new(Point::flat(0.0, 0.0), Extent::new(10.0, 10.0, 1.0));
    results.push(TestResult {
        name: "bounds_inclusive".into(),
        passed: room.contains(&Point::flat(10.0, -10.0)) && !room.contains(&Point::flat(10.01, 0.0)),
        detail: "edge points are inside".into(),
    });

    let snap_ok = (-500..500).all(|i| {
        let v = i as f64 * 0.37;
        let s = snap(v, 5.0);
        s >= v && (s / 5.0).fract() == 0.0
    });
    results.push(TestResult {
        name: "snap_invariant".into(),
        passed: snap_ok,
        detail: "snap(v, 5) is a multiple of 5 and >= v".into(),
    });

    results
}

// ── 3. Seed sweep ───────────────────────────────────────────────────────

fn validate_seed_sweep(config: &DungeonConfig, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Seed sweep ({} seeds) ---", seeds);
    let mut results = Vec::new();
    let mut generator = DungeonGenerator::new(WorldProvider::new());

    let mut total_rooms = 0;
    let mut total_corridors = 0;
    let mut unconverged = 0;
    let mut warnings = 0;
    for seed in 0..seeds {
        let layout = match generator.regenerate(with_seed(config, seed)) {
            Ok(layout) => layout,
            Err(e) => {
                results.push(TestResult {
                    name: format!("seed_{}_generate", seed),
                    passed: false,
                    detail: e.to_string(),
                });
                continue;
            }
        };

        let corridors: Vec<Point> = generator.corridors().iter().map(|c| c.location).collect();
        let issues = validate_all(
            generator.cells(),
            generator.room_centers(),
            generator.triangulation(),
            &generator.spanning().tree,
            &corridors,
            config.snap_size,
        );
        let errors: Vec<_> = issues.iter().filter(|e| e.severity == Severity::Error).collect();
        warnings += issues.len() - errors.len();
        if !errors.is_empty() {
            results.push(TestResult {
                name: format!("seed_{}_valid", seed),
                passed: false,
                detail: format!("{} errors, first: [{}] {}", errors.len(), errors[0].category, errors[0].message),
            });
        }

        total_rooms += layout.rooms.len();
        total_corridors += layout.corridors.len();
        if !layout.separation.converged {
            unconverged += 1;
        }
        if verbose {
            println!(
                "  seed {:>4}: {:>3} rooms, {:>3} tree + {:>2} loop edges, {:>4} corridor segments",
                seed,
                layout.rooms.len(),
                layout.tree_edges,
                layout.loop_edges,
                layout.corridors.len()
            );
        }
    }

    results.push(TestResult {
        name: "sweep_produces_rooms".into(),
        passed: seeds == 0 || total_rooms > 0,
        detail: format!(
            "{} rooms, {} corridor segments, {} unconverged separations, {} warnings",
            total_rooms, total_corridors, unconverged, warnings
        ),
    });

    results
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();
    let seeded = with_seed(config, 4242);

    let mut generator = DungeonGenerator::new(WorldProvider::new());
    let first = generator.generate(seeded.clone());
    let first_world = generator.provider().corridors();
    generator.clear();
    let cleared = generator.provider().is_empty();
    let second = generator.generate(seeded.clone());
    let second_world = generator.provider().corridors();

    results.push(TestResult {
        name: "clear_empties_world".into(),
        passed: cleared,
        detail: "every placement destroyed".into(),
    });
    results.push(TestResult {
        name: "regenerate_identical".into(),
        passed: first.is_ok() && first == second && first_world == second_world,
        detail: format!("{} corridor placements", first_world.len()),
    });

    let mut stepped = DungeonGenerator::new(WorldProvider::new());
    let mut steps = 0;
    let stepped_layout = stepped.begin(seeded).map(|_| {
        while stepped.step() != Phase::Done {
            steps += 1;
        }
        stepped.layout()
    });
    results.push(TestResult {
        name: "stepping_matches_generate".into(),
        passed: stepped_layout.ok() == first.ok(),
        detail: format!("{} steps", steps),
    });

    results
}

// ── 5. Policy variants ──────────────────────────────────────────────────

fn validate_policy_variants(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Policy variants ---");
    let mut results = Vec::new();

    for mode in [SeparationMode::Sequential, SeparationMode::Simultaneous] {
        for scaling in [ForceScaling::OwnExtent, ForceScaling::NeighborExtent] {
            let variant = DungeonConfig {
                separation_mode: mode,
                force_scaling: scaling,
                ..with_seed(config, 77)
            };
            let mut generator = DungeonGenerator::new(WorldProvider::new());
            let outcome = generator.generate(variant);
            let (passed, detail) = match outcome {
                Ok(layout) => (
                    true,
                    format!(
                        "{} rooms, separation {} after {} steps",
                        layout.rooms.len(),
                        if layout.separation.converged { "converged" } else { "exhausted" },
                        layout.separation.steps
                    ),
                ),
                Err(e) => (false, e.to_string()),
            };
            results.push(TestResult {
                name: format!("variant_{:?}_{:?}", mode, scaling).to_lowercase(),
                passed,
                detail,
            });
        }
    }

    results
}
