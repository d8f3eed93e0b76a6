//! # Walk Simulation
//!
//! Walks an actor right, rests, walks back past the start, and reports
//! what the streamer did along the way.
//!
//! Usage: `walk_sim [CONFIG.toml] [TICKS]`

use std::time::Instant;

use verdant::procedural::WorldConfig;
use verdant::shared::{Layer, ObjectKind};
use verdant::{Leg, WalkSim};

const DEFAULT_TICKS: u32 = 10_000;

fn main() {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match WorldConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ {e}");
                std::process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };
    let ticks = match args.next().map(|t| t.parse::<u32>()) {
        Some(Ok(ticks)) => ticks,
        Some(Err(e)) => {
            eprintln!("✗ TICKS must be a positive integer: {e}");
            std::process::exit(2);
        }
        None => DEFAULT_TICKS,
    };

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                      VERDANT WALK SIMULATION");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();
    println!("  Seed:      {:#x}", config.seed);
    println!("  Viewport:  {} x {}", config.viewport.width, config.viewport.height);
    println!("  Cell:      {}px, {} deep", config.terrain.cell_size, config.terrain.depth);
    println!(
        "  Pulse:     right {}/{}t, left {}/{}t",
        config.streaming.right.batch,
        config.streaming.right.tick_threshold,
        config.streaming.left.batch,
        config.streaming.left.tick_threshold
    );
    println!();

    let mut sim = match WalkSim::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let summary = sim.run(&Leg::round_trip(ticks));
    let elapsed = started.elapsed();

    let ledger = sim.ledger();
    let stats = sim.world().stats();
    let totals = ledger.stats();

    println!("🚶 Walked {} ticks in {:?} ({:.1} µs/tick)", summary.ticks, elapsed,
        elapsed.as_secs_f64() * 1e6 / summary.ticks.max(1) as f64);
    println!("   Pulses:           {}", summary.pulses);
    println!("   Trees revealed:   {}", summary.trees_revealed);
    println!("   Trees evicted:    {}", summary.trees_evicted);
    println!("   Fruit eaten:      {} ({} grew back)", summary.fruit_eaten, summary.fruit_ripened);
    println!();
    println!("📦 Live objects:     {} (peak {})", ledger.live(), summary.peak_live);
    println!("   Ground:           {}", ledger.live_of(ObjectKind::Ground));
    println!("   Trunk:            {}", ledger.live_of(ObjectKind::Trunk));
    println!("   Leaves:           {}", ledger.live_of(ObjectKind::Leaf));
    println!("   Fruit:            {}", ledger.live_of(ObjectKind::Fruit));
    println!("   Static / Back:    {} / {}", ledger.live_in(Layer::StaticObjects), ledger.live_in(Layer::Background));
    println!("   Added / Removed:  {} / {}", totals.added, totals.removed);
    println!();
    println!("🗺️  Window:           {:?} ({} columns)", stats.terrain_span, stats.columns);
    println!("   Height memo:      {} entries, {} hits, {} misses",
        stats.heights.entries, stats.heights.hits, stats.heights.misses);
    println!();

    let balanced = ledger.is_consistent() && ledger.live() == stats.ground_cells + stats.tree_parts;
    if balanced && summary.void_frames == 0 {
        println!("   ✓ Ledger balanced, ground under every frame");
    } else {
        eprintln!(
            "   ✗ Ledger balanced: {balanced}, void frames: {}, duplicate adds: {}, unknown removals: {}",
            summary.void_frames, totals.duplicate_adds, totals.unknown_removals
        );
        std::process::exit(1);
    }
}
