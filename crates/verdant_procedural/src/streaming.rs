//! # World Streaming
//!
//! Turns "the actor moved" into bounded generation work.
//!
//! ```text
//!   tick(Some(Right)) ──→ StreamingDriver ──(7th tick)──→ Pulse { Right, 2 }
//!                                                            │
//!        ┌───────────────────────────────────────────────────┘
//!        ▼
//!   1. terrain.extend_right(2)           append 2, evict 2
//!   2. flora.delete_out_of_range(cam)    drop trees off camera
//!   3. flora.add_in_range(edge..+band)   reveal past the edge
//! ```
//!
//! Everything happens on the caller's thread, synchronously, inside
//! [`WorldStreamer::tick`].

use std::sync::Arc;

use tracing::{debug, info};
use verdant_shared::{ObjectId, ObjectSink, Span};

use crate::config::{PulseConfig, StreamingConfig, WorldConfig};
use crate::error::WorldResult;
use crate::flora::Flora;
use crate::height::{CacheStats, CachedHeights, HeightMap};
use crate::noise::WorldSeed;
use crate::terrain::TerrainWindow;

/// Horizontal direction of movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward negative x.
    Left,
    /// Toward positive x.
    Right,
}

/// Where the host's viewport currently is, in world pixels.
pub trait ViewportProbe {
    /// Raw viewport edges. New trees are revealed just past these.
    fn viewport_bounds(&self) -> Span;

    /// Camera-derived bounds. Trees outside these are evicted.
    fn camera_bounds(&self) -> Span {
        self.viewport_bounds()
    }
}

impl ViewportProbe for Span {
    fn viewport_bounds(&self) -> Span {
        *self
    }
}

/// One unit of generation work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    /// Edge that grows.
    pub direction: Direction,
    /// Columns to append (and evict).
    pub columns: usize,
}

/// Counts movement ticks per direction and emits a [`Pulse`] every
/// `tick_threshold` ticks. The two counters never affect each other.
#[derive(Clone, Debug)]
pub struct StreamingDriver {
    config: StreamingConfig,
    right_ticks: u32,
    left_ticks: u32,
}

impl StreamingDriver {
    /// Creates a driver with both counters at zero.
    #[must_use]
    pub const fn new(config: StreamingConfig) -> Self {
        Self {
            config,
            right_ticks: 0,
            left_ticks: 0,
        }
    }

    /// Records one tick of movement in `direction`.
    pub fn on_move(&mut self, direction: Direction) -> Option<Pulse> {
        let (counter, policy) = match direction {
            Direction::Right => (&mut self.right_ticks, self.config.right),
            Direction::Left => (&mut self.left_ticks, self.config.left),
        };
        *counter += 1;
        if *counter < policy.tick_threshold {
            return None;
        }
        *counter = 0;
        Some(Pulse {
            direction,
            columns: policy.batch,
        })
    }

    /// Ticks accumulated toward the next pulse in `direction`.
    #[must_use]
    pub const fn pending(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Right => self.right_ticks,
            Direction::Left => self.left_ticks,
        }
    }

    /// Policy for `direction`.
    #[must_use]
    pub const fn policy(&self, direction: Direction) -> PulseConfig {
        match direction {
            Direction::Right => self.config.right,
            Direction::Left => self.config.left,
        }
    }
}

/// Height source shared by terrain and flora.
pub type SharedHeights = Arc<CachedHeights<HeightMap>>;

/// What one [`WorldStreamer::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The pulse fired this tick, if any.
    pub pulse: Option<Pulse>,
    /// Trees evicted for leaving the camera.
    pub trees_evicted: usize,
    /// Trees revealed past the moving edge.
    pub trees_revealed: usize,
}

/// Snapshot of the streamer's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamStats {
    /// Ticks processed.
    pub ticks: u64,
    /// Pulses fired.
    pub pulses: u64,
    /// Terrain columns held.
    pub columns: usize,
    /// Ground cells held.
    pub ground_cells: usize,
    /// Left edges of the outermost columns.
    pub terrain_span: Option<Span>,
    /// Trees held.
    pub trees: usize,
    /// Trunk, leaf and fruit objects held.
    pub tree_parts: usize,
    /// Height memo counters.
    pub heights: CacheStats,
}

/// Owns the terrain window, the vegetation field and the pulse driver, and
/// keeps them in step with the viewport.
pub struct WorldStreamer {
    config: WorldConfig,
    heights: SharedHeights,
    terrain: TerrainWindow<SharedHeights>,
    flora: Flora<SharedHeights>,
    driver: StreamingDriver,
    ticks: u64,
    pulses: u64,
}

impl WorldStreamer {
    /// Validates `config` and builds an empty streamer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WorldError::InvalidConfig`] if `config` fails
    /// validation.
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        config.validate()?;

        let heights: SharedHeights = Arc::new(CachedHeights::new(HeightMap::from_config(&config)));
        let terrain = TerrainWindow::new(
            Arc::clone(&heights),
            config.terrain.cell_size,
            config.terrain.depth,
        );
        let flora = Flora::new(
            Arc::clone(&heights),
            WorldSeed::new(config.seed),
            &config.flora,
            config.terrain.cell_size,
        );

        Ok(Self {
            driver: StreamingDriver::new(config.streaming),
            config,
            heights,
            terrain,
            flora,
            ticks: 0,
            pulses: 0,
        })
    }

    /// Generates the initial world around a viewport starting at x = 0 and
    /// hands every object to `sink`.
    ///
    /// Terrain covers `[-margin, width + margin]`; trees are placed densely
    /// over `[0, width]`. Calling it again rebuilds from scratch.
    pub fn bootstrap(&mut self, viewport_width: i32, sink: &mut dyn ObjectSink) {
        self.terrain.release(sink);
        self.flora.release(sink);

        let margin = self.config.terrain.margin();
        self.terrain.create_in_range(-margin, viewport_width + margin);
        self.terrain.surface_all(sink);

        for tree in self.flora.create_in_range(0, viewport_width) {
            tree.surface(sink);
        }

        info!(
            seed = self.config.seed,
            viewport_width,
            columns = self.terrain.len(),
            trees = self.flora.len(),
            "world bootstrapped"
        );
    }

    /// Advances one frame.
    ///
    /// `direction` is the actor's horizontal movement this frame, if any.
    ///
    /// # Panics
    ///
    /// Panics if called before [`WorldStreamer::bootstrap`].
    pub fn tick(
        &mut self,
        direction: Option<Direction>,
        probe: &impl ViewportProbe,
        sink: &mut dyn ObjectSink,
    ) -> TickReport {
        assert!(!self.terrain.is_empty(), "world ticked before bootstrap");
        self.ticks += 1;

        let Some(pulse) = direction.and_then(|d| self.driver.on_move(d)) else {
            return TickReport::default();
        };
        self.pulses += 1;

        match pulse.direction {
            Direction::Right => self.terrain.extend_right(pulse.columns, sink),
            Direction::Left => self.terrain.extend_left(pulse.columns, sink),
        }

        let camera = probe.camera_bounds();
        let trees_evicted = self.flora.delete_out_of_range(camera.min, camera.max, sink);

        let view = probe.viewport_bounds();
        let band = self.config.flora.reveal_band;
        let (min_x, max_x) = match pulse.direction {
            Direction::Right => (view.max, view.max + band),
            Direction::Left => (view.min - band, view.min),
        };
        let trees_revealed = self.flora.add_in_range_into(min_x, max_x, sink);

        if let Some(span) = self.terrain.span() {
            self.heights.retain_span(span.widen(self.config.terrain.margin()));
        }

        debug!(
            pulse = self.pulses,
            direction = ?pulse.direction,
            columns = pulse.columns,
            trees_evicted,
            trees_revealed,
            "pulse applied"
        );

        TickReport {
            pulse: Some(pulse),
            trees_evicted,
            trees_revealed,
        }
    }

    /// Marks the fruit `id` eaten at `now` (seconds, caller clock).
    pub fn eat_fruit(&mut self, id: ObjectId, now: f64) -> bool {
        self.flora.eat_fruit(id, now)
    }

    /// Ripens every fruit whose delay has passed by `now`.
    pub fn respawn_fruit(&mut self, now: f64) -> usize {
        self.flora.respawn_fruit(now)
    }

    /// Withdraws every object from `sink` and empties the world.
    pub fn release(&mut self, sink: &mut dyn ObjectSink) {
        self.terrain.release(sink);
        self.flora.release(sink);
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            ticks: self.ticks,
            pulses: self.pulses,
            columns: self.terrain.len(),
            ground_cells: self.terrain.total_cells(),
            terrain_span: self.terrain.span(),
            trees: self.flora.len(),
            tree_parts: self.flora.part_count(),
            heights: self.heights.stats(),
        }
    }

    /// The configuration in force.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The terrain window.
    #[must_use]
    pub const fn terrain(&self) -> &TerrainWindow<SharedHeights> {
        &self.terrain
    }

    /// The vegetation field.
    #[must_use]
    pub const fn flora(&self) -> &Flora<SharedHeights> {
        &self.flora
    }

    /// The shared height source.
    #[must_use]
    pub const fn heights(&self) -> &SharedHeights {
        &self.heights
    }

    /// The pulse driver.
    #[must_use]
    pub const fn driver(&self) -> &StreamingDriver {
        &self.driver
    }
}
