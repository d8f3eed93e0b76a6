//! # Headless Walk Simulation
//!
//! An actor walking under a following camera, with the world streamed into
//! an [`ObjectLedger`] instead of a scene. Used by the `walk_sim` binary
//! and by soak tests.
//!
//! The camera is paced to the pulse policy: each direction moves
//! `batch * cell_size / tick_threshold` pixels per tick, which is exactly
//! the rate at which the terrain window slides.

use tracing::warn;
use verdant_procedural::{Direction, ViewportProbe, WorldConfig, WorldResult, WorldStreamer};
use verdant_shared::{ObjectId, ObjectLedger, Span};

/// Horizontal reach of the actor when grazing fruit, in pixels.
const GRAZE_REACH: f32 = 15.0;

/// A camera that moves at the pace the terrain window can follow.
#[derive(Clone, Copy, Debug)]
pub struct PacedCamera {
    left: f64,
    width: i32,
    right_speed: f64,
    left_speed: f64,
}

impl PacedCamera {
    /// Camera over `[0, viewport.width]` paced to `config.streaming`.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        let cell = f64::from(config.terrain.cell_size);
        let pace = |batch: usize, threshold: u32| batch as f64 * cell / f64::from(threshold);
        Self {
            left: 0.0,
            width: config.viewport.width as i32,
            right_speed: pace(config.streaming.right.batch, config.streaming.right.tick_threshold),
            left_speed: pace(config.streaming.left.batch, config.streaming.left.tick_threshold),
        }
    }

    /// Moves one tick's worth in `direction`.
    pub fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Right => self.left += self.right_speed,
            Direction::Left => self.left -= self.left_speed,
        }
    }

    /// World x of the viewport centre, where the actor stands.
    #[must_use]
    pub fn actor_x(&self) -> f32 {
        (self.left + f64::from(self.width) / 2.0) as f32
    }

    /// Viewport width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }
}

impl ViewportProbe for PacedCamera {
    fn viewport_bounds(&self) -> Span {
        Span::from_left(self.left.floor() as i32, self.width)
    }
}

/// One segment of a scripted walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    /// Move for `ticks` frames.
    Walk {
        /// Heading.
        direction: Direction,
        /// Frames to walk.
        ticks: u32,
    },
    /// Stand still for `ticks` frames.
    Idle {
        /// Frames to wait.
        ticks: u32,
    },
}

impl Leg {
    /// Right for `ticks`, a ten second rest, left for twice as long, then
    /// right again back to the start.
    #[must_use]
    pub const fn round_trip(ticks: u32) -> [Self; 4] {
        [
            Self::Walk {
                direction: Direction::Right,
                ticks,
            },
            Self::Idle { ticks: 600 },
            Self::Walk {
                direction: Direction::Left,
                ticks: ticks.saturating_mul(2),
            },
            Self::Walk {
                direction: Direction::Right,
                ticks,
            },
        ]
    }
}

/// Running totals of a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Frames simulated.
    pub ticks: u64,
    /// Generation pulses fired.
    pub pulses: u64,
    /// Trees evicted off camera.
    pub trees_evicted: u64,
    /// Trees revealed past the edge.
    pub trees_revealed: u64,
    /// Fruit the actor ate.
    pub fruit_eaten: u64,
    /// Fruit that grew back.
    pub fruit_ripened: u64,
    /// Most objects alive at once.
    pub peak_live: usize,
    /// Frames where the ground did not span the viewport.
    pub void_frames: u64,
}

/// A world, a camera and a ledger, advanced frame by frame.
pub struct WalkSim {
    world: WorldStreamer,
    camera: PacedCamera,
    ledger: ObjectLedger,
    clock: f64,
    frame_secs: f64,
    summary: WalkSummary,
}

impl WalkSim {
    /// Builds and bootstraps a world at 60 frames per second.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is invalid.
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        let camera = PacedCamera::new(&config);
        let mut world = WorldStreamer::new(config)?;
        let mut ledger = ObjectLedger::new();
        world.bootstrap(camera.width(), &mut ledger);

        Ok(Self {
            summary: WalkSummary {
                peak_live: ledger.live(),
                ..WalkSummary::default()
            },
            world,
            camera,
            ledger,
            clock: 0.0,
            frame_secs: 1.0 / 60.0,
        })
    }

    /// Plays `legs` in order and returns the totals so far.
    pub fn run(&mut self, legs: &[Leg]) -> WalkSummary {
        for leg in legs {
            let (direction, ticks) = match *leg {
                Leg::Walk { direction, ticks } => (Some(direction), ticks),
                Leg::Idle { ticks } => (None, ticks),
            };
            for _ in 0..ticks {
                self.frame(direction);
            }
        }
        self.summary
    }

    /// Advances one frame.
    pub fn frame(&mut self, direction: Option<Direction>) {
        if let Some(direction) = direction {
            self.camera.step(direction);
        }

        let report = self.world.tick(direction, &self.camera, &mut self.ledger);
        self.clock += self.frame_secs;

        let summary = &mut self.summary;
        summary.ticks += 1;
        if report.pulse.is_some() {
            summary.pulses += 1;
        }
        summary.trees_evicted += report.trees_evicted as u64;
        summary.trees_revealed += report.trees_revealed as u64;
        summary.fruit_ripened += self.world.respawn_fruit(self.clock) as u64;

        for id in self.fruit_in_reach() {
            if self.world.eat_fruit(id, self.clock) {
                self.summary.fruit_eaten += 1;
            }
        }

        if !self.ground_spans_view() {
            self.summary.void_frames += 1;
            warn!(tick = self.summary.ticks, "viewport left the terrain window");
        }
        self.summary.peak_live = self.summary.peak_live.max(self.ledger.live());
    }

    fn fruit_in_reach(&self) -> Vec<ObjectId> {
        let actor = self.camera.actor_x();
        self.world
            .flora()
            .trees()
            .flat_map(|tree| tree.fruit())
            .filter(|fruit| fruit.is_ripe() && (fruit.object().position.x - actor).abs() <= GRAZE_REACH)
            .map(|fruit| fruit.object().id)
            .collect()
    }

    fn ground_spans_view(&self) -> bool {
        let Some(ground) = self.world.terrain().span() else {
            return false;
        };
        let view = self.camera.viewport_bounds();
        ground.min <= view.min && view.max <= ground.max + self.world.config().terrain.cell_size
    }

    /// Totals so far.
    #[must_use]
    pub const fn summary(&self) -> WalkSummary {
        self.summary
    }

    /// The streamed world.
    #[must_use]
    pub const fn world(&self) -> &WorldStreamer {
        &self.world
    }

    /// Every object the world has handed out and not taken back.
    #[must_use]
    pub const fn ledger(&self) -> &ObjectLedger {
        &self.ledger
    }

    /// The camera.
    #[must_use]
    pub const fn camera(&self) -> &PacedCamera {
        &self.camera
    }

    /// Seconds of simulated time.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_procedural::FloraConfig;

    #[test]
    fn test_paced_camera_matches_window() {
        let mut sim = WalkSim::new(WorldConfig::default()).expect("valid");
        let summary = sim.run(&[
            Leg::Walk {
                direction: Direction::Right,
                ticks: 5_000,
            },
            Leg::Idle { ticks: 100 },
            Leg::Walk {
                direction: Direction::Left,
                ticks: 8_000,
            },
        ]);

        assert_eq!(summary.ticks, 13_100);
        assert_eq!(summary.pulses, 714 + 1_142);
        assert_eq!(summary.void_frames, 0);
        assert!(sim.ledger().is_consistent());
        let stats = sim.world().stats();
        assert_eq!(sim.ledger().live(), stats.ground_cells + stats.tree_parts);
    }

    #[test]
    fn test_actor_grazes_and_fruit_grows_back() {
        let config = WorldConfig {
            flora: FloraConfig {
                dense_chance: 0.02,
                fruit_chance: 0.5,
                fruit_respawn_secs: 1.0,
                ..FloraConfig::default()
            },
            ..WorldConfig::default()
        };
        let mut sim = WalkSim::new(config).expect("valid");
        let summary = sim.run(&[Leg::Walk {
            direction: Direction::Right,
            ticks: 2_000,
        }]);

        assert!(summary.fruit_eaten > 0, "actor never reached a fruit");
        assert!(summary.fruit_ripened <= summary.fruit_eaten);
        assert!((sim.clock() - 2_000.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_plan() {
        let legs = Leg::round_trip(u32::MAX);
        assert_eq!(
            legs[2],
            Leg::Walk {
                direction: Direction::Left,
                ticks: u32::MAX,
            }
        );

        let legs = Leg::round_trip(50);
        assert_eq!(legs[1], Leg::Idle { ticks: 600 });
        let mut sim = WalkSim::new(WorldConfig::default()).expect("valid");
        let summary = sim.run(&legs);
        assert_eq!(summary.ticks, 50 + 600 + 100 + 50);
        assert_eq!(summary.void_frames, 0);
    }

    #[test]
    fn test_idle_world_is_static() {
        let mut sim = WalkSim::new(WorldConfig::default()).expect("valid");
        let before = sim.ledger().stats();
        let summary = sim.run(&[Leg::Idle { ticks: 500 }]);
        assert_eq!(summary.pulses, 0);
        assert_eq!(sim.ledger().stats(), before);
    }
}
