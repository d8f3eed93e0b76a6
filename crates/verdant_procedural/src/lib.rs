//! # VERDANT Procedural Generation
//!
//! Deterministic streaming of an endless side-scrolling world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and coordinate always produce the same content
//! 2. **Windowed**: Only a fixed band of columns around the viewport exists
//! 3. **Streamable**: Content can be discarded and regenerated identically
//! 4. **Host-agnostic**: Objects are handed to an [`ObjectSink`], never owned by a scene
//!
//! ## Core Components
//!
//! - `NoiseField`: 1-D gradient noise
//! - `HeightMap`: Ground elevation, shared by terrain and trees
//! - `TerrainWindow`: Sliding run of ground columns
//! - `Flora`: Trees placed by per-coordinate keyed trials
//! - `WorldStreamer`: Turns movement ticks into generation pulses
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_procedural::{Direction, WorldConfig, WorldStreamer};
//! use verdant_shared::{ObjectLedger, Span};
//!
//! let mut world = WorldStreamer::new(WorldConfig::default())?;
//! let mut ledger = ObjectLedger::new();
//! world.bootstrap(1280, &mut ledger);
//!
//! // Actor walking right, camera following
//! world.tick(Some(Direction::Right), &Span::from_left(4, 1280), &mut ledger);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod flora;
pub mod height;
pub mod noise;
pub mod streaming;
pub mod terrain;
pub mod tree;

pub use config::{FloraConfig, PulseConfig, StreamingConfig, TerrainConfig, ViewportConfig, WorldConfig};
pub use error::{WorldError, WorldResult};
pub use flora::Flora;
pub use height::{CacheStats, CachedHeights, HeightFn, HeightMap, HeightSource};
pub use noise::{NoiseField, WorldSeed};
pub use streaming::{
    Direction, Pulse, SharedHeights, StreamStats, StreamingDriver, TickReport, ViewportProbe, WorldStreamer,
};
pub use terrain::{TerrainColumn, TerrainWindow};
pub use tree::{Fruit, FruitState, Tree, TreeShape};

#[doc(no_inline)]
pub use verdant_shared::ObjectSink;
