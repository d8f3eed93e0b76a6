//! # VERDANT
//!
//! Endless side-scroller world streaming.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           HOST (scene)                           │
//! │        implements ObjectSink + ViewportProbe, calls tick()       │
//! └───────────────▲──────────────────────────────────┬───────────────┘
//!                 │ add / remove                     │ tick(direction)
//! ┌───────────────┴──────────────────────────────────▼───────────────┐
//! │                          WorldStreamer                           │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌───────────────┐  │
//! │  │ StreamingDriver │──>│  TerrainWindow   │   │     Flora     │  │
//! │  │  tick counters  │──>│  sliding columns │   │ keyed trees   │  │
//! │  └─────────────────┘   └────────┬─────────┘   └──────┬────────┘  │
//! │                                 └────── HeightMap ───┘           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `shared`: Geometry and the object sink boundary
//! - `procedural`: Noise, terrain, flora and streaming
//! - `sim`: Headless actor and camera for soak runs

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod sim;

/// Re-export of the shared types.
pub mod shared {
    pub use verdant_shared::*;
}

/// Re-export of the streaming core.
pub mod procedural {
    pub use verdant_procedural::*;
}

pub use sim::{Leg, PacedCamera, WalkSim, WalkSummary};
