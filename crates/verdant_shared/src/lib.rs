//! # Verdant Shared
//!
//! Types that cross the boundary between the world core and its host.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a renderer, a physics engine or a
//! windowing library. The host implements [`ObjectSink`] and receives
//! [`WorldObject`] handles; it never reaches into the core's storage.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;
pub mod objects;

pub use math::{Span, Vec2};
pub use objects::{
    Layer, LedgerStats, NullSink, ObjectId, ObjectKind, ObjectLedger, ObjectSink, WorldObject,
};
