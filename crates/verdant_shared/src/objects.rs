//! # World Objects
//!
//! The handles the core hands to its host, and the sink the host
//! implements to receive them.
//!
//! ```text
//! core creates:            host implements:
//! ┌──────────────┐         ┌─────────────────┐
//! │ WorldObject  │ ──────→ │ impl ObjectSink │
//! └──────────────┘         └─────────────────┘
//! ```
//!
//! Object ids are derived from world coordinates, never from a counter,
//! so regenerating a coordinate after eviction yields the same id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Layer an object belongs to in the host's scene.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// Solid content the actor collides with (ground, trunks, fruit).
    StaticObjects = 0,
    /// Decorative content drawn behind the actor (leaves).
    Background = 1,
}

/// What a world object represents.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// One cell of a terrain column.
    Ground = 0,
    /// One cell of a tree trunk.
    Trunk = 1,
    /// One canopy cell.
    Leaf = 2,
    /// One fruit.
    Fruit = 3,
}

impl ObjectKind {
    /// The layer objects of this kind are placed on.
    #[inline]
    #[must_use]
    pub const fn layer(self) -> Layer {
        match self {
            Self::Leaf => Layer::Background,
            Self::Ground | Self::Trunk | Self::Fruit => Layer::StaticObjects,
        }
    }

    /// Tag string the host can attach to its game object.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Trunk => "wood",
            Self::Leaf => "leaf",
            Self::Fruit => "fruit",
        }
    }
}

/// Stable, coordinate-derived identity of a world object.
///
/// - Ground: `key` is the column index, `slot` the depth row (0 = surface).
/// - Tree parts: `key` is the tree anchor x, `slot` the part index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    kind: ObjectKind,
    key: i32,
    slot: u16,
}

impl ObjectId {
    /// Id of a ground cell.
    #[inline]
    #[must_use]
    pub const fn ground(column: i32, row: u16) -> Self {
        Self { kind: ObjectKind::Ground, key: column, slot: row }
    }

    /// Id of a part of the tree anchored at `anchor`.
    #[inline]
    #[must_use]
    pub const fn tree_part(kind: ObjectKind, anchor: i32, slot: u16) -> Self {
        Self { kind, key: anchor, slot }
    }

    /// Object kind.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> ObjectKind {
        self.kind
    }

    /// Column index (ground) or anchor x (tree parts).
    #[inline]
    #[must_use]
    pub const fn key(self) -> i32 {
        self.key
    }

    /// Row (ground) or part index (tree parts).
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u16 {
        self.slot
    }
}

/// An axis-aligned object handed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Stable identity.
    pub id: ObjectId,
    /// Top-left corner in world pixels.
    pub position: Vec2,
    /// Width and height in world pixels.
    pub size: Vec2,
}

impl WorldObject {
    /// Creates an object.
    #[must_use]
    pub const fn new(id: ObjectId, position: Vec2, size: Vec2) -> Self {
        Self { id, position, size }
    }

    /// Object kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        self.id.kind()
    }

    /// Layer the object belongs on.
    #[inline]
    #[must_use]
    pub const fn layer(&self) -> Layer {
        self.id.kind().layer()
    }
}

/// Receives object lifecycle events from the core.
///
/// Calls are synchronous and happen inside the core's mutation, once per
/// created or evicted object.
pub trait ObjectSink {
    /// A new object entered the world.
    fn on_object_added(&mut self, object: &WorldObject, layer: Layer);

    /// An object left the world. Returns false if the host did not know it.
    fn on_object_removed(&mut self, object: &WorldObject, layer: Layer) -> bool;
}

impl<S: ObjectSink + ?Sized> ObjectSink for &mut S {
    fn on_object_added(&mut self, object: &WorldObject, layer: Layer) {
        (**self).on_object_added(object, layer);
    }

    fn on_object_removed(&mut self, object: &WorldObject, layer: Layer) -> bool {
        (**self).on_object_removed(object, layer)
    }
}

/// Sink that discards everything. Handy for benchmarks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ObjectSink for NullSink {
    fn on_object_added(&mut self, _object: &WorldObject, _layer: Layer) {}

    fn on_object_removed(&mut self, _object: &WorldObject, _layer: Layer) -> bool {
        true
    }
}

/// Counters kept by an [`ObjectLedger`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Total add events.
    pub added: u64,
    /// Total successful remove events.
    pub removed: u64,
    /// Adds for an id that was already live.
    pub duplicate_adds: u64,
    /// Removes for an id that was not live, or live on another layer.
    pub unknown_removals: u64,
}

/// In-memory host that tracks every live object by id.
///
/// Stands in for a scene graph in tests and in the headless simulator.
#[derive(Debug, Default)]
pub struct ObjectLedger {
    live: HashMap<ObjectId, (WorldObject, Layer)>,
    stats: LedgerStats,
}

impl ObjectLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Number of live objects on `layer`.
    #[must_use]
    pub fn live_in(&self, layer: Layer) -> usize {
        self.live.values().filter(|(_, l)| *l == layer).count()
    }

    /// Number of live objects of `kind`.
    #[must_use]
    pub fn live_of(&self, kind: ObjectKind) -> usize {
        self.live.keys().filter(|id| id.kind() == kind).count()
    }

    /// Returns the live object with `id`, if any.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.live.get(&id).map(|(object, _)| object)
    }

    /// Iterates over live objects.
    pub fn objects(&self) -> impl Iterator<Item = &WorldObject> {
        self.live.values().map(|(object, _)| object)
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> LedgerStats {
        self.stats
    }

    /// True if no duplicate add or unknown removal was ever seen.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.stats.duplicate_adds == 0 && self.stats.unknown_removals == 0
    }
}

impl ObjectSink for ObjectLedger {
    fn on_object_added(&mut self, object: &WorldObject, layer: Layer) {
        self.stats.added += 1;
        if self.live.insert(object.id, (*object, layer)).is_some() {
            self.stats.duplicate_adds += 1;
        }
    }

    fn on_object_removed(&mut self, object: &WorldObject, layer: Layer) -> bool {
        let known = self
            .live
            .get(&object.id)
            .is_some_and(|(_, live_layer)| *live_layer == layer);
        if known {
            self.live.remove(&object.id);
            self.stats.removed += 1;
        } else {
            self.stats.unknown_removals += 1;
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(column: i32, row: u16) -> WorldObject {
        WorldObject::new(
            ObjectId::ground(column, row),
            Vec2::new(column as f32 * 30.0, f32::from(row) * 30.0),
            Vec2::splat(30.0),
        )
    }

    #[test]
    fn test_kind_layers() {
        assert_eq!(ObjectKind::Ground.layer(), Layer::StaticObjects);
        assert_eq!(ObjectKind::Trunk.layer(), Layer::StaticObjects);
        assert_eq!(ObjectKind::Fruit.layer(), Layer::StaticObjects);
        assert_eq!(ObjectKind::Leaf.layer(), Layer::Background);
        assert_eq!(ObjectKind::Trunk.tag(), "wood");
    }

    #[test]
    fn test_ids_are_coordinate_derived() {
        let a = ObjectId::tree_part(ObjectKind::Leaf, 120, 7);
        let b = ObjectId::tree_part(ObjectKind::Leaf, 120, 7);
        let c = ObjectId::tree_part(ObjectKind::Fruit, 120, 7);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.key(), 120);
        assert_eq!(a.slot(), 7);
        assert_eq!(ObjectId::ground(-3, 0).kind(), ObjectKind::Ground);
    }

    #[test]
    fn test_ledger_tracks_live_objects() {
        let mut ledger = ObjectLedger::new();
        ledger.on_object_added(&cell(0, 0), Layer::StaticObjects);
        ledger.on_object_added(&cell(0, 1), Layer::StaticObjects);

        assert_eq!(ledger.live(), 2);
        assert_eq!(ledger.live_in(Layer::StaticObjects), 2);
        assert_eq!(ledger.live_in(Layer::Background), 0);
        assert!(ledger.get(ObjectId::ground(0, 1)).is_some());

        assert!(ledger.on_object_removed(&cell(0, 0), Layer::StaticObjects));
        assert_eq!(ledger.live(), 1);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_ledger_flags_duplicates_and_unknown_removals() {
        let mut ledger = ObjectLedger::new();
        ledger.on_object_added(&cell(4, 0), Layer::StaticObjects);
        ledger.on_object_added(&cell(4, 0), Layer::StaticObjects);

        assert!(!ledger.on_object_removed(&cell(9, 0), Layer::StaticObjects));
        assert!(!ledger.on_object_removed(&cell(4, 0), Layer::Background));

        let stats = ledger.stats();
        assert_eq!(stats.duplicate_adds, 1);
        assert_eq!(stats.unknown_removals, 2);
        assert!(!ledger.is_consistent());
    }

    #[test]
    fn test_sink_through_mut_reference() {
        fn feed(mut sink: impl ObjectSink) {
            sink.on_object_added(&cell(1, 0), Layer::StaticObjects);
        }

        let mut ledger = ObjectLedger::new();
        feed(&mut ledger);
        assert_eq!(ledger.live(), 1);
        assert!(NullSink.on_object_removed(&cell(1, 0), Layer::StaticObjects));
    }
}
