//! # Vegetation Field
//!
//! Trees keyed by anchor x. Whether a tree stands at x is decided by one
//! Bernoulli trial on an RNG seeded from `(world seed, x)` alone:
//!
//! ```text
//! x ──→ seed.mix(x) ──→ ChaCha8Rng ──→ u ∈ [0, 1)   tree iff u < chance
//!                                  └─→ trunk height, leaves, fruit
//! ```
//!
//! Consequences:
//!
//! - The same range queried twice with the same chance yields the same
//!   anchors, whatever happened in between.
//! - A tree evicted and later regenerated is identical.
//! - Because both passes compare the same `u`, the anchors of the dense
//!   pass are a subset of the anchors of the sparse (reveal) pass.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};
use verdant_shared::{ObjectId, ObjectKind, ObjectSink, Span};

use crate::config::FloraConfig;
use crate::height::HeightSource;
use crate::noise::WorldSeed;
use crate::tree::{Tree, TreeShape};

/// Purpose tag for the tree placement sub-seed.
const TREE_PLACEMENT: u64 = 0x7ee5_0001;

/// Trees currently held, keyed by anchor.
pub struct Flora<H> {
    heights: H,
    placement: WorldSeed,
    shape: TreeShape,
    dense_chance: f64,
    sparse_chance: f64,
    fruit_respawn_secs: f64,
    trees: BTreeMap<i32, Tree>,
}

impl<H: HeightSource> Flora<H> {
    /// Creates an empty field.
    ///
    /// `heights` must be the same source the terrain is built from, or
    /// trees will not stand on the ground.
    #[must_use]
    pub fn new(heights: H, seed: WorldSeed, config: &FloraConfig, cell_size: i32) -> Self {
        Self {
            heights,
            placement: seed.derive(TREE_PLACEMENT),
            shape: TreeShape::from_config(config, cell_size),
            dense_chance: config.dense_chance,
            sparse_chance: config.sparse_chance,
            fruit_respawn_secs: config.fruit_respawn_secs,
            trees: BTreeMap::new(),
        }
    }

    /// Places trees over `[min_x, max_x]` with the dense chance.
    ///
    /// Anchors already held are left alone. Returns the trees created by
    /// this call; no sink events are emitted.
    pub fn create_in_range(&mut self, min_x: i32, max_x: i32) -> Vec<&Tree> {
        let created = self.place(Span::new(min_x, max_x), self.dense_chance);
        debug!(min_x, max_x, created = created.len(), held = self.trees.len(), "flora created");
        created.iter().filter_map(|anchor| self.trees.get(anchor)).collect()
    }

    /// Places trees over `[min_x, max_x]` with the sparse chance, calling
    /// `on_create` for each new tree. Returns how many were created.
    pub fn add_in_range(&mut self, min_x: i32, max_x: i32, mut on_create: impl FnMut(&Tree)) -> usize {
        let created = self.place(Span::new(min_x, max_x), self.sparse_chance);
        for anchor in &created {
            if let Some(tree) = self.trees.get(anchor) {
                on_create(tree);
            }
        }
        if !created.is_empty() {
            debug!(min_x, max_x, created = created.len(), "flora revealed");
        }
        created.len()
    }

    /// [`Flora::add_in_range`] that hands every part of every new tree to
    /// `sink`.
    pub fn add_in_range_into(&mut self, min_x: i32, max_x: i32, sink: &mut dyn ObjectSink) -> usize {
        self.add_in_range(min_x, max_x, |tree| tree.surface(sink))
    }

    /// Evicts every tree whose anchor lies outside `[min_x, max_x]`.
    ///
    /// For each evicted tree one remove event is emitted per trunk cell,
    /// per present leaf and per present fruit. Returns the number of trees
    /// evicted.
    pub fn delete_out_of_range(&mut self, min_x: i32, max_x: i32, sink: &mut dyn ObjectSink) -> usize {
        let keep = Span::new(min_x, max_x);
        let doomed: Vec<i32> = self
            .trees
            .keys()
            .copied()
            .filter(|anchor| !keep.contains(*anchor))
            .collect();

        for anchor in &doomed {
            if let Some(tree) = self.trees.remove(anchor) {
                trace!(anchor, parts = tree.part_count(), "tree evicted");
                tree.retire(sink);
            }
        }

        if !doomed.is_empty() {
            debug!(min_x, max_x, evicted = doomed.len(), held = self.trees.len(), "flora evicted");
        }
        doomed.len()
    }

    /// Hands every part of every held tree to `sink`.
    pub fn surface_all(&self, sink: &mut dyn ObjectSink) {
        for tree in self.trees.values() {
            tree.surface(sink);
        }
    }

    /// Withdraws every held tree from `sink` and empties the field.
    pub fn release(&mut self, sink: &mut dyn ObjectSink) {
        for tree in std::mem::take(&mut self.trees).into_values() {
            tree.retire(sink);
        }
    }

    /// Marks the fruit `id` eaten at `now`.
    ///
    /// Returns false unless `id` names a held, ripe fruit.
    pub fn eat_fruit(&mut self, id: ObjectId, now: f64) -> bool {
        if id.kind() != ObjectKind::Fruit {
            return false;
        }
        let delay = self.fruit_respawn_secs;
        let eaten = self
            .trees
            .get_mut(&id.key())
            .and_then(|tree| tree.fruit_mut(id.slot()))
            .is_some_and(|fruit| fruit.eat(now, delay));
        if eaten {
            trace!(anchor = id.key(), slot = id.slot(), now, "fruit eaten");
        }
        eaten
    }

    /// Ripens every eaten fruit whose delay has passed by `now`.
    /// Returns how many ripened.
    pub fn respawn_fruit(&mut self, now: f64) -> usize {
        self.trees
            .values_mut()
            .flat_map(|tree| tree.fruit_iter_mut())
            .map(|fruit| fruit.ripen_if_due(now))
            .filter(|ripened| *ripened)
            .count()
    }

    /// Number of held trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// True if no tree is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Held anchors, ascending.
    pub fn anchors(&self) -> impl Iterator<Item = i32> + '_ {
        self.trees.keys().copied()
    }

    /// The tree at `anchor`.
    #[must_use]
    pub fn tree(&self, anchor: i32) -> Option<&Tree> {
        self.trees.get(&anchor)
    }

    /// Held trees, by ascending anchor.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.values()
    }

    /// Total parts across held trees.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.trees.values().map(Tree::part_count).sum()
    }

    /// Runs the keyed trial over `span` and grows a tree at every success
    /// not already held. Returns the new anchors.
    fn place(&mut self, span: Span, chance: f64) -> Vec<i32> {
        let mut created = Vec::new();
        for anchor in span.min..=span.max {
            if self.trees.contains_key(&anchor) {
                continue;
            }
            let mut rng = ChaCha8Rng::seed_from_u64(self.placement.mix(i64::from(anchor)));
            if rng.gen::<f64>() >= chance {
                continue;
            }
            let ground = self.heights.height_at(anchor as f32);
            let tree = Tree::grow(anchor, ground, &mut rng, &self.shape);
            trace!(anchor, ground, trunk = tree.trunk_height(), "tree grown");
            let previous = self.trees.insert(anchor, tree);
            debug_assert!(previous.is_none(), "tree placed twice at {anchor}");
            created.push(anchor);
        }
        created
    }
}
