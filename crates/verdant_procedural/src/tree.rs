//! # Trees
//!
//! A tree is a trunk of wood cells standing on the ground, a square canopy
//! of optional leaf cells centred on the trunk top, and a fruit grid of the
//! same shape overlaid on the canopy.
//!
//! ```text
//!   ┌──┬──┬──┬──┬──┬──┬──┬──┐
//!   │L │  │L │L │  │L │L │  │   canopy: size × size slots,
//!   ├──┼──┼──┼──┼──┼──┼──┼──┤   each a leaf with leaf_chance
//!   │  │L │  │ F│L │  │  │L │   and, independently, a fruit
//!   ├──┼──┼──┼──┼──┼──┼──┼──┤   with fruit_chance
//!   ┆           ▲           ┆
//!             top
//!          ┌──┐│
//!          │W ││                trunk: min_trunk + 0..range cells,
//!          │W ││                one cell left of the anchor
//!          │W ││
//!   ═══════╧══╧╧════════════   ground at anchor x
//! ```
//!
//! Every random choice comes from the RNG handed to [`Tree::grow`]. The
//! vegetation field keys that RNG by the anchor, so a tree regrown after
//! eviction is identical part for part.

use rand::Rng;
use tracing::warn;
use verdant_shared::{Layer, ObjectId, ObjectKind, ObjectSink, Vec2, WorldObject};

use crate::config::FloraConfig;

/// Shape parameters shared by every tree of a field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeShape {
    /// Side of a trunk or leaf cell, in pixels.
    pub cell_size: f32,
    /// Shortest trunk, in cells.
    pub min_trunk_cells: u32,
    /// Number of distinct trunk heights.
    pub trunk_range: u32,
    /// Side of the canopy and fruit grids, in cells.
    pub canopy_size: u16,
    /// Per-slot leaf chance.
    pub leaf_chance: f64,
    /// Per-slot fruit chance.
    pub fruit_chance: f64,
    /// Side of one fruit, in pixels.
    pub fruit_size: f32,
}

impl TreeShape {
    /// Widest canopy whose slots all fit in a `u16`.
    pub const MAX_CANOPY: u16 = 255;

    /// Shape described by a flora config on a `cell_size` grid.
    #[must_use]
    pub fn from_config(config: &FloraConfig, cell_size: i32) -> Self {
        Self {
            cell_size: cell_size as f32,
            min_trunk_cells: config.min_trunk_cells,
            trunk_range: config.trunk_range.max(1),
            canopy_size: config.canopy_size,
            leaf_chance: config.leaf_chance,
            fruit_chance: config.fruit_chance,
            fruit_size: config.fruit_size,
        }
    }
}

impl Default for TreeShape {
    fn default() -> Self {
        Self::from_config(&FloraConfig::default(), 30)
    }
}

/// Whether a fruit can be eaten right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FruitState {
    /// Hanging and edible.
    Ripe,
    /// Eaten; grows back at `respawn_at` (caller clock, seconds).
    Eaten {
        /// Time at which the fruit is ripe again.
        respawn_at: f64,
    },
}

/// One fruit of a tree.
///
/// An eaten fruit keeps its object registered with the sink; only its
/// state changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fruit {
    object: WorldObject,
    state: FruitState,
}

impl Fruit {
    /// The fruit's world object.
    #[must_use]
    pub const fn object(&self) -> &WorldObject {
        &self.object
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FruitState {
        self.state
    }

    /// True if the fruit can be eaten.
    #[must_use]
    pub const fn is_ripe(&self) -> bool {
        matches!(self.state, FruitState::Ripe)
    }

    /// Marks the fruit eaten. Returns false if it already was.
    pub fn eat(&mut self, now: f64, delay: f64) -> bool {
        if !self.is_ripe() {
            return false;
        }
        self.state = FruitState::Eaten {
            respawn_at: now + delay,
        };
        true
    }

    /// Ripens the fruit if its delay has passed. Returns true if it did.
    pub fn ripen_if_due(&mut self, now: f64) -> bool {
        match self.state {
            FruitState::Eaten { respawn_at } if now >= respawn_at => {
                self.state = FruitState::Ripe;
                true
            }
            _ => false,
        }
    }
}

/// A fully grown tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    anchor: i32,
    ground: f32,
    top: Vec2,
    trunk: Vec<WorldObject>,
    leaves: Vec<WorldObject>,
    fruit: Vec<Fruit>,
}

impl Tree {
    /// Grows a tree rooted at `(anchor, ground)`.
    ///
    /// Draws, in order: the trunk height, one leaf trial per canopy slot in
    /// row-major order, then one fruit trial per slot.
    ///
    /// # Panics
    ///
    /// Panics if `shape.canopy_size` exceeds [`TreeShape::MAX_CANOPY`], as
    /// slot numbers would no longer fit in an [`ObjectId`].
    pub fn grow(anchor: i32, ground: f32, rng: &mut impl Rng, shape: &TreeShape) -> Self {
        assert!(
            shape.canopy_size <= TreeShape::MAX_CANOPY,
            "canopy of {} cells per side exceeds {}",
            shape.canopy_size,
            TreeShape::MAX_CANOPY
        );
        let cell = shape.cell_size;
        let x = anchor as f32;
        let height = shape.min_trunk_cells + rng.gen_range(0..shape.trunk_range.max(1));

        let trunk = (0..height)
            .map(|i| {
                WorldObject::new(
                    ObjectId::tree_part(ObjectKind::Trunk, anchor, i as u16),
                    Vec2::new(x - cell, ground - cell - i as f32 * cell),
                    Vec2::splat(cell),
                )
            })
            .collect();

        let top = Vec2::new(x, ground - height as f32 * cell);
        let half = f32::from(shape.canopy_size) / 2.0 * cell;
        let origin = top - Vec2::splat(half);
        let side = shape.canopy_size;
        let slot_position = |slot: u16| {
            let (row, col) = (slot / side, slot % side);
            origin + Vec2::new(f32::from(col) * cell, f32::from(row) * cell)
        };

        let leaves = (0..side * side)
            .filter(|_| rng.gen::<f64>() < shape.leaf_chance)
            .map(|slot| {
                WorldObject::new(
                    ObjectId::tree_part(ObjectKind::Leaf, anchor, slot),
                    slot_position(slot),
                    Vec2::splat(cell),
                )
            })
            .collect();

        let fruit = (0..side * side)
            .filter(|_| rng.gen::<f64>() < shape.fruit_chance)
            .map(|slot| Fruit {
                object: WorldObject::new(
                    ObjectId::tree_part(ObjectKind::Fruit, anchor, slot),
                    slot_position(slot),
                    Vec2::splat(shape.fruit_size),
                ),
                state: FruitState::Ripe,
            })
            .collect();

        Self {
            anchor,
            ground,
            top,
            trunk,
            leaves,
            fruit,
        }
    }

    /// World x the tree is keyed by.
    #[must_use]
    pub const fn anchor(&self) -> i32 {
        self.anchor
    }

    /// Ground elevation the trunk stands on.
    #[must_use]
    pub const fn ground(&self) -> f32 {
        self.ground
    }

    /// Centre of the canopy: the top of the trunk at the anchor x.
    #[must_use]
    pub const fn top(&self) -> Vec2 {
        self.top
    }

    /// Trunk height in cells.
    #[must_use]
    pub fn trunk_height(&self) -> usize {
        self.trunk.len()
    }

    /// Trunk cells, bottom first.
    #[must_use]
    pub fn trunk(&self) -> &[WorldObject] {
        &self.trunk
    }

    /// Present leaves.
    #[must_use]
    pub fn leaves(&self) -> &[WorldObject] {
        &self.leaves
    }

    /// Present fruit.
    #[must_use]
    pub fn fruit(&self) -> &[Fruit] {
        &self.fruit
    }

    /// The fruit in canopy slot `slot`.
    pub fn fruit_mut(&mut self, slot: u16) -> Option<&mut Fruit> {
        self.fruit.iter_mut().find(|f| f.object.id.slot() == slot)
    }

    /// Present fruit, mutably.
    pub fn fruit_iter_mut(&mut self) -> impl Iterator<Item = &mut Fruit> {
        self.fruit.iter_mut()
    }

    /// Every present part with the layer it belongs to.
    pub fn parts(&self) -> impl Iterator<Item = (WorldObject, Layer)> + '_ {
        self.trunk
            .iter()
            .chain(&self.leaves)
            .chain(self.fruit.iter().map(|f| &f.object))
            .map(|object| (*object, object.layer()))
    }

    /// Number of present parts.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.trunk.len() + self.leaves.len() + self.fruit.len()
    }

    /// Hands every part to the sink.
    pub fn surface(&self, sink: &mut dyn ObjectSink) {
        for (object, layer) in self.parts() {
            sink.on_object_added(&object, layer);
        }
    }

    /// Withdraws every part from the sink.
    pub fn retire(&self, sink: &mut dyn ObjectSink) {
        for (object, layer) in self.parts() {
            if !sink.on_object_removed(&object, layer) {
                warn!(anchor = self.anchor, id = ?object.id, "sink did not know evicted tree part");
            }
        }
    }
}
