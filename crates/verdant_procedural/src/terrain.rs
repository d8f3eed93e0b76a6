//! # Terrain Window
//!
//! The contiguous run of ground columns currently materialised around the
//! viewport.
//!
//! ```text
//!            evict ←                         → append
//!   ┌────┬────┬────┬────┬────┬────┬────┬────┐
//!   │ lo │    │    │    │    │    │    │ hi │   extend_right(k):
//!   └────┴────┴────┴────┴────┴────┴────┴────┘     k columns at hi + 1..
//!                                                 k columns off lo..
//! ```
//!
//! ## Invariants
//!
//! - Column indices are exactly `lo..=hi`, no gaps, no repeats.
//! - The column count never changes after `create_in_range`.
//! - New columns are placed relative to the farthest column held, never to
//!   the viewport, so no index is skipped or generated twice.

use std::collections::VecDeque;

use tracing::{debug, error, warn};
use verdant_shared::{Layer, ObjectId, ObjectSink, Span, Vec2, WorldObject};

use crate::height::HeightSource;

/// One vertical stack of ground cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainColumn {
    index: i32,
    top: f32,
    cell_size: f32,
    depth: u16,
}

impl TerrainColumn {
    /// Grid index (`x / cell_size`).
    #[inline]
    #[must_use]
    pub const fn index(&self) -> i32 {
        self.index
    }

    /// Left edge in world pixels.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f32 {
        self.index as f32 * self.cell_size
    }

    /// Top of the surface cell, aligned to the cell grid.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    /// Number of cells in the stack.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u16 {
        self.depth
    }

    /// The cells, surface first.
    pub fn cells(&self) -> impl Iterator<Item = WorldObject> + '_ {
        let x = self.x();
        (0..self.depth).map(move |row| {
            WorldObject::new(
                ObjectId::ground(self.index, row),
                Vec2::new(x, self.top + f32::from(row) * self.cell_size),
                Vec2::splat(self.cell_size),
            )
        })
    }
}

/// Sliding window of terrain columns.
pub struct TerrainWindow<H> {
    heights: H,
    cell_size: i32,
    depth: u16,
    columns: VecDeque<TerrainColumn>,
    /// Column count fixed by the last `create_in_range`.
    width: usize,
}

impl<H: HeightSource> TerrainWindow<H> {
    /// Creates an empty window. Call [`TerrainWindow::create_in_range`] first.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive or `depth` is zero.
    #[must_use]
    pub fn new(heights: H, cell_size: i32, depth: u16) -> Self {
        assert!(cell_size > 0, "cell_size must be positive, got {cell_size}");
        assert!(depth > 0, "terrain depth must be at least one cell");
        Self {
            heights,
            cell_size,
            depth,
            columns: VecDeque::new(),
            width: 0,
        }
    }

    /// Materialises the columns covering `[min_x, max_x]`, replacing any
    /// previous state.
    ///
    /// `min_x` is aligned down to the cell grid and the covered width is
    /// rounded up to whole cells, so `(0, 300)` with 30px cells yields ten
    /// columns starting at x = 0. No sink events are emitted: the caller
    /// surfaces the returned columns.
    pub fn create_in_range(&mut self, min_x: i32, max_x: i32) -> &[TerrainColumn] {
        let span = Span::new(min_x, max_x);
        let first = span.min.div_euclid(self.cell_size);
        let covered = span.max - first * self.cell_size;
        let count = ((covered + self.cell_size - 1) / self.cell_size).max(1);

        let built: Vec<TerrainColumn> = (first..first + count)
            .map(|index| self.build_column(index))
            .collect();
        self.columns.clear();
        self.columns.extend(built);
        self.width = self.columns.len();

        debug!(
            first,
            last = first + count - 1,
            columns = self.width,
            "terrain window created"
        );

        self.columns.make_contiguous()
    }

    /// Appends `count` columns on the right and evicts as many on the left.
    ///
    /// # Panics
    ///
    /// Panics if called before [`TerrainWindow::create_in_range`].
    pub fn extend_right(&mut self, count: usize, sink: &mut dyn ObjectSink) {
        self.extend(count, Edge::Right, sink);
    }

    /// Prepends `count` columns on the left and evicts as many on the right.
    ///
    /// # Panics
    ///
    /// Panics if called before [`TerrainWindow::create_in_range`].
    pub fn extend_left(&mut self, count: usize, sink: &mut dyn ObjectSink) {
        self.extend(count, Edge::Left, sink);
    }

    fn extend(&mut self, count: usize, edge: Edge, sink: &mut dyn ObjectSink) {
        assert!(
            !self.columns.is_empty(),
            "terrain window extended before create_in_range"
        );
        if count == 0 {
            return;
        }

        // Grow first so the farthest held column stays the basis even when
        // `count` exceeds the window width.
        for _ in 0..count {
            let column = match edge {
                Edge::Right => self.build_column(self.hi() + 1),
                Edge::Left => self.build_column(self.lo() - 1),
            };
            surface(&column, sink);
            match edge {
                Edge::Right => self.columns.push_back(column),
                Edge::Left => self.columns.push_front(column),
            }
        }

        for _ in 0..count {
            let evicted = match edge {
                Edge::Right => self.columns.pop_front(),
                Edge::Left => self.columns.pop_back(),
            };
            if let Some(column) = evicted {
                retire(&column, sink);
            }
        }

        debug!(
            ?edge,
            count,
            lo = self.lo(),
            hi = self.hi(),
            "terrain window extended"
        );

        self.check_invariants(sink);
    }

    /// Emits an add event for every held cell.
    pub fn surface_all(&self, sink: &mut dyn ObjectSink) {
        for column in &self.columns {
            surface(column, sink);
        }
    }

    /// Emits a remove event for every held cell and empties the window.
    pub fn release(&mut self, sink: &mut dyn ObjectSink) {
        for column in self.columns.drain(..) {
            retire(&column, sink);
        }
        self.width = 0;
    }

    /// Leftmost and rightmost column index, if created.
    #[must_use]
    pub fn index_range(&self) -> Option<(i32, i32)> {
        Some((self.columns.front()?.index, self.columns.back()?.index))
    }

    /// Left edges of the leftmost and rightmost columns, in pixels.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.index_range()
            .map(|(lo, hi)| Span::new(lo * self.cell_size, hi * self.cell_size))
    }

    /// Number of held columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True before `create_in_range`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Held columns, left to right.
    pub fn columns(&self) -> impl Iterator<Item = &TerrainColumn> {
        self.columns.iter()
    }

    /// The held column with grid index `index`.
    #[must_use]
    pub fn column(&self, index: i32) -> Option<&TerrainColumn> {
        let lo = self.columns.front()?.index;
        let offset = usize::try_from(index.checked_sub(lo)?).ok()?;
        self.columns.get(offset)
    }

    /// Total held cells.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.columns.len() * usize::from(self.depth)
    }

    /// Side of a cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Cells per column.
    #[must_use]
    pub const fn depth(&self) -> u16 {
        self.depth
    }

    /// The height source columns are built from.
    #[must_use]
    pub const fn heights(&self) -> &H {
        &self.heights
    }

    /// True if held indices are consecutive and the width is unchanged.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.columns.len() == self.width
            && self
                .columns
                .iter()
                .zip(self.columns.iter().skip(1))
                .all(|(a, b)| b.index == a.index + 1)
    }

    fn check_invariants(&mut self, sink: &mut dyn ObjectSink) {
        let healthy = self.is_contiguous();
        debug_assert!(healthy, "terrain window lost contiguity");
        if !healthy {
            error!(
                held = self.columns.len(),
                expected = self.width,
                "terrain window corrupted, rebuilding from left edge"
            );
            self.repair(sink);
        }
    }

    /// Rebuilds the window from its leftmost held column.
    fn repair(&mut self, sink: &mut dyn ObjectSink) {
        let Some(first) = self.columns.front().map(|c| c.index) else {
            return;
        };
        let width = self.width;
        for column in self.columns.drain(..) {
            retire(&column, sink);
        }
        let rebuilt: Vec<TerrainColumn> = (first..)
            .take(width)
            .map(|index| self.build_column(index))
            .collect();
        for column in rebuilt {
            surface(&column, sink);
            self.columns.push_back(column);
        }
    }

    fn lo(&self) -> i32 {
        self.columns.front().map_or(0, |c| c.index)
    }

    fn hi(&self) -> i32 {
        self.columns.back().map_or(0, |c| c.index)
    }

    fn build_column(&self, index: i32) -> TerrainColumn {
        let cell = self.cell_size as f32;
        TerrainColumn {
            index,
            top: self.heights.column_top(index as f32 * cell, cell),
            cell_size: cell,
            depth: self.depth,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Edge {
    Left,
    Right,
}

fn surface(column: &TerrainColumn, sink: &mut dyn ObjectSink) {
    for cell in column.cells() {
        sink.on_object_added(&cell, Layer::StaticObjects);
    }
}

fn retire(column: &TerrainColumn, sink: &mut dyn ObjectSink) {
    for cell in column.cells() {
        if !sink.on_object_removed(&cell, Layer::StaticObjects) {
            warn!(column = column.index, id = ?cell.id, "sink did not know evicted ground cell");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height::{HeightFn, HeightMap};
    use crate::noise::WorldSeed;
    use verdant_shared::{ObjectKind, ObjectLedger};

    fn window(seed: u64) -> TerrainWindow<HeightMap> {
        TerrainWindow::new(HeightMap::new(WorldSeed::new(seed), 400.0, 210.0), 30, 30)
    }

    fn indices<H: HeightSource>(window: &TerrainWindow<H>) -> Vec<i32> {
        window.columns().map(TerrainColumn::index).collect()
    }

    #[test]
    fn test_create_ten_columns() {
        let mut terrain = window(42);
        let columns = terrain.create_in_range(0, 300);

        assert_eq!(columns.len(), 10);
        for (i, column) in columns.iter().enumerate() {
            assert_eq!(column.index(), i as i32);
            assert_eq!(column.cells().count(), 30);
            assert!(column.top() >= 400.0 - 210.0 - 30.0 && column.top() <= 400.0 + 210.0);
            assert_eq!(column.top() % 30.0, 0.0, "top must sit on the cell grid");
        }
    }

    #[test]
    fn test_create_rounds_up_partial_cells() {
        let mut terrain = window(1);
        assert_eq!(terrain.create_in_range(0, 301).len(), 11);
        assert_eq!(terrain.create_in_range(-300, 1580).len(), 63);
        assert_eq!(terrain.index_range(), Some((-10, 52)));
        assert_eq!(terrain.create_in_range(15, 15).len(), 1);
    }

    #[test]
    fn test_create_replaces_previous_state() {
        let mut terrain = window(1);
        terrain.create_in_range(0, 300);
        terrain.create_in_range(600, 750);
        assert_eq!(indices(&terrain), vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_cells_stack_downward() {
        let mut terrain = window(42);
        terrain.create_in_range(0, 30);
        let column = *terrain.column(0).expect("column 0");
        let cells: Vec<_> = column.cells().collect();

        assert_eq!(cells[0].position, Vec2::new(0.0, column.top()));
        assert_eq!(cells[29].position, Vec2::new(0.0, column.top() + 29.0 * 30.0));
        assert!(cells.iter().all(|c| c.kind() == ObjectKind::Ground));
        assert!(cells.iter().all(|c| c.size == Vec2::splat(30.0)));
    }

    #[test]
    fn test_extend_right_two() {
        let mut terrain = window(42);
        terrain.create_in_range(0, 300);
        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);

        terrain.extend_right(2, &mut ledger);

        assert_eq!(indices(&terrain), (2..12).collect::<Vec<_>>());
        assert_eq!(terrain.column(10).map(TerrainColumn::x), Some(300.0));
        assert_eq!(terrain.column(11).map(TerrainColumn::x), Some(330.0));
        assert!(terrain.column(0).is_none());
        assert!(terrain.column(1).is_none());

        let stats = ledger.stats();
        assert_eq!(stats.added, 12 * 30);
        assert_eq!(stats.removed, 2 * 30);
        assert_eq!(ledger.live(), 10 * 30);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_extend_left_mirrors_right() {
        let mut terrain = window(42);
        terrain.create_in_range(0, 300);
        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);

        terrain.extend_left(3, &mut ledger);

        assert_eq!(indices(&terrain), (-3..7).collect::<Vec<_>>());
        assert!(ledger.get(ObjectId::ground(9, 0)).is_none());
        assert!(ledger.get(ObjectId::ground(-3, 29)).is_some());
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_back_and_forth_stays_contiguous() {
        let mut terrain = window(11);
        terrain.create_in_range(-300, 1000);
        let width = terrain.len();
        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);

        let moves = [5usize, 2, 7, 1, 3, 10, 4, 4, 9, 1];
        for (step, &count) in moves.iter().enumerate() {
            if step % 3 == 0 {
                terrain.extend_left(count, &mut ledger);
            } else {
                terrain.extend_right(count, &mut ledger);
            }
            assert!(terrain.is_contiguous(), "gap after step {step}");
            assert_eq!(terrain.len(), width);
            assert_eq!(ledger.live(), terrain.total_cells());
        }
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_extension_wider_than_window() {
        let mut terrain = window(3);
        terrain.create_in_range(0, 90);
        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);

        terrain.extend_right(5, &mut ledger);

        assert_eq!(indices(&terrain), vec![5, 6, 7]);
        assert_eq!(ledger.live(), 3 * 30);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_regenerated_columns_are_identical() {
        let mut terrain = window(42);
        terrain.create_in_range(0, 300);
        let original = *terrain.column(0).expect("column 0");

        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);
        terrain.extend_right(4, &mut ledger);
        terrain.extend_left(4, &mut ledger);

        assert_eq!(terrain.column(0), Some(&original));
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_flat_source_gives_flat_tops() {
        let mut terrain = TerrainWindow::new(HeightFn(|_x: f32| 415.0), 30, 4);
        let columns = terrain.create_in_range(0, 300);
        assert!(columns.iter().all(|c| c.top() == 390.0));
    }

    #[test]
    fn test_release_empties_window() {
        let mut terrain = window(8);
        terrain.create_in_range(0, 300);
        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);

        terrain.release(&mut ledger);
        assert!(terrain.is_empty());
        assert_eq!(ledger.live(), 0);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_repair_rebuilds_from_left_edge() {
        let mut terrain = window(8);
        terrain.create_in_range(0, 300);
        let mut ledger = ObjectLedger::new();
        terrain.surface_all(&mut ledger);

        // Knock a hole in the window behind its back
        let hole = terrain.columns.remove(4).expect("column 4");
        for cell in hole.cells() {
            ledger.on_object_removed(&cell, Layer::StaticObjects);
        }
        assert!(!terrain.is_contiguous());

        terrain.repair(&mut ledger);

        assert!(terrain.is_contiguous());
        assert_eq!(indices(&terrain), (0..10).collect::<Vec<_>>());
        assert_eq!(ledger.live(), terrain.total_cells());
        assert!(ledger.is_consistent());
    }

    #[test]
    #[should_panic(expected = "before create_in_range")]
    fn test_extend_before_create_panics() {
        let mut terrain = window(1);
        terrain.extend_right(2, &mut ObjectLedger::new());
    }
}
