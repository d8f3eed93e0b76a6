//! # Height Map
//!
//! The single source of ground elevation.
//!
//! Terrain columns and tree anchors both ask the same [`HeightSource`] for
//! the ground at x. If they asked different functions, trees would float or
//! sink; sharing one `Arc<HeightMap>` (or a cache in front of it) rules
//! that out.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use verdant_shared::Span;

use crate::config::WorldConfig;
use crate::noise::{NoiseField, WorldSeed, TERRAIN_NOISE};

/// Anything that can answer "where is the ground at x?".
///
/// Implementations must be pure: the same x always yields the same height.
pub trait HeightSource {
    /// Ground elevation (y, growing downward) at world x.
    fn height_at(&self, x: f32) -> f32;

    /// Ground elevation snapped down to the cell grid.
    fn column_top(&self, x: f32, cell_size: f32) -> f32 {
        (self.height_at(x) / cell_size).floor() * cell_size
    }
}

impl<H: HeightSource + ?Sized> HeightSource for &H {
    fn height_at(&self, x: f32) -> f32 {
        (**self).height_at(x)
    }
}

impl<H: HeightSource + ?Sized> HeightSource for Arc<H> {
    fn height_at(&self, x: f32) -> f32 {
        (**self).height_at(x)
    }
}

/// Adapts a plain function or closure into a [`HeightSource`].
///
/// ```rust,ignore
/// let flat = HeightFn(|_x: f32| 400.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HeightFn<F>(pub F);

impl<F: Fn(f32) -> f32> HeightSource for HeightFn<F> {
    fn height_at(&self, x: f32) -> f32 {
        (self.0)(x)
    }
}

/// Noise-driven ground elevation: `baseline + noise(x, scale)`.
#[derive(Clone)]
pub struct HeightMap {
    field: NoiseField,
    baseline: f32,
    noise_scale: f32,
}

impl HeightMap {
    /// Creates a height map.
    ///
    /// * `baseline` - Elevation the noise oscillates around
    /// * `noise_scale` - Amplitude and base wavelength of the noise, in pixels
    #[must_use]
    pub fn new(seed: WorldSeed, baseline: f32, noise_scale: f32) -> Self {
        Self {
            field: NoiseField::new(seed.derive(TERRAIN_NOISE)),
            baseline,
            noise_scale,
        }
    }

    /// Creates the height map described by a world config.
    ///
    /// The baseline is fixed here, once, from the viewport height.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(
            WorldSeed::new(config.seed),
            config.baseline(),
            config.terrain.noise_scale(),
        )
    }

    /// Baseline elevation.
    #[inline]
    #[must_use]
    pub const fn baseline(&self) -> f32 {
        self.baseline
    }

    /// Largest distance between the ground and the baseline.
    #[inline]
    #[must_use]
    pub const fn noise_bound(&self) -> f32 {
        self.noise_scale
    }
}

impl HeightSource for HeightMap {
    fn height_at(&self, x: f32) -> f32 {
        self.baseline + self.field.noise(x, self.noise_scale)
    }
}

/// Hit/miss counters of a [`CachedHeights`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the memo.
    pub hits: u64,
    /// Lookups that fell through to the inner source.
    pub misses: u64,
    /// Samples currently held.
    pub entries: usize,
}

#[derive(Default)]
struct CacheState {
    samples: HashMap<u32, f32>,
    hits: u64,
    misses: u64,
}

/// Read-through memo in front of a pure height source.
///
/// Samples are keyed by the exact bit pattern of x, so a cached answer is
/// bit-identical to a fresh one. Call [`CachedHeights::retain_span`] as the
/// window moves to keep the memo bounded.
pub struct CachedHeights<H> {
    inner: H,
    state: Mutex<CacheState>,
}

impl<H: HeightSource> CachedHeights<H> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// The wrapped source.
    #[must_use]
    pub const fn inner(&self) -> &H {
        &self.inner
    }

    /// Drops every sample whose x lies outside `span`.
    pub fn retain_span(&self, span: Span) {
        let min = span.min as f32;
        let max = span.max as f32;
        self.state.lock().samples.retain(|bits, _| {
            let x = f32::from_bits(*bits);
            x >= min && x <= max
        });
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.samples.len(),
        }
    }
}

impl<H: HeightSource> HeightSource for CachedHeights<H> {
    fn height_at(&self, x: f32) -> f32 {
        let key = x.to_bits();
        let mut state = self.state.lock();
        if let Some(&height) = state.samples.get(&key) {
            state.hits += 1;
            return height;
        }
        state.misses += 1;
        let height = self.inner.height_at(x);
        state.samples.insert(key, height);
        height
    }
}
