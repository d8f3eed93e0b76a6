//! # World Configuration
//!
//! Every tunable of the streamer, loaded once at startup from TOML.
//! Missing fields fall back to the defaults below, so a config file only
//! needs to name what it changes:
//!
//! ```toml
//! seed = 7
//!
//! [flora]
//! sparse_chance = 0.08
//!
//! [streaming.left]
//! batch = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

/// Complete world configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. Same seed, same world.
    pub seed: u64,
    /// Viewport dimensions.
    pub viewport: ViewportConfig,
    /// Terrain window parameters.
    pub terrain: TerrainConfig,
    /// Vegetation parameters.
    pub flora: FloraConfig,
    /// Movement-to-generation policy.
    pub streaming: StreamingConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_CAFE,
            viewport: ViewportConfig::default(),
            terrain: TerrainConfig::default(),
            flora: FloraConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

/// Viewport dimensions in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width of the visible region.
    pub width: f32,
    /// Height of the visible region; the terrain baseline derives from it.
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Terrain parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Side of one ground cell, in pixels.
    pub cell_size: i32,
    /// Cells per column.
    pub depth: u16,
    /// Noise amplitude in cells (`noise scale = cell_size * noise_factor`).
    pub noise_factor: f32,
    /// Baseline elevation as a fraction of viewport height.
    pub baseline_fraction: f32,
    /// Extra columns materialised on each side of the initial viewport.
    pub margin_cells: i32,
}

impl TerrainConfig {
    /// Noise amplitude in pixels.
    #[must_use]
    pub fn noise_scale(&self) -> f32 {
        self.cell_size as f32 * self.noise_factor
    }

    /// Initial margin in pixels.
    #[must_use]
    pub const fn margin(&self) -> i32 {
        self.margin_cells * self.cell_size
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            cell_size: 30,
            depth: 30,
            noise_factor: 7.0,
            baseline_fraction: 2.0 / 3.0,
            margin_cells: 10,
        }
    }
}

/// Vegetation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloraConfig {
    /// Per-x tree chance for the initial dense pass.
    pub dense_chance: f64,
    /// Per-x tree chance for incremental reveal at the moving edge.
    pub sparse_chance: f64,
    /// Per-slot chance of a leaf in the canopy grid.
    pub leaf_chance: f64,
    /// Per-slot chance of a fruit in the fruit grid.
    pub fruit_chance: f64,
    /// Shortest trunk, in cells.
    pub min_trunk_cells: u32,
    /// Number of distinct trunk heights above the minimum.
    pub trunk_range: u32,
    /// Side of the canopy and fruit grids, in cells.
    pub canopy_size: u16,
    /// Side of one fruit, in pixels.
    pub fruit_size: f32,
    /// Seconds an eaten fruit stays gone.
    pub fruit_respawn_secs: f64,
    /// Width of the band past the viewport edge where new trees are revealed.
    pub reveal_band: i32,
}

impl Default for FloraConfig {
    fn default() -> Self {
        Self {
            dense_chance: 0.001,
            sparse_chance: 0.05,
            leaf_chance: 0.6,
            fruit_chance: 0.1,
            min_trunk_cells: 8,
            trunk_range: 3,
            canopy_size: 8,
            fruit_size: 20.0,
            fruit_respawn_secs: 30.0,
            reveal_band: 5,
        }
    }
}

/// Per-direction pulse policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Movement ticks in this direction before one generation pulse.
    pub tick_threshold: u32,
    /// Columns generated (and evicted) per pulse.
    pub batch: usize,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            tick_threshold: 7,
            batch: 2,
        }
    }
}

/// Movement-to-generation policy; the two directions are independent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Policy while moving right.
    pub right: PulseConfig,
    /// Policy while moving left.
    pub left: PulseConfig,
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Parse`] for malformed TOML and
    /// [`WorldError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> WorldResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`WorldConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError::InvalidConfig`] found.
    pub fn validate(&self) -> WorldResult<()> {
        if !is_positive(self.viewport.width) {
            return Err(WorldError::invalid("viewport.width", "must be positive"));
        }
        if !is_positive(self.viewport.height) {
            return Err(WorldError::invalid("viewport.height", "must be positive"));
        }

        let terrain = &self.terrain;
        if terrain.cell_size <= 0 {
            return Err(WorldError::invalid("terrain.cell_size", "must be positive"));
        }
        if terrain.depth == 0 {
            return Err(WorldError::invalid("terrain.depth", "must be at least 1"));
        }
        if !terrain.noise_factor.is_finite() || terrain.noise_factor < 0.0 {
            return Err(WorldError::invalid("terrain.noise_factor", "must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&terrain.baseline_fraction) {
            return Err(WorldError::invalid("terrain.baseline_fraction", "must be within [0, 1]"));
        }
        if terrain.margin_cells < 0 {
            return Err(WorldError::invalid("terrain.margin_cells", "must not be negative"));
        }

        let flora = &self.flora;
        for (field, chance) in [
            ("flora.dense_chance", flora.dense_chance),
            ("flora.sparse_chance", flora.sparse_chance),
            ("flora.leaf_chance", flora.leaf_chance),
            ("flora.fruit_chance", flora.fruit_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(WorldError::invalid(field, format!("{chance} is not a probability")));
            }
        }
        if flora.trunk_range == 0 {
            return Err(WorldError::invalid("flora.trunk_range", "must be at least 1"));
        }
        if flora.canopy_size == 0 || flora.canopy_size > 64 {
            return Err(WorldError::invalid("flora.canopy_size", "must be within [1, 64]"));
        }
        if !is_positive(flora.fruit_size) {
            return Err(WorldError::invalid("flora.fruit_size", "must be positive"));
        }
        if flora.fruit_respawn_secs.is_nan() || flora.fruit_respawn_secs < 0.0 {
            return Err(WorldError::invalid("flora.fruit_respawn_secs", "must not be negative"));
        }
        if flora.reveal_band < 0 {
            return Err(WorldError::invalid("flora.reveal_band", "must not be negative"));
        }

        for (field, pulse) in [
            ("streaming.right", self.streaming.right),
            ("streaming.left", self.streaming.left),
        ] {
            if pulse.tick_threshold == 0 || pulse.batch == 0 {
                return Err(WorldError::invalid(field, "tick_threshold and batch must be at least 1"));
            }
        }

        Ok(())
    }

    /// Terrain baseline in pixels (`viewport.height * baseline_fraction`).
    #[must_use]
    pub fn baseline(&self) -> f32 {
        self.viewport.height * self.terrain.baseline_fraction
    }
}

/// False for NaN.
fn is_positive(value: f32) -> bool {
    value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.terrain.cell_size, 30);
        assert_eq!(config.terrain.margin(), 300);
        assert!((config.terrain.noise_scale() - 210.0).abs() < f32::EPSILON);
        assert!((config.baseline() - 480.0).abs() < 1e-3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            seed = 7

            [flora]
            sparse_chance = 0.08

            [streaming.left]
            batch = 4
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 7);
        assert!((config.flora.sparse_chance - 0.08).abs() < f64::EPSILON);
        assert!((config.flora.dense_chance - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.streaming.left.batch, 4);
        assert_eq!(config.streaming.right.batch, 2);
        assert_eq!(config.streaming.left.tick_threshold, 7);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = WorldConfig::from_toml_str("[flora]\nleaf_chance = 1.5\n").unwrap_err();
        match err {
            WorldError::InvalidConfig { field, .. } => assert_eq!(field, "flora.leaf_chance"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_zero_batch() {
        let err = WorldConfig::from_toml_str("[streaming.right]\nbatch = 0\n").unwrap_err();
        assert!(matches!(err, WorldError::InvalidConfig { field: "streaming.right", .. }));
    }

    #[test]
    fn test_rejects_nan_and_negative_sizes() {
        let mut config = WorldConfig::default();
        config.viewport.width = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidConfig { field: "viewport.width", .. })
        ));

        let mut config = WorldConfig::default();
        config.flora.fruit_size = 0.0;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidConfig { field: "flora.fruit_size", .. })
        ));

        let mut config = WorldConfig::default();
        config.flora.fruit_respawn_secs = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidConfig { field: "flora.fruit_respawn_secs", .. })
        ));

        let mut config = WorldConfig::default();
        config.flora.fruit_respawn_secs = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = WorldConfig::from_toml_str("seed = = 3").unwrap_err();
        assert!(matches!(err, WorldError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorldConfig::from_path("/definitely/not/here/verdant.toml").unwrap_err();
        assert!(matches!(err, WorldError::Io { .. }));
        assert!(err.to_string().contains("verdant.toml"));
    }
}
