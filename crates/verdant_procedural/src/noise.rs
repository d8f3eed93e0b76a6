//! # Noise Field
//!
//! Smooth, deterministic 1-D gradient noise for the terrain surface.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation produces **exactly** the
//! same values for the same input, on every call. The only state is a
//! permutation table computed once from the seed.
//!
//! ## Period
//!
//! Lattice hashes chain the permutation table over three bytes of the
//! lattice index, so the field repeats only every 2^24 lattice cells.
//! At terrain scale that is billions of pixels: effectively infinite.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., tree placement).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Keys this seed with a world coordinate.
    ///
    /// The result depends only on `(seed, coord)`, which is what lets a
    /// coordinate be re-derived after eviction without any history.
    #[inline]
    #[must_use]
    pub const fn mix(self, coord: i64) -> u64 {
        // splitmix64 finalizer over seed + coordinate
        let mut z = self.0 ^ (coord as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x5EED_CAFE)
    }
}

/// Purpose tag for the terrain noise sub-seed.
pub(crate) const TERRAIN_NOISE: u64 = 0x7e44_a100;

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle with deterministic RNG.
        // xorshift64 has a fixed point at zero, so keep the state non-zero.
        let mut rng_state = seed.value() | 1;
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    /// Hashes a lattice index through three chained lookups.
    #[inline]
    fn hash(&self, lattice: i64) -> u8 {
        let bits = lattice as u64;
        let a = self.get((bits & 0xff) as usize);
        let b = self.get(usize::from(a) + ((bits >> 8) & 0xff) as usize);
        self.get(usize::from(b) + ((bits >> 16) & 0xff) as usize)
    }

    /// Gradient in [-1, 1] for a lattice index.
    #[inline]
    fn gradient(&self, lattice: i64) -> f64 {
        f64::from(self.hash(lattice)) / 127.5 - 1.0
    }
}

/// 1-D gradient noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
///
/// # Example
///
/// ```rust,ignore
/// let field = NoiseField::new(WorldSeed::new(42));
///
/// // Raw sample, [-1, 1]
/// let v = field.sample(12.5);
///
/// // Terrain offset bounded to ±210 pixels
/// let dy = field.noise(x, 210.0);
/// ```
#[derive(Clone)]
pub struct NoiseField {
    /// The permutation table.
    perm_table: PermutationTable,
}

impl NoiseField {
    /// Octaves summed by [`NoiseField::noise`].
    pub const TERRAIN_OCTAVES: u32 = 4;

    /// Creates a new noise field from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples single-octave noise at `x` (in lattice units).
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1]. Integer inputs always return 0.
    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let i0 = fast_floor(x);
        let t = x - i0 as f64;

        let n0 = self.perm_table.gradient(i0) * t;
        let n1 = self.perm_table.gradient(i0 + 1) * (t - 1.0);

        // Quintic fade keeps the first and second derivative continuous
        let fade = t * t * t * (t * (t * 6.0 - 15.0) + 10.0);

        // Each corner contributes at most 0.5 in magnitude
        (2.0 * (n0 + fade * (n1 - n0))).clamp(-1.0, 1.0)
    }

    /// Generates octaved (fractal) noise.
    ///
    /// # Arguments
    ///
    /// * `x` - Coordinate in lattice units
    /// * `octaves` - Number of noise layers
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn octaved(&self, x: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for octave in 0..octaves {
            // Offset each octave so lattice points do not line up
            let offset = f64::from(octave) * 31.337;
            total += self.sample(x * frequency + offset) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Terrain noise: a smooth offset bounded to `[-scale, scale]`.
    ///
    /// `scale` is both the amplitude and the base wavelength, in pixels.
    #[must_use]
    pub fn noise(&self, x: f32, scale: f32) -> f32 {
        if scale <= 0.0 {
            return 0.0;
        }
        let scale = f64::from(scale);
        let value = self.octaved(f64::from(x) / scale, Self::TERRAIN_OCTAVES, 0.5, 2.0) * scale;
        value.clamp(-scale, scale) as f32
    }
}

/// Fast floor function for lattice lookup.
#[inline]
fn fast_floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 { xi - 1 } else { xi }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let noise1 = NoiseField::new(seed);
        let noise2 = NoiseField::new(seed);

        for i in 0..1000 {
            let x = i as f32 * 3.7 - 1800.0;
            assert_eq!(
                noise1.noise(x, 210.0).to_bits(),
                noise2.noise(x, 210.0).to_bits(),
                "Noise should be deterministic at {x}"
            );
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = NoiseField::new(WorldSeed::new(1));
        let noise2 = NoiseField::new(WorldSeed::new(2));

        let differs = (0..100).any(|i| {
            let x = f64::from(i) * 0.37 + 0.1;
            noise1.sample(x) != noise2.sample(x)
        });
        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        let noise = NoiseField::new(WorldSeed::new(42));

        for i in 0..10000 {
            let x = f64::from(i) * 0.113 - 500.0;
            let value = noise.sample(x);
            assert!((-1.0..=1.0).contains(&value), "Value {value} out of range at {x}");

            let terrain = noise.noise(x as f32 * 30.0, 210.0);
            assert!((-210.0..=210.0).contains(&terrain), "Terrain {terrain} out of bounds");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = NoiseField::new(WorldSeed::new(42));

        for i in 0..200 {
            let x = f64::from(i) * 0.71 - 60.0;
            let v1 = noise.sample(x);
            let v2 = noise.sample(x + 0.001);
            let diff = (v1 - v2).abs();
            assert!(diff < 0.01, "Noise should be continuous at {x}: diff = {diff}");
        }
    }

    #[test]
    fn test_adjacent_columns_are_coherent() {
        let noise = NoiseField::new(WorldSeed::new(7));

        // Every octave's slope is bounded, so a 30px step against a 210px
        // wavelength moves at most 0.7 of the amplitude, and far less on
        // average.
        let steps: Vec<f32> = (-200..200)
            .map(|column| {
                let a = noise.noise(column as f32 * 30.0, 210.0);
                let b = noise.noise((column + 1) as f32 * 30.0, 210.0);
                (a - b).abs()
            })
            .collect();

        for (column, step) in (-200..).zip(&steps) {
            assert!(*step < 147.0, "Jump of {step} after column {column}");
        }
        let mean = steps.iter().sum::<f32>() / steps.len() as f32;
        assert!(mean < 210.0 / 6.0, "Mean step {mean} is not smooth");
        assert!(mean > 0.0, "Field is flat");
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let noise = NoiseField::new(WorldSeed::new(42));
        for i in -50..50 {
            assert_eq!(noise.sample(f64::from(i)), 0.0);
        }
    }

    #[test]
    fn test_not_flat() {
        let noise = NoiseField::new(WorldSeed::new(42));
        let max = (0..2000)
            .map(|i| noise.noise(i as f32 * 30.0, 210.0).abs())
            .fold(0.0f32, f32::max);
        assert!(max > 20.0, "Terrain should vary, max offset {max}");
    }

    #[test]
    fn test_zero_scale_is_flat() {
        let noise = NoiseField::new(WorldSeed::new(42));
        assert_eq!(noise.noise(123.0, 0.0), 0.0);
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);
        let derived1_again = base.derive(1);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, derived1_again, "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
    }

    #[test]
    fn test_coordinate_mixing() {
        let seed = WorldSeed::new(7);
        assert_eq!(seed.mix(100), seed.mix(100));
        assert_ne!(seed.mix(100), seed.mix(101));
        assert_ne!(seed.mix(-1), seed.mix(1));
        assert_ne!(WorldSeed::new(8).mix(100), seed.mix(100));
    }
}
