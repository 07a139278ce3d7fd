//! Seeded multi-octave 3D noise and the weighted octave layers built on it.
//!
//! **Seed-based determinism:** every octave is a pure function of `(base_seed, index)`,
//! so regenerating the octave list with an unchanged seed reproduces identical terrain
//! no matter how many times the list was truncated or extended in between.

use glam::DVec3;
use noise::{Fbm, MultiFractal, NoiseFn, Simplex};
use rand::prelude::*;

/// Magnitude of per-octave sample offsets. Large offsets decorrelate octaves that
/// would otherwise sample the same region of the same lattice.
pub const OCTAVE_OFFSET_RANGE: f64 = 1.0e9;

/// Derive a deterministic u32 noise seed from a world seed and an offset: the
/// high 32 bits of a 64-bit mix, since `noise` generators take `u32` seeds.
#[inline]
pub fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    (octave_hash(seed, offset) >> 32) as u32
}

#[inline]
fn octave_hash(seed: u64, offset: u64) -> u64 {
    (seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
}

/// Fractal detail inside every noise field.
const FIELD_OCTAVES: usize = 4;
const FIELD_LACUNARITY: f64 = 2.0;
const FIELD_PERSISTENCE: f64 = 0.5;

/// Deterministic, continuous 3D scalar noise in `[-1, 1]`.
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    fbm: Fbm<Simplex>,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let fbm = Fbm::<Simplex>::new(seed)
            .set_octaves(FIELD_OCTAVES)
            .set_frequency(1.0)
            .set_lacunarity(FIELD_LACUNARITY)
            .set_persistence(FIELD_PERSISTENCE);
        Self { seed, fbm }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample at `position + offset`. Independent of call order.
    pub fn sample(&self, offset: DVec3, position: DVec3) -> f64 {
        let p = position + offset;
        let value = self.fbm.get([p.x, p.y, p.z]);
        if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Influence of octave `index` out of `count`: `1 - ((index + 1) / count)^falloff`.
///
/// Strictly decreasing in `index` for `falloff > 0`; all zero for `falloff == 0`.
pub fn octave_weight(index: usize, count: usize, falloff: f32) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let t = (index + 1) as f32 / count as f32;
    1.0 - t.powf(falloff)
}

/// One weighted layer of terrain noise.
#[derive(Debug, Clone)]
pub struct Octave {
    pub noise_seed: u32,
    pub sample_offset: DVec3,
    pub weight: f32,
    field: NoiseField,
}

impl Octave {
    /// Build octave `index` for `base_seed`. The weight is set by the owner once the
    /// final octave count is known.
    pub fn derive(base_seed: u64, index: usize) -> Self {
        let noise_seed = deterministic_noise_seed(base_seed, index as u64);
        let mut rng = StdRng::seed_from_u64(octave_hash(base_seed, index as u64 ^ 0xa5a5_a5a5));
        let sample_offset = DVec3::new(
            rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
            rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
            rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
        );
        Self {
            noise_seed,
            sample_offset,
            weight: 0.0,
            field: NoiseField::new(noise_seed),
        }
    }

    /// Unweighted noise for this octave at `position`.
    pub fn sample(&self, position: DVec3) -> f64 {
        self.field.sample(self.sample_offset, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_deterministic_and_bounded() {
        let a = NoiseField::new(7);
        let b = NoiseField::new(7);
        let offset = DVec3::new(1.0e9, -3.0e8, 5.5e8);
        for i in 0..200 {
            let p = DVec3::new(i as f64 * 0.37, (i as f64 * 0.11).sin(), -(i as f64) * 0.05);
            let va = a.sample(offset, p);
            assert_eq!(va, b.sample(offset, p));
            assert!((-1.0..=1.0).contains(&va));
        }
    }

    #[test]
    fn sample_is_continuous() {
        let field = NoiseField::new(1234);
        let offset = DVec3::new(2.0e8, 1.0e8, -7.0e8);
        let p = DVec3::new(0.3, 0.8, -0.2);
        let near = p + DVec3::splat(1.0e-5);
        assert!((field.sample(offset, p) - field.sample(offset, near)).abs() < 1.0e-3);
    }

    #[test]
    fn call_order_does_not_matter() {
        let field = NoiseField::new(99);
        let p = DVec3::new(0.1, 0.2, 0.3);
        let q = DVec3::new(-1.0, 4.0, 2.0);
        let first = field.sample(DVec3::ZERO, p);
        let _ = field.sample(DVec3::ZERO, q);
        assert_eq!(first, field.sample(DVec3::ZERO, p));
    }

    #[test]
    fn weights_strictly_decrease_with_positive_falloff() {
        for &falloff in &[0.5_f32, 1.0, 3.0] {
            let weights: Vec<f32> = (0..8).map(|i| octave_weight(i, 8, falloff)).collect();
            for pair in weights.windows(2) {
                assert!(pair[0] > pair[1], "falloff {falloff}: {weights:?}");
            }
        }
    }

    #[test]
    fn weights_equal_with_zero_falloff() {
        let weights: Vec<f32> = (0..6).map(|i| octave_weight(i, 6, 0.0)).collect();
        assert!(weights.iter().all(|&w| w == weights[0]));
    }

    #[test]
    fn noise_seed_is_high_half_of_hash() {
        for (seed, offset) in [(0_u64, 0_u64), (42, 3), (u64::MAX, 17)] {
            let hash = octave_hash(seed, offset);
            assert_eq!(deterministic_noise_seed(seed, offset) as u64, hash >> 32);
        }
        assert_eq!(Octave::derive(42, 3).noise_seed, deterministic_noise_seed(42, 3));
        assert_eq!(NoiseField::new(9).seed(), 9);
    }

    #[test]
    fn octave_derivation_is_reproducible() {
        let a = Octave::derive(42, 3);
        let b = Octave::derive(42, 3);
        assert_eq!(a.noise_seed, b.noise_seed);
        assert_eq!(a.sample_offset, b.sample_offset);
        assert!(a.sample_offset.abs().max_element() <= OCTAVE_OFFSET_RANGE);

        let other = Octave::derive(42, 4);
        assert_ne!(a.sample_offset, other.sample_offset);
    }
}
