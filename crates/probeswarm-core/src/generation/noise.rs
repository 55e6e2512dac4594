//! Density fields - deterministic 2D scalar functions steering star placement

use libnoise::{Generator, Source};

use crate::config::NoiseConfig;

/// A scalar density over world coordinates, normalized to `[0, 1]`.
///
/// Any coherent field works as long as it is deterministic for a given
/// construction; the galaxy generator only compares samples against a threshold.
pub trait DensityField {
    fn density(&self, x: f64, y: f64) -> f64;
}

/// Seeded fractal Perlin noise
pub struct NoiseField<G> {
    generator: G,
}

impl<G: Generator<2>> DensityField for NoiseField<G> {
    fn density(&self, x: f64, y: f64) -> f64 {
        // fBm output is roughly [-1, 1]
        ((self.generator.sample([x, y]) + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Build a fractal Perlin field from `config`, seeded by `seed`
pub fn perlin_field(seed: u64, config: &NoiseConfig) -> NoiseField<impl Generator<2>> {
    let generator = Source::<2>::improved_perlin(seed).fbm(
        config.octaves,
        1.0 / config.scale,
        config.lacunarity,
        config.persistence,
    );
    NoiseField { generator }
}

/// Same density everywhere. Useful for tests and flat starfields.
#[derive(Debug, Clone, Copy)]
pub struct UniformField(pub f64);

impl DensityField for UniformField {
    fn density(&self, _x: f64, _y: f64) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}
