//! Fractal noise synthesis for heightmap generation.
//!
//! Wraps a seeded Perlin basis and combines octaves with explicit
//! frequency/amplitude ladders, so chunk world offsets can be folded into the
//! sample coordinates and the surface stays continuous across chunk
//! boundaries.

use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Deterministic fractal (multi-octave) noise source.
///
/// The basis is seeded once at construction and never reseeded; identical
/// inputs always produce identical output, and sampling takes `&self`, so a
/// sampler can be shared across build threads freely.
pub struct FbmSampler {
    basis: FastNoiseLite,
    octaves: u32,
    lacunarity: f32,
    persistence: f32,
}

impl FbmSampler {
    pub fn new(seed: i32, octaves: u32, lacunarity: f32, persistence: f32) -> Self {
        let mut basis = FastNoiseLite::with_seed(seed);
        basis.set_noise_type(Some(NoiseType::Perlin));
        // Frequency scaling is explicit in `sample`; the basis must not
        // rescale inputs on its own.
        basis.set_frequency(Some(1.0));
        Self {
            basis,
            octaves,
            lacunarity,
            persistence,
        }
    }

    /// Single-octave basis noise in [-1, 1].
    pub fn basis(&self, x: f32, z: f32) -> f32 {
        self.basis.get_noise_2d(x, z)
    }

    /// Fractal sum over the configured octaves: octave `o` samples at
    /// `frequency * lacunarity^o` and contributes `amplitude * persistence^o`.
    pub fn sample(&self, x: f32, z: f32, frequency: f32, amplitude: f32) -> f32 {
        let mut total = 0.0;
        let mut freq = frequency;
        let mut amp = amplitude;
        for _ in 0..self.octaves {
            total += self.basis.get_noise_2d(x * freq, z * freq) * amp;
            freq *= self.lacunarity;
            amp *= self.persistence;
        }
        total
    }

    /// Worst-case magnitude of [`Self::sample`] for a given base amplitude:
    /// the geometric series `amplitude * Σ persistence^o`.
    pub fn max_amplitude(&self, amplitude: f32) -> f32 {
        let mut total = 0.0;
        let mut amp = amplitude;
        for _ in 0..self.octaves {
            total += amp;
            amp *= self.persistence;
        }
        total
    }
}
