//! Sub-pixel sample patterns for anti-aliasing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use lumen_math::Vec2;

/// How sample offsets are placed inside a pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStrategy {
    /// Every sample at the pixel center.
    #[default]
    Center,
    /// Jittered `k x k` grid with `k = round(sqrt(count))`.
    Stratified,
    /// Uniform random offsets.
    Random,
}

/// Generates sub-pixel offsets in `[0, 1)^2`.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    strategy: SampleStrategy,
    count: usize,
}

impl Sampler {
    pub fn new(strategy: SampleStrategy, count: usize) -> Self {
        Self {
            strategy,
            count: count.max(1),
        }
    }

    /// Samples produced per pixel.
    ///
    /// Stratified sampling rounds the requested count to a square.
    pub fn samples_per_pixel(&self) -> usize {
        match self.strategy {
            SampleStrategy::Stratified => {
                let k = Self::grid_size(self.count);
                k * k
            }
            _ => self.count,
        }
    }

    fn grid_size(count: usize) -> usize {
        ((count as f32).sqrt().round() as usize).max(1)
    }

    /// Fill `out` with one pixel's worth of offsets.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Vec<Vec2>) {
        out.clear();
        match self.strategy {
            SampleStrategy::Center => {
                out.resize(self.count, Vec2::splat(0.5));
            }
            SampleStrategy::Random => {
                out.extend((0..self.count).map(|_| Vec2::new(rng.gen(), rng.gen())));
            }
            SampleStrategy::Stratified => {
                let k = Self::grid_size(self.count);
                let cell = 1.0 / k as f32;
                for j in 0..k {
                    for i in 0..k {
                        let jitter = Vec2::new(rng.gen(), rng.gen());
                        out.push((Vec2::new(i as f32, j as f32) + jitter) * cell);
                    }
                }
            }
        }
    }
}
