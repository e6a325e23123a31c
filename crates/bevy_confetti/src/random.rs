use bevy::prelude::*;

/// Seeded random source owned by a particle system.
///
/// Two systems created with the same seed and fed the same frame intervals produce
/// identical particles.
#[derive(Debug, Clone)]
pub struct ParticleRng(fastrand::Rng);

impl ParticleRng {
    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }

    /// A value in `[0, 1)`.
    pub fn f32(&mut self) -> f32 {
        self.0.f32()
    }

    /// A value in `[-1, 1)`.
    pub fn signed(&mut self) -> f32 {
        self.0.f32() * 2.0 - 1.0
    }

    /// A raw 32-bit value, used for per-particle seeds.
    pub fn u32(&mut self) -> u32 {
        self.0.u32(..)
    }

    /// A raw 64-bit value, used to seed child generators.
    pub fn u64(&mut self) -> u64 {
        self.0.u64(..)
    }

    /// Returns `true` with the given probability.
    ///
    /// Probabilities at or above `1.0` always pass without consuming randomness.
    pub fn chance(&mut self, probability: f32) -> bool {
        if probability >= 1.0 {
            return true;
        }
        if probability <= 0.0 {
            return false;
        }
        self.0.f32() < probability
    }

    /// A uniformly distributed unit vector.
    pub fn unit_vector(&mut self) -> Vec3 {
        let z = self.signed();
        let theta = self.f32() * std::f32::consts::TAU;
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }
}
