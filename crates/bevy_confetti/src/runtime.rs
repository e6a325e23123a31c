use bevy::prelude::*;

use crate::asset::ParticleSystemAsset;

/// Plays a [`ParticleSystemAsset`] at this entity's transform.
///
/// Once the asset has loaded, the entity receives a [`ParticleEffect`](crate::ParticleEffect)
/// and a [`ParticleSystemRuntime`], and one [`EmitterEntity`] child per emitter.
#[derive(Component, Debug, Clone)]
#[require(Transform, Visibility)]
pub struct ParticleSystem3D {
    /// The effect to play.
    pub handle: Handle<ParticleSystemAsset>,
}

/// Playback state shared by every emitter of a particle system entity.
///
/// Insert one before the asset loads to choose the seed.
#[derive(Component, Debug, Clone)]
pub struct ParticleSystemRuntime {
    /// While `true`, no emitter advances.
    pub paused: bool,
    /// Seed every emitter without a `fixed_seed` derives its own from.
    pub global_seed: u64,
}

impl Default for ParticleSystemRuntime {
    fn default() -> Self {
        Self {
            paused: false,
            global_seed: fastrand::u64(..),
        }
    }
}

impl ParticleSystemRuntime {
    /// A runtime with a fixed seed, for reproducible playback.
    pub fn with_seed(global_seed: u64) -> Self {
        Self {
            paused: false,
            global_seed,
        }
    }

    /// Pauses every emitter.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes every emitter.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggles between paused and playing.
    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }
}

/// Child entity standing for one emitter of a particle system.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterEntity {
    /// The entity holding the [`ParticleSystem3D`].
    pub parent_system: Entity,
    /// Index of the emitter in the asset.
    pub emitter_index: usize,
}

/// Sent when an emitter finishes a duration cycle.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleSystemCycled {
    /// The entity holding the [`ParticleSystem3D`].
    pub entity: Entity,
    /// Index of the emitter in the asset.
    pub emitter_index: usize,
    /// Index of the finished cycle, starting at `0`.
    pub cycle: u32,
}

/// Sent when a non-looping emitter has finished and its last particle has died.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleSystemCompleted {
    /// The entity holding the [`ParticleSystem3D`].
    pub entity: Entity,
    /// Index of the emitter in the asset.
    pub emitter_index: usize,
}
