use thiserror::Error;

/// Configuration errors detected when a particle system is constructed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParticleSystemError {
    /// `max_particles` is zero.
    #[error("max_particles must be greater than zero")]
    ZeroMaxParticles,
    /// The duration is zero, negative or not finite.
    #[error("duration must be finite and greater than zero, found {0}")]
    InvalidDuration(f32),
    /// A sub-emitter points at an emitter that does not exist.
    #[error("sub-emitter {index} targets emitter {target}, but the effect has {len} emitters")]
    SubEmitterTargetOutOfRange {
        /// Index of the sub-emitter entry.
        index: usize,
        /// Emitter index it targets.
        target: usize,
        /// Number of emitters.
        len: usize,
    },
    /// A probability lies outside `[0, 1]`.
    #[error("probability must be between 0 and 1, found {0}")]
    InvalidProbability(f32),
}
