use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext};
use crate::asset::MinMaxCurveVector3;
use crate::asset::serde_helpers::is_false;
use crate::particle::{ContributionName, Particle};
use crate::space::SimulationSpace;

/// Adds an acceleration that varies over each particle's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Reflect)]
pub struct ForceOverLifetimeModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Acceleration per axis.
    #[serde(default, skip_serializing_if = "MinMaxCurveVector3::is_zero")]
    pub force: MinMaxCurveVector3,
    /// Space `force` is expressed in. Defaults to [`SimulationSpace::Local`].
    #[serde(default, skip_serializing_if = "SimulationSpace::is_default")]
    pub space: SimulationSpace,
}

impl ParticleModule for ForceOverLifetimeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.force_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, ctx: &UpdateContext) {
        let force = self
            .force
            .get_value(particle.rate_at_life_time, particle.cache.force_random);
        particle.set_acceleration_contribution(
            ContributionName::ForceOverLifetime,
            ctx.space.vector(force, self.space),
        );
    }
}
