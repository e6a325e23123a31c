use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext, default_speed_range, speed_phase};
use crate::asset::MinMaxGradient;
use crate::asset::serde_helpers::is_false;
use crate::particle::{ContributionName, Particle};

/// Tints particles over their lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Reflect)]
pub struct ColorOverLifetimeModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Multiplied into the start color. Defaults to white.
    #[serde(default, skip_serializing_if = "MinMaxGradient::is_white")]
    pub color: MinMaxGradient,
}

impl ParticleModule for ColorOverLifetimeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.color_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let color = self
            .color
            .get_value(particle.rate_at_life_time, particle.cache.color_random);
        particle.set_color_contribution(ContributionName::ColorOverLifetime, color);
    }
}

/// Tints particles by their current speed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct ColorBySpeedModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Multiplied into the start color. Defaults to white.
    #[serde(default, skip_serializing_if = "MinMaxGradient::is_white")]
    pub color: MinMaxGradient,
    /// Speeds mapped to the start and end of the gradient. Defaults to `(0, 1)`.
    #[serde(default = "default_speed_range")]
    pub range: Vec2,
}

impl Default for ColorBySpeedModule {
    fn default() -> Self {
        Self {
            enabled: false,
            color: MinMaxGradient::default(),
            range: default_speed_range(),
        }
    }
}

impl ParticleModule for ColorBySpeedModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.color_by_speed_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let t = speed_phase(particle.total_velocity().length(), self.range);
        let color = self
            .color
            .get_value(t, particle.cache.color_by_speed_random);
        particle.set_color_contribution(ContributionName::ColorBySpeed, color);
    }
}
