use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext, default_speed_range, speed_phase};
use crate::asset::serde_helpers::{is_false, serde_default};
use crate::asset::{MinMaxCurve, MinMaxCurveVector3};
use crate::particle::{ContributionName, Particle};

serde_default!(size, MinMaxCurve, MinMaxCurve::Constant(1.0));
serde_default!(size_xyz, MinMaxCurveVector3, MinMaxCurveVector3::splat(1.0));

fn sample_size(
    separate_axes: bool,
    size: &MinMaxCurve,
    size_xyz: &MinMaxCurveVector3,
    t: f32,
    random_between: f32,
) -> Vec3 {
    if separate_axes {
        size_xyz.get_value(t, random_between)
    } else {
        Vec3::splat(size.get_value(t, random_between))
    }
}

/// Scales particles over their lifetime.
///
/// The sampled value multiplies the start size. It enters the particle as the
/// contribution `value - 1` so it combines additively with other size modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct SizeOverLifetimeModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Use `size_xyz` instead of `size`. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate_axes: bool,
    /// Uniform size multiplier. Defaults to `1.0`.
    #[serde(default = "default_size", skip_serializing_if = "is_default_size")]
    pub size: MinMaxCurve,
    /// Per-axis size multiplier. Defaults to `1.0` on every axis.
    #[serde(default = "default_size_xyz", skip_serializing_if = "is_default_size_xyz")]
    pub size_xyz: MinMaxCurveVector3,
}

impl Default for SizeOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            separate_axes: false,
            size: default_size(),
            size_xyz: default_size_xyz(),
        }
    }
}

impl ParticleModule for SizeOverLifetimeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.size_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let value = sample_size(
            self.separate_axes,
            &self.size,
            &self.size_xyz,
            particle.rate_at_life_time,
            particle.cache.size_random,
        );
        particle.set_size_contribution(ContributionName::SizeOverLifetime, value - Vec3::ONE);
    }
}

/// Scales particles by their current speed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct SizeBySpeedModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Use `size_xyz` instead of `size`. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate_axes: bool,
    /// Uniform size multiplier. Defaults to `1.0`.
    #[serde(default = "default_size", skip_serializing_if = "is_default_size")]
    pub size: MinMaxCurve,
    /// Per-axis size multiplier. Defaults to `1.0` on every axis.
    #[serde(default = "default_size_xyz", skip_serializing_if = "is_default_size_xyz")]
    pub size_xyz: MinMaxCurveVector3,
    /// Speeds mapped to the start and end of the curves. Defaults to `(0, 1)`.
    #[serde(default = "default_speed_range")]
    pub range: Vec2,
}

impl Default for SizeBySpeedModule {
    fn default() -> Self {
        Self {
            enabled: false,
            separate_axes: false,
            size: default_size(),
            size_xyz: default_size_xyz(),
            range: default_speed_range(),
        }
    }
}

impl ParticleModule for SizeBySpeedModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.size_by_speed_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let t = speed_phase(particle.total_velocity().length(), self.range);
        let value = sample_size(
            self.separate_axes,
            &self.size,
            &self.size_xyz,
            t,
            particle.cache.size_by_speed_random,
        );
        particle.set_size_contribution(ContributionName::SizeBySpeed, value - Vec3::ONE);
    }
}
