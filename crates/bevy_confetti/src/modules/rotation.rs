use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext, default_speed_range, speed_phase};
use crate::asset::serde_helpers::{is_false, serde_default};
use crate::asset::{MinMaxCurve, MinMaxCurveVector3};
use crate::particle::{ContributionName, Particle};

serde_default!(angular_velocity, MinMaxCurve, MinMaxCurve::Constant(45.0));

fn sample_angular_velocity(
    separate_axes: bool,
    z: &MinMaxCurve,
    xyz: &MinMaxCurveVector3,
    t: f32,
    random_between: f32,
) -> Vec3 {
    if separate_axes {
        xyz.get_value(t, random_between)
    } else {
        Vec3::new(0.0, 0.0, z.get_value(t, random_between))
    }
}

/// Spins particles over their lifetime, in degrees per second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct RotationOverLifetimeModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Use `angular_velocity_xyz` instead of `angular_velocity`. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate_axes: bool,
    /// Angular velocity around Z. Defaults to `45.0`.
    #[serde(default = "default_angular_velocity")]
    pub angular_velocity: MinMaxCurve,
    /// Angular velocity per axis. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurveVector3::is_zero")]
    pub angular_velocity_xyz: MinMaxCurveVector3,
}

impl Default for RotationOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            separate_axes: false,
            angular_velocity: default_angular_velocity(),
            angular_velocity_xyz: MinMaxCurveVector3::default(),
        }
    }
}

impl ParticleModule for RotationOverLifetimeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.rotation_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let value = sample_angular_velocity(
            self.separate_axes,
            &self.angular_velocity,
            &self.angular_velocity_xyz,
            particle.rate_at_life_time,
            particle.cache.rotation_random,
        );
        particle.set_angular_velocity_contribution(ContributionName::RotationOverLifetime, value);
    }
}

/// Spins particles by their current speed, in degrees per second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct RotationBySpeedModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Use `angular_velocity_xyz` instead of `angular_velocity`. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate_axes: bool,
    /// Angular velocity around Z. Defaults to `45.0`.
    #[serde(default = "default_angular_velocity")]
    pub angular_velocity: MinMaxCurve,
    /// Angular velocity per axis. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurveVector3::is_zero")]
    pub angular_velocity_xyz: MinMaxCurveVector3,
    /// Speeds mapped to the start and end of the curves. Defaults to `(0, 1)`.
    #[serde(default = "default_speed_range")]
    pub range: Vec2,
}

impl Default for RotationBySpeedModule {
    fn default() -> Self {
        Self {
            enabled: false,
            separate_axes: false,
            angular_velocity: default_angular_velocity(),
            angular_velocity_xyz: MinMaxCurveVector3::default(),
            range: default_speed_range(),
        }
    }
}

impl ParticleModule for RotationBySpeedModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.rotation_by_speed_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let t = speed_phase(particle.total_velocity().length(), self.range);
        let value = sample_angular_velocity(
            self.separate_axes,
            &self.angular_velocity,
            &self.angular_velocity_xyz,
            t,
            particle.cache.rotation_by_speed_random,
        );
        particle.set_angular_velocity_contribution(ContributionName::RotationBySpeed, value);
    }
}
