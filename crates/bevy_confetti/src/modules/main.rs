use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext};
use crate::asset::serde_helpers::{default_one_f32, default_true, is_false, is_true, serde_default};
use crate::asset::{MinMaxCurve, MinMaxCurveVector3, MinMaxGradient};
use crate::particle::{ContributionName, Particle};
use crate::space::SimulationSpace;

/// World space gravity scaled by [`MainModule::gravity_modifier`].
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

serde_default!(duration, f32, 5.0);
serde_default!(start_lifetime, MinMaxCurve, MinMaxCurve::Constant(5.0));
serde_default!(start_speed, MinMaxCurve, MinMaxCurve::Constant(5.0));
serde_default!(max_particles, u32, 1000);

/// Initial size of new particles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub enum StartSize {
    /// The same size on every axis.
    Uniform(MinMaxCurve),
    /// A separate size per axis.
    Axes(MinMaxCurveVector3),
}

impl Default for StartSize {
    fn default() -> Self {
        Self::Uniform(MinMaxCurve::Constant(1.0))
    }
}

impl StartSize {
    fn sample(&self, t: f32, random_between: f32) -> Vec3 {
        match self {
            Self::Uniform(curve) => Vec3::splat(curve.get_value(t, random_between)),
            Self::Axes(curves) => curves.get_value(t, random_between),
        }
    }
}

/// Initial rotation of new particles, in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub enum StartRotation {
    /// Rotation around Z only.
    Z(MinMaxCurve),
    /// A separate rotation per axis.
    Axes(MinMaxCurveVector3),
}

impl Default for StartRotation {
    fn default() -> Self {
        Self::Z(MinMaxCurve::Constant(0.0))
    }
}

impl StartRotation {
    fn sample(&self, t: f32, random_between: f32) -> Vec3 {
        match self {
            Self::Z(curve) => Vec3::new(0.0, 0.0, curve.get_value(t, random_between)),
            Self::Axes(curves) => curves.get_value(t, random_between),
        }
    }
}

/// What happens to living particles when a system is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum StopBehavior {
    /// Stop emitting and let particles age out.
    #[default]
    StopEmitting,
    /// Stop emitting and remove every particle immediately.
    StopEmittingAndClear,
}

impl StopBehavior {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Settings every particle system has: timing, start values, gravity and limits.
///
/// Start values are sampled at the emitter's duration phase, not the particle's age.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct MainModule {
    /// Length of one emission cycle in seconds. Defaults to `5.0`.
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Whether the cycle repeats. Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub looping: bool,
    /// Simulate one full cycle when playback starts. Only applies to looping systems.
    ///
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub prewarm: bool,
    /// Delay before emission starts, in seconds. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub start_delay: MinMaxCurve,
    /// Lifetime of new particles in seconds. Defaults to `5.0`.
    #[serde(default = "default_start_lifetime")]
    pub start_lifetime: MinMaxCurve,
    /// Speed along the shape direction. Defaults to `5.0`.
    #[serde(default = "default_start_speed")]
    pub start_speed: MinMaxCurve,
    /// Initial size. Defaults to a uniform `1.0`.
    #[serde(default)]
    pub start_size: StartSize,
    /// Initial rotation in degrees. Defaults to `0.0` around Z.
    #[serde(default)]
    pub start_rotation: StartRotation,
    /// Probability of mirroring the start rotation, from `0.0` to `1.0`.
    ///
    /// Defaults to `0.0`.
    #[serde(default)]
    pub flip_rotation: f32,
    /// Initial color. Defaults to white.
    #[serde(default, skip_serializing_if = "MinMaxGradient::is_white")]
    pub start_color: MinMaxGradient,
    /// Scale applied to [`GRAVITY`]. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub gravity_modifier: MinMaxCurve,
    /// Space particles are simulated in. Defaults to [`SimulationSpace::Local`].
    #[serde(default, skip_serializing_if = "SimulationSpace::is_default")]
    pub simulation_space: SimulationSpace,
    /// Scale applied to every frame interval. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub simulation_speed: f32,
    /// Maximum number of living particles. Must be greater than zero.
    ///
    /// Defaults to `1000`.
    #[serde(default = "default_max_particles")]
    pub max_particles: u32,
    /// Behavior of [`ParticleSystem::stop`](crate::ParticleSystem::stop).
    ///
    /// Defaults to [`StopBehavior::StopEmitting`].
    #[serde(default, skip_serializing_if = "StopBehavior::is_default")]
    pub stop_behavior: StopBehavior,
}

impl Default for MainModule {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            looping: true,
            prewarm: false,
            start_delay: MinMaxCurve::Constant(0.0),
            start_lifetime: default_start_lifetime(),
            start_speed: default_start_speed(),
            start_size: StartSize::default(),
            start_rotation: StartRotation::default(),
            flip_rotation: 0.0,
            start_color: MinMaxGradient::default(),
            gravity_modifier: MinMaxCurve::Constant(0.0),
            simulation_space: SimulationSpace::Local,
            simulation_speed: 1.0,
            max_particles: default_max_particles(),
            stop_behavior: StopBehavior::StopEmitting,
        }
    }
}

impl ParticleModule for MainModule {
    fn enabled(&self) -> bool {
        true
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        let t = ctx.rate_at_duration;
        let rng = &mut *ctx.rng;

        particle.birth_rate_at_duration = t;
        particle.lifetime = self.start_lifetime.get_value(t, rng.f32());
        particle.start_speed = self.start_speed.get_value(t, rng.f32());
        particle.start_size = self.start_size.sample(t, rng.f32());
        particle.size = particle.start_size;

        let mut rotation = self.start_rotation.sample(t, rng.f32());
        if self.flip_rotation > 0.0 && rng.chance(self.flip_rotation) {
            rotation = -rotation;
        }
        particle.rotation = rotation;

        particle.start_color = self.start_color.get_value(t, rng.f32());
        particle.color = particle.start_color;
        particle.cache.gravity_random = rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, ctx: &UpdateContext) {
        if self.gravity_modifier.is_zero() {
            return;
        }
        let modifier = self
            .gravity_modifier
            .get_value(ctx.rate_at_duration, particle.cache.gravity_random);
        let gravity = ctx.space.vector(GRAVITY * modifier, SimulationSpace::World);
        particle.set_acceleration_contribution(ContributionName::Gravity, gravity);
    }
}
