use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext};
use crate::asset::serde_helpers::{default_true, is_false, is_true, is_zero_f32, serde_default};
use crate::asset::{MinMaxCurve, MinMaxCurveVector3};
use crate::particle::{ContributionName, Particle};
use crate::space::SimulationSpace;

serde_default!(speed_modifier, MinMaxCurve, MinMaxCurve::Constant(1.0));
serde_default!(speed_limit, MinMaxCurve, MinMaxCurve::Constant(1.0));
serde_default!(speed_limit_xyz, MinMaxCurveVector3, MinMaxCurveVector3::splat(1.0));

/// Frames per second the dampen fraction is defined against.
const DAMPEN_REFERENCE_RATE: f32 = 30.0;

/// Adds a velocity that varies over each particle's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct VelocityOverLifetimeModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Linear velocity per axis.
    #[serde(default, skip_serializing_if = "MinMaxCurveVector3::is_zero")]
    pub velocity: MinMaxCurveVector3,
    /// Space `velocity` is expressed in. Defaults to [`SimulationSpace::Local`].
    #[serde(default, skip_serializing_if = "SimulationSpace::is_default")]
    pub space: SimulationSpace,
    /// Speed away from the emitter origin. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub radial: MinMaxCurve,
    /// Multiplier on the particle's base velocity. Defaults to `1.0`.
    #[serde(default = "default_speed_modifier")]
    pub speed_modifier: MinMaxCurve,
}

impl Default for VelocityOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            velocity: MinMaxCurveVector3::default(),
            space: SimulationSpace::Local,
            radial: MinMaxCurve::Constant(0.0),
            speed_modifier: default_speed_modifier(),
        }
    }
}

impl ParticleModule for VelocityOverLifetimeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.velocity_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, ctx: &UpdateContext) {
        let t = particle.rate_at_life_time;
        let r = particle.cache.velocity_random;

        let mut velocity = ctx.space.vector(self.velocity.get_value(t, r), self.space);
        if !self.radial.is_zero() {
            let outward = (particle.position - ctx.space.emitter_origin()).normalize_or_zero();
            velocity += outward * self.radial.get_value(t, r);
        }
        particle.set_velocity_contribution(ContributionName::VelocityOverLifetime, velocity);

        let modifier = self.speed_modifier.get_value(t, r);
        particle.set_velocity_contribution(
            ContributionName::SpeedModifier,
            particle.velocity * (modifier - 1.0),
        );
    }
}

/// Caps particle speed and applies drag.
///
/// This module writes the base velocity directly, scaled by each particle's frame
/// interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct LimitVelocityOverLifetimeModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Limit each axis separately using `limit_xyz`. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate_axes: bool,
    /// Speed limit. Defaults to `1.0`.
    #[serde(default = "default_speed_limit")]
    pub limit: MinMaxCurve,
    /// Per-axis speed limit. Defaults to `1.0` on every axis.
    #[serde(default = "default_speed_limit_xyz")]
    pub limit_xyz: MinMaxCurveVector3,
    /// Space the per-axis limit is expressed in. Defaults to [`SimulationSpace::Local`].
    #[serde(default, skip_serializing_if = "SimulationSpace::is_default")]
    pub space: SimulationSpace,
    /// Fraction of the excess speed removed per reference frame, from `0.0` to `1.0`.
    ///
    /// Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub dampen: f32,
    /// Linear drag coefficient. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub drag: MinMaxCurve,
    /// Scale drag by the particle's mean size. Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub multiply_drag_by_size: bool,
    /// Scale drag by the particle's speed. Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub multiply_drag_by_velocity: bool,
}

impl Default for LimitVelocityOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            separate_axes: false,
            limit: default_speed_limit(),
            limit_xyz: default_speed_limit_xyz(),
            space: SimulationSpace::Local,
            dampen: 0.0,
            drag: MinMaxCurve::Constant(0.0),
            multiply_drag_by_size: true,
            multiply_drag_by_velocity: true,
        }
    }
}

fn limit_component(value: f32, limit: f32, keep: f32) -> f32 {
    let limit = limit.abs();
    let magnitude = value.abs();
    if magnitude <= limit {
        return value;
    }
    value.signum() * (limit + (magnitude - limit) * keep)
}

impl ParticleModule for LimitVelocityOverLifetimeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.limit_velocity_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, ctx: &UpdateContext) {
        let dt = particle.delta_time();
        if dt <= 0.0 {
            return;
        }
        let t = particle.rate_at_life_time;
        let r = particle.cache.limit_velocity_random;
        let keep = (1.0 - self.dampen.clamp(0.0, 1.0)).powf(dt * DAMPEN_REFERENCE_RATE);

        let total = particle.total_velocity();
        let limited = if self.separate_axes {
            let local = ctx.space.vector_into(total, self.space);
            let limit = self.limit_xyz.get_value(t, r);
            let clamped = Vec3::new(
                limit_component(local.x, limit.x, keep),
                limit_component(local.y, limit.y, keep),
                limit_component(local.z, limit.z, keep),
            );
            ctx.space.vector(clamped, self.space)
        } else {
            let speed = total.length();
            let limit = self.limit.get_value(t, r).abs();
            if speed > limit {
                total * ((limit + (speed - limit) * keep) / speed)
            } else {
                total
            }
        };
        particle.velocity += limited - total;

        if !self.drag.is_zero() {
            let mut k = self.drag.get_value(t, r).max(0.0);
            if self.multiply_drag_by_size {
                k *= (particle.size.x + particle.size.y + particle.size.z) / 3.0;
            }
            let total = particle.total_velocity();
            if self.multiply_drag_by_velocity {
                k *= total.length();
            }
            particle.velocity -= total * (1.0 - (-k * dt).exp());
        }
    }
}

/// When emitter velocity is applied to particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum InheritVelocityMode {
    /// Added once at birth.
    #[default]
    Initial,
    /// Follows the emitter's current velocity every frame.
    Current,
}

/// Transfers the emitter's world velocity to particles.
///
/// Only has an effect for world space simulation; local space particles already move
/// with the emitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct InheritVelocityModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Defaults to [`InheritVelocityMode::Initial`].
    #[serde(default)]
    pub mode: InheritVelocityMode,
    /// Fraction of the emitter velocity, over particle lifetime. Defaults to `0.0`.
    #[serde(default)]
    pub multiplier: MinMaxCurve,
}

impl Default for InheritVelocityModule {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: InheritVelocityMode::Initial,
            multiplier: MinMaxCurve::Constant(0.0),
        }
    }
}

impl ParticleModule for InheritVelocityModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        let r = ctx.rng.f32();
        particle.cache.inherit_random = r;
        if self.mode == InheritVelocityMode::Initial
            && ctx.space.simulation_space == SimulationSpace::World
        {
            particle.velocity += ctx.emitter_velocity * self.multiplier.get_value(0.0, r);
        }
    }

    fn update_particle_state(&self, particle: &mut Particle, ctx: &UpdateContext) {
        if self.mode != InheritVelocityMode::Current
            || ctx.space.simulation_space != SimulationSpace::World
        {
            return;
        }
        let multiplier = self
            .multiplier
            .get_value(particle.rate_at_life_time, particle.cache.inherit_random);
        particle.set_velocity_contribution(
            ContributionName::InheritVelocity,
            ctx.emitter_velocity * multiplier,
        );
    }
}
