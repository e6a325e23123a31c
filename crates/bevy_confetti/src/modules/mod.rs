//! Particle modules.
//!
//! Each module owns one slice of particle behavior. The set is closed and runs in a
//! fixed order, see [`ParticleModules`].

mod collision;
mod color;
mod emission;
mod force;
mod main;
mod noise;
mod rotation;
mod shape;
mod size;
mod sub_emitters;
mod texture_sheet;
mod velocity;

pub use collision::{Collider, ColliderShape, CollisionMode, CollisionModule};
pub use color::{ColorBySpeedModule, ColorOverLifetimeModule};
pub use emission::{EmissionModule, EmissionSample, ParticleEmissionBurst};
pub use force::ForceOverLifetimeModule;
pub use main::{GRAVITY, MainModule, StartRotation, StartSize, StopBehavior};
pub use noise::{NoiseModule, NoiseQuality};
pub use rotation::{RotationBySpeedModule, RotationOverLifetimeModule};
pub use shape::ShapeModule;
pub use size::{SizeBySpeedModule, SizeOverLifetimeModule};
pub use sub_emitters::{
    InheritedState, SubEmitEvent, SubEmitKind, SubEmitterEntry, SubEmitterProperties,
    SubEmitterTarget, SubEmitterType, SubEmittersModule,
};
pub use texture_sheet::{TextureSheetAnimation, TextureSheetAnimationModule, TextureSheetRow};
pub use velocity::{
    InheritVelocityMode, InheritVelocityModule, LimitVelocityOverLifetimeModule,
    VelocityOverLifetimeModule,
};

use bevy::prelude::*;

use crate::asset::EmitterData;
use crate::particle::Particle;
use crate::random::ParticleRng;
use crate::space::{EmitterTransform, SimulationSpace};

/// Behavior unit of a particle system.
///
/// Disabled modules are skipped entirely. Modules only touch shared particle fields
/// through named contributions, so recomputing a module every frame replaces its own
/// share instead of compounding it.
pub trait ParticleModule {
    /// Whether the module participates in the simulation.
    fn enabled(&self) -> bool;

    /// Sets the initial values this module owns. Called once when a particle spawns.
    fn init_particle_state(&mut self, _particle: &mut Particle, _ctx: &mut SpawnContext) {}

    /// Recomputes this module's contribution for an active particle.
    fn update_particle_state(&self, _particle: &mut Particle, _ctx: &UpdateContext) {}

    /// System-wide per-frame hook.
    fn update(&mut self, _frame: &FrameInfo) {}
}

/// Frame-wide timing passed to [`ParticleModule::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Scaled frame interval in seconds.
    pub interval: f32,
    /// System time after this frame.
    pub time: f32,
    /// The emitter's duration phase after this frame.
    pub rate_at_duration: f32,
}

/// The emitter transform paired with the simulation space particles live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceContext {
    /// Emitter local to world transform.
    pub transform: EmitterTransform,
    /// Space particle kinematics are computed in.
    pub simulation_space: SimulationSpace,
}

impl SpaceContext {
    /// Converts a vector expressed in `space` into simulation space.
    pub fn vector(&self, v: Vec3, space: SimulationSpace) -> Vec3 {
        self.transform
            .convert_vector(v, space, self.simulation_space)
    }

    /// Converts a simulation space vector into `space`.
    pub fn vector_into(&self, v: Vec3, space: SimulationSpace) -> Vec3 {
        self.transform
            .convert_vector(v, self.simulation_space, space)
    }

    /// Converts a point expressed in `space` into simulation space.
    pub fn point(&self, p: Vec3, space: SimulationSpace) -> Vec3 {
        self.transform.convert_point(p, space, self.simulation_space)
    }

    /// Simulation space point to world space.
    pub fn to_world_point(&self, p: Vec3) -> Vec3 {
        self.transform
            .convert_point(p, self.simulation_space, SimulationSpace::World)
    }

    /// Simulation space vector to world space.
    pub fn to_world_vector(&self, v: Vec3) -> Vec3 {
        self.transform
            .convert_vector(v, self.simulation_space, SimulationSpace::World)
    }

    /// The emitter origin in simulation space.
    pub fn emitter_origin(&self) -> Vec3 {
        self.point(Vec3::ZERO, SimulationSpace::Local)
    }
}

/// Context for [`ParticleModule::init_particle_state`].
pub struct SpawnContext<'a> {
    /// Space conversions.
    pub space: SpaceContext,
    /// World point to emit from instead of the emitter origin.
    pub origin: Option<Vec3>,
    /// Emitter velocity in world space.
    pub emitter_velocity: Vec3,
    /// The emitter's duration phase at the particle's birth time.
    pub rate_at_duration: f32,
    /// Seconds between the particle's birth and the current system time.
    pub birth_offset: f32,
    /// Index of the particle within its emission batch, and the batch size.
    pub batch: (u32, u32),
    /// The system's random source.
    pub rng: &'a mut ParticleRng,
}

/// Context for [`ParticleModule::update_particle_state`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateContext {
    /// Space conversions.
    pub space: SpaceContext,
    /// Emitter velocity in world space.
    pub emitter_velocity: Vec3,
    /// The emitter's current duration phase.
    pub rate_at_duration: f32,
    /// Current system time.
    pub time: f32,
}

/// Normalized position of `speed` within `range`, clamped to `[0, 1]`.
pub(crate) fn speed_phase(speed: f32, range: Vec2) -> f32 {
    let span = range.y - range.x;
    if span <= f32::EPSILON {
        return if speed >= range.y { 1.0 } else { 0.0 };
    }
    ((speed - range.x) / span).clamp(0.0, 1.0)
}

pub(crate) fn default_speed_range() -> Vec2 {
    Vec2::new(0.0, 1.0)
}

fn init<M: ParticleModule>(module: &mut M, particle: &mut Particle, ctx: &mut SpawnContext) {
    if module.enabled() {
        module.init_particle_state(particle, ctx);
    }
}

fn update<M: ParticleModule>(module: &M, particle: &mut Particle, ctx: &UpdateContext) {
    if module.enabled() {
        module.update_particle_state(particle, ctx);
    }
}

fn frame<M: ParticleModule>(module: &mut M, info: &FrameInfo) {
    if module.enabled() {
        module.update(info);
    }
}

/// Every module of one particle system, run in a fixed order.
///
/// Per-particle hooks run Main, Shape, VelocityOverLifetime, LimitVelocityOverLifetime,
/// InheritVelocity, ForceOverLifetime, ColorOverLifetime, ColorBySpeed,
/// SizeOverLifetime, SizeBySpeed, RotationOverLifetime, RotationBySpeed, Noise,
/// Collision, TextureSheetAnimation and finally SubEmitters. Emission decides how many
/// particles spawn and takes no part in the per-particle loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleModules {
    /// Lifetime, start values, gravity and system settings.
    pub main: MainModule,
    /// Emission rates and bursts.
    pub emission: EmissionModule,
    /// Emission shape.
    pub shape: ShapeModule,
    /// Velocity over lifetime.
    pub velocity_over_lifetime: VelocityOverLifetimeModule,
    /// Speed limit and drag.
    pub limit_velocity_over_lifetime: LimitVelocityOverLifetimeModule,
    /// Emitter velocity inheritance.
    pub inherit_velocity: InheritVelocityModule,
    /// Force over lifetime.
    pub force_over_lifetime: ForceOverLifetimeModule,
    /// Color over lifetime.
    pub color_over_lifetime: ColorOverLifetimeModule,
    /// Color by speed.
    pub color_by_speed: ColorBySpeedModule,
    /// Size over lifetime.
    pub size_over_lifetime: SizeOverLifetimeModule,
    /// Size by speed.
    pub size_by_speed: SizeBySpeedModule,
    /// Rotation over lifetime.
    pub rotation_over_lifetime: RotationOverLifetimeModule,
    /// Rotation by speed.
    pub rotation_by_speed: RotationBySpeedModule,
    /// Noise.
    pub noise: NoiseModule,
    /// Collision against simple colliders.
    pub collision: CollisionModule,
    /// Texture sheet animation.
    pub texture_sheet_animation: TextureSheetAnimationModule,
    /// Sub-emitters.
    pub sub_emitters: SubEmittersModule,
}

impl From<&EmitterData> for ParticleModules {
    fn from(data: &EmitterData) -> Self {
        Self {
            main: data.main.clone(),
            emission: data.emission.clone(),
            shape: data.shape.clone(),
            velocity_over_lifetime: data.velocity_over_lifetime.clone(),
            limit_velocity_over_lifetime: data.limit_velocity_over_lifetime.clone(),
            inherit_velocity: data.inherit_velocity.clone(),
            force_over_lifetime: data.force_over_lifetime.clone(),
            color_over_lifetime: data.color_over_lifetime.clone(),
            color_by_speed: data.color_by_speed.clone(),
            size_over_lifetime: data.size_over_lifetime.clone(),
            size_by_speed: data.size_by_speed.clone(),
            rotation_over_lifetime: data.rotation_over_lifetime.clone(),
            rotation_by_speed: data.rotation_by_speed.clone(),
            noise: data.noise.clone(),
            collision: data.collision.clone(),
            texture_sheet_animation: data.texture_sheet_animation.clone(),
            sub_emitters: data.sub_emitters.clone(),
        }
    }
}

impl ParticleModules {
    /// Runs every enabled module's init hook in order.
    pub fn init_particle(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        init(&mut self.main, particle, ctx);
        if self.shape.enabled() {
            self.shape.init_particle_state(particle, ctx);
        } else {
            shape::emit_from_origin(particle, ctx);
        }
        init(&mut self.velocity_over_lifetime, particle, ctx);
        init(&mut self.limit_velocity_over_lifetime, particle, ctx);
        init(&mut self.inherit_velocity, particle, ctx);
        init(&mut self.force_over_lifetime, particle, ctx);
        init(&mut self.color_over_lifetime, particle, ctx);
        init(&mut self.color_by_speed, particle, ctx);
        init(&mut self.size_over_lifetime, particle, ctx);
        init(&mut self.size_by_speed, particle, ctx);
        init(&mut self.rotation_over_lifetime, particle, ctx);
        init(&mut self.rotation_by_speed, particle, ctx);
        init(&mut self.noise, particle, ctx);
        init(&mut self.collision, particle, ctx);
        init(&mut self.texture_sheet_animation, particle, ctx);
        init(&mut self.sub_emitters, particle, ctx);
    }

    /// Runs every enabled module's update hook in order.
    pub fn update_particle(&self, particle: &mut Particle, ctx: &UpdateContext) {
        update(&self.main, particle, ctx);
        update(&self.shape, particle, ctx);
        update(&self.velocity_over_lifetime, particle, ctx);
        update(&self.limit_velocity_over_lifetime, particle, ctx);
        update(&self.inherit_velocity, particle, ctx);
        update(&self.force_over_lifetime, particle, ctx);
        update(&self.color_over_lifetime, particle, ctx);
        update(&self.color_by_speed, particle, ctx);
        update(&self.size_over_lifetime, particle, ctx);
        update(&self.size_by_speed, particle, ctx);
        update(&self.rotation_over_lifetime, particle, ctx);
        update(&self.rotation_by_speed, particle, ctx);
        update(&self.noise, particle, ctx);
        update(&self.collision, particle, ctx);
        update(&self.texture_sheet_animation, particle, ctx);
        update(&self.sub_emitters, particle, ctx);
    }

    /// Runs every enabled module's per-frame hook.
    pub fn update(&mut self, info: &FrameInfo) {
        frame(&mut self.main, info);
        frame(&mut self.emission, info);
        frame(&mut self.shape, info);
        frame(&mut self.velocity_over_lifetime, info);
        frame(&mut self.limit_velocity_over_lifetime, info);
        frame(&mut self.inherit_velocity, info);
        frame(&mut self.force_over_lifetime, info);
        frame(&mut self.color_over_lifetime, info);
        frame(&mut self.color_by_speed, info);
        frame(&mut self.size_over_lifetime, info);
        frame(&mut self.size_by_speed, info);
        frame(&mut self.rotation_over_lifetime, info);
        frame(&mut self.rotation_by_speed, info);
        frame(&mut self.noise, info);
        frame(&mut self.collision, info);
        frame(&mut self.texture_sheet_animation, info);
        frame(&mut self.sub_emitters, info);
    }
}
