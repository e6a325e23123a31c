use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{FrameInfo, ParticleModule, SpawnContext};
use crate::asset::serde_helpers::{
    default_one_vec3, default_true, is_one_vec3, is_true, is_zero_f32, is_zero_vec3,
};
use crate::particle::Particle;
use crate::shapes::{ArcMode, ArcSettings, EmitterShape, ParticleSystemShape};
use crate::space::SimulationSpace;

/// Places new particles on the emission shape and aims them along its direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct ShapeModule {
    /// Defaults to `true`. When disabled particles start at the emitter origin heading
    /// along +Z.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// The shape. Defaults to a cone.
    #[serde(default)]
    pub shape: ParticleSystemShape,
    /// Offset of the shape from the emitter. Defaults to [`Vec3::ZERO`].
    #[serde(default, skip_serializing_if = "is_zero_vec3")]
    pub position: Vec3,
    /// Rotation of the shape as XYZ Euler angles in degrees. Defaults to [`Vec3::ZERO`].
    #[serde(default, skip_serializing_if = "is_zero_vec3")]
    pub rotation: Vec3,
    /// Scale of the shape. Defaults to [`Vec3::ONE`].
    #[serde(default = "default_one_vec3", skip_serializing_if = "is_one_vec3")]
    pub scale: Vec3,
    /// Blend towards a random direction, from `0.0` to `1.0`. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub randomize_direction_amount: f32,
    /// Blend towards the direction away from the shape center, from `0.0` to `1.0`.
    ///
    /// Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub spherize_direction_amount: f32,
    #[serde(skip)]
    #[reflect(ignore)]
    arc_phase: f32,
}

impl Default for ShapeModule {
    fn default() -> Self {
        Self {
            enabled: true,
            shape: ParticleSystemShape::default(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            randomize_direction_amount: 0.0,
            spherize_direction_amount: 0.0,
            arc_phase: 0.0,
        }
    }
}

impl ShapeModule {
    /// A module emitting from `shape` with an identity transform.
    pub fn new(shape: ParticleSystemShape) -> Self {
        Self {
            shape,
            ..default()
        }
    }

    /// Current sweep phase of Loop and PingPong arcs, in sweeps.
    pub fn arc_phase(&self) -> f32 {
        self.arc_phase
    }

    // `arc_phase` already includes this frame's sweep.
    fn phase_at_birth(&self, arc: &ArcSettings, ctx: &SpawnContext) -> f32 {
        match arc.mode {
            ArcMode::Loop | ArcMode::PingPong => {
                let speed = arc.speed.get_value(ctx.rate_at_duration, 0.5);
                self.arc_phase - speed * ctx.birth_offset
            }
            ArcMode::Random | ArcMode::BurstSpread => self.arc_phase,
        }
    }

    fn shape_rotation(&self) -> Quat {
        let r = self.rotation * std::f32::consts::PI / 180.0;
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }
}

impl ParticleModule for ShapeModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        let arc = match self.shape.arc() {
            Some(arc) => {
                let phase = self.phase_at_birth(arc, ctx);
                Some(arc.sample(ctx.rng, phase, ctx.batch))
            }
            None => None,
        };

        let (mut pos, mut dir) = (Vec3::ZERO, Vec3::ZERO);
        self.shape
            .calc_particle_pos_dir(ctx.rng, arc, &mut pos, &mut dir);

        let rotation = self.shape_rotation();
        pos = rotation * (pos * self.scale) + self.position;
        dir = (rotation * (dir * self.scale)).normalize_or_zero();

        if self.randomize_direction_amount > 0.0 && dir != Vec3::ZERO {
            let random = ctx.rng.unit_vector();
            dir = dir
                .lerp(random, self.randomize_direction_amount.clamp(0.0, 1.0))
                .normalize_or_zero();
        }
        if self.spherize_direction_amount > 0.0 && dir != Vec3::ZERO {
            let outward = (pos - self.position).normalize_or_zero();
            dir = dir
                .lerp(outward, self.spherize_direction_amount.clamp(0.0, 1.0))
                .normalize_or_zero();
        }

        place(particle, ctx, pos, dir);
    }

    fn update(&mut self, frame: &FrameInfo) {
        let Some(arc) = self.shape.arc() else {
            return;
        };
        if matches!(arc.mode, ArcMode::Loop | ArcMode::PingPong) {
            let speed = arc.speed.get_value(frame.rate_at_duration, 0.5);
            self.arc_phase += speed * frame.interval;
        }
    }
}

fn place(particle: &mut Particle, ctx: &SpawnContext, local_pos: Vec3, local_dir: Vec3) {
    let space = &ctx.space;
    particle.position = match ctx.origin {
        Some(world) => {
            space.point(world, SimulationSpace::World)
                + space.vector(local_pos, SimulationSpace::Local)
        }
        None => space.point(local_pos, SimulationSpace::Local),
    };
    let direction = space
        .vector(local_dir, SimulationSpace::Local)
        .normalize_or_zero();
    particle.velocity = direction * particle.start_speed;
}

/// Placement used when the shape module is disabled.
pub(super) fn emit_from_origin(particle: &mut Particle, ctx: &mut SpawnContext) {
    place(particle, ctx, Vec3::ZERO, Vec3::Z);
}
