use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::modules::SpaceContext;
use crate::particle::Particle;
use crate::system::ParticleSystem;

/// Renderer-facing snapshot of one particle, laid out for direct upload to an
/// instance buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ParticleInstance {
    /// World position in `xyz`, normalized age in `w`.
    pub position: [f32; 4],
    /// Rotation per axis in radians, `w` unused.
    pub rotation: [f32; 4],
    /// Size per axis, `w` unused.
    pub size: [f32; 4],
    /// Linear rgba.
    pub color: [f32; 4],
    /// Texture tile scale in `xy` and tile offset in `zw`.
    pub tiling_offset: [f32; 4],
    /// UV flip in `xy`, sub-emit depth in `z`, `w` unused.
    pub flip: [f32; 4],
}

impl ParticleInstance {
    /// Snapshots `particle`, moving its position out of simulation space.
    pub fn from_particle(particle: &Particle, space: &SpaceContext) -> Self {
        let position = space.to_world_point(particle.position);
        let rotation = particle.rotation * std::f32::consts::PI / 180.0;
        Self {
            position: position.extend(particle.rate_at_life_time).to_array(),
            rotation: rotation.extend(0.0).to_array(),
            size: particle.size.extend(0.0).to_array(),
            color: particle.color.to_f32_array(),
            tiling_offset: particle.tiling_offset.to_array(),
            flip: [
                particle.flip_uv.x,
                particle.flip_uv.y,
                particle.sub_emit_depth() as f32,
                0.0,
            ],
        }
    }
}

/// Per-emitter instance data rebuilt every frame from the emitter's particle system.
#[derive(Component, Debug, Clone, Default)]
pub struct ParticleInstances(pub Vec<ParticleInstance>);

impl ParticleInstances {
    /// Replaces the contents with a snapshot of every active particle of `system`.
    pub fn rebuild(&mut self, system: &ParticleSystem) {
        let space = system.space();
        self.0.clear();
        self.0.extend(
            system
                .particles()
                .iter()
                .map(|p| ParticleInstance::from_particle(p, &space)),
        );
    }

    /// The instances as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0)
    }
}
