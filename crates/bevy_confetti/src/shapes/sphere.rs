use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{EmitterShape, degenerate, is_degenerate};
use crate::asset::serde_helpers::{default_one_f32, is_false};
use crate::random::ParticleRng;

/// Emits from the volume or surface of a sphere, directed outwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct SphereShape {
    /// Sphere radius. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub radius: f32,
    /// Emit only from the surface. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub emit_from_shell: bool,
}

impl Default for SphereShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            emit_from_shell: false,
        }
    }
}

impl EmitterShape for SphereShape {
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        _arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    ) {
        if is_degenerate(self.radius) {
            degenerate(position, direction);
            return;
        }
        let dir = rng.unit_vector();
        let distance = if self.emit_from_shell {
            self.radius
        } else {
            self.radius * rng.f32().cbrt()
        };
        *position = dir * distance;
        *direction = dir;
    }
}

/// Emits from the +Z half of a sphere, directed outwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct HemisphereShape {
    /// Hemisphere radius. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub radius: f32,
    /// Emit only from the curved surface. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub emit_from_shell: bool,
}

impl Default for HemisphereShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            emit_from_shell: false,
        }
    }
}

impl EmitterShape for HemisphereShape {
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    ) {
        let sphere = SphereShape {
            radius: self.radius,
            emit_from_shell: self.emit_from_shell,
        };
        sphere.calc_particle_pos_dir(rng, arc, position, direction);
        position.z = position.z.abs();
        direction.z = direction.z.abs();
    }
}
