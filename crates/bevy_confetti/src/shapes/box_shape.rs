use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{EmitterShape, degenerate};
use crate::asset::serde_helpers::default_one_vec3;
use crate::random::ParticleRng;

/// Which part of a box particles are emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum BoxEmitFrom {
    /// Anywhere inside.
    #[default]
    Volume,
    /// The six faces.
    Shell,
    /// The twelve edges.
    Edge,
}

/// An axis-aligned box centered on the origin.
///
/// Shell particles head along the outward normal of their face. Volume and edge
/// particles head along +Z.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct BoxShape {
    /// Full extents. Defaults to [`Vec3::ONE`].
    #[serde(default = "default_one_vec3")]
    pub size: Vec3,
    /// Emission region. Defaults to [`BoxEmitFrom::Volume`].
    #[serde(default)]
    pub emit_from: BoxEmitFrom,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            size: Vec3::ONE,
            emit_from: BoxEmitFrom::Volume,
        }
    }
}

impl BoxShape {
    fn sample_shell(&self, rng: &mut ParticleRng, half: Vec3) -> (Vec3, Vec3) {
        let areas = [
            self.size.y * self.size.z,
            self.size.x * self.size.z,
            self.size.x * self.size.y,
        ];
        let total = areas[0] + areas[1] + areas[2];
        let mut p = Vec3::new(rng.signed(), rng.signed(), rng.signed()) * half;
        if total <= 0.0 {
            return (p, Vec3::Z);
        }
        let pick = rng.f32() * total;
        let axis = if pick < areas[0] {
            0
        } else if pick < areas[0] + areas[1] {
            1
        } else {
            2
        };
        let side = if rng.f32() < 0.5 { -1.0 } else { 1.0 };
        p[axis] = half[axis] * side;
        let mut normal = Vec3::ZERO;
        normal[axis] = side;
        (p, normal)
    }

    fn sample_edge(&self, rng: &mut ParticleRng, half: Vec3) -> Vec3 {
        let total = self.size.x + self.size.y + self.size.z;
        let along = if total <= 0.0 {
            0
        } else {
            let pick = rng.f32() * total;
            if pick < self.size.x {
                0
            } else if pick < self.size.x + self.size.y {
                1
            } else {
                2
            }
        };
        let corner = |rng: &mut ParticleRng| if rng.f32() < 0.5 { -1.0 } else { 1.0 };
        let mut p = Vec3::new(corner(rng), corner(rng), corner(rng)) * half;
        p[along] = rng.signed() * half[along];
        p
    }
}

impl EmitterShape for BoxShape {
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        _arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    ) {
        if self.size.is_nan() || self.size.min_element() < 0.0 {
            degenerate(position, direction);
            return;
        }
        let half = self.size * 0.5;
        (*position, *direction) = match self.emit_from {
            BoxEmitFrom::Volume => (
                Vec3::new(rng.signed(), rng.signed(), rng.signed()) * half,
                Vec3::Z,
            ),
            BoxEmitFrom::Shell => self.sample_shell(rng, half),
            BoxEmitFrom::Edge => (self.sample_edge(rng, half), Vec3::Z),
        };
    }
}
