use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ArcSettings, EmitterShape, degenerate, is_degenerate};
use crate::asset::serde_helpers::{default_one_f32, is_false};
use crate::random::ParticleRng;

/// A disc in the XY plane. Particles head radially outwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct CircleShape {
    /// Disc radius. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub radius: f32,
    /// Emit only from the rim. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub emit_from_edge: bool,
    /// Arc around the disc.
    #[serde(default)]
    pub arc: ArcSettings,
}

impl Default for CircleShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            emit_from_edge: false,
            arc: ArcSettings::default(),
        }
    }
}

impl EmitterShape for CircleShape {
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    ) {
        if is_degenerate(self.radius) {
            degenerate(position, direction);
            return;
        }
        let t = arc.unwrap_or_else(|| rng.f32());
        let theta = (t * self.arc.arc).to_radians();
        let dir = Vec3::new(theta.cos(), theta.sin(), 0.0);
        let rho = if self.emit_from_edge {
            1.0
        } else {
            rng.f32().sqrt()
        };
        *position = dir * rho * self.radius;
        *direction = dir;
    }
}
