use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ArcSettings, EmitterShape, degenerate, is_degenerate};
use crate::asset::serde_helpers::default_one_f32;
use crate::random::ParticleRng;

/// A segment from `-radius` to `radius` along X. Particles head along +Y.
///
/// The arc settings control how the emission point moves along the segment; the
/// `arc` angle itself is unused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct EdgeShape {
    /// Half length of the segment. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub radius: f32,
    /// Sweep along the segment.
    #[serde(default)]
    pub arc: ArcSettings,
}

impl Default for EdgeShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            arc: ArcSettings::default(),
        }
    }
}

impl EmitterShape for EdgeShape {
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
        *position = Vec3::new((t * 2.0 - 1.0) * self.radius, 0.0, 0.0);
        *direction = Vec3::Y;
    }
}
