use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ArcSettings, EmitterShape, degenerate, is_degenerate};
use crate::asset::serde_helpers::default_one_f32;
use crate::random::ParticleRng;

/// Which part of a cone particles are emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum ConeEmitFrom {
    /// Anywhere on the base disc.
    #[default]
    Base,
    /// The rim of the base disc.
    BaseShell,
    /// Anywhere inside the cone up to `length`.
    Volume,
    /// The cone's side surface up to `length`.
    VolumeShell,
}

fn default_cone_angle() -> f32 {
    25.0
}

fn default_cone_length() -> f32 {
    5.0
}

/// A cone opening along +Z from a base disc of `radius`.
///
/// Directions tilt outwards by up to `angle` degrees depending on how far from the
/// axis the particle starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct ConeShape {
    /// Half angle of the cone in degrees, clamped to `[0, 90]`. Defaults to `25.0`.
    #[serde(default = "default_cone_angle")]
    pub angle: f32,
    /// Radius of the base disc. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub radius: f32,
    /// Depth of the emission volume for the volume modes. Defaults to `5.0`.
    #[serde(default = "default_cone_length")]
    pub length: f32,
    /// Emission region. Defaults to [`ConeEmitFrom::Base`].
    #[serde(default)]
    pub emit_from: ConeEmitFrom,
    /// Arc around the cone axis.
    #[serde(default)]
    pub arc: ArcSettings,
}

impl Default for ConeShape {
    fn default() -> Self {
        Self {
            angle: default_cone_angle(),
            radius: 1.0,
            length: default_cone_length(),
            emit_from: ConeEmitFrom::Base,
            arc: ArcSettings::default(),
        }
    }
}

impl EmitterShape for ConeShape {
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    ) {
        if is_degenerate(self.radius) || self.length.is_nan() || self.length < 0.0 {
            degenerate(position, direction);
            return;
        }
        let t = arc.unwrap_or_else(|| rng.f32());
        let theta = (t * self.arc.arc).to_radians();
        let (sin_theta, cos_theta) = theta.sin_cos();

        let shell = matches!(
            self.emit_from,
            ConeEmitFrom::BaseShell | ConeEmitFrom::VolumeShell
        );
        let rho = if shell { 1.0 } else { rng.f32().sqrt() };

        let tilt = self.angle.clamp(0.0, 90.0).to_radians() * rho;
        let (sin_tilt, cos_tilt) = tilt.sin_cos();
        let dir = Vec3::new(cos_theta * sin_tilt, sin_theta * sin_tilt, cos_tilt);

        let mut pos = Vec3::new(cos_theta, sin_theta, 0.0) * rho * self.radius;
        if matches!(
            self.emit_from,
            ConeEmitFrom::Volume | ConeEmitFrom::VolumeShell
        ) && cos_tilt > f32::EPSILON
        {
            let depth = rng.f32() * self.length;
            pos += dir * (depth / cos_tilt);
        }

        *position = pos;
        *direction = dir;
    }
}
