//! Emission shapes.
//!
//! Every shape samples a position and an initial direction in the shape's local
//! space. Degenerate parameters never fail: they produce a point at the origin with a
//! zero direction.

mod box_shape;
mod circle;
mod cone;
mod edge;
mod sphere;

pub use box_shape::{BoxEmitFrom, BoxShape};
pub use circle::CircleShape;
pub use cone::{ConeEmitFrom, ConeShape};
pub use edge::EdgeShape;
pub use sphere::{HemisphereShape, SphereShape};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::asset::MinMaxCurve;
use crate::random::ParticleRng;

/// A shape that can place newly emitted particles.
pub trait EmitterShape {
    /// Samples a position and direction in shape local space.
    ///
    /// `arc` is the normalized position around the shape's arc chosen by the caller's
    /// [`ArcMode`]. When it is `None` the shape picks a random one.
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    );
}

/// How the emission point travels around an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum ArcMode {
    /// A random point per particle.
    #[default]
    Random,
    /// Sweeps around the arc and wraps.
    Loop,
    /// Sweeps back and forth.
    PingPong,
    /// Spreads each burst evenly around the arc.
    BurstSpread,
}

fn default_arc() -> f32 {
    360.0
}

fn default_arc_speed() -> MinMaxCurve {
    MinMaxCurve::Constant(1.0)
}

/// Arc sweep settings shared by cones, circles and edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct ArcSettings {
    /// Sweep mode. Defaults to [`ArcMode::Random`].
    #[serde(default)]
    pub mode: ArcMode,
    /// Angular extent of the arc in degrees. Defaults to `360.0`.
    #[serde(default = "default_arc")]
    pub arc: f32,
    /// Snaps emission to multiples of this fraction of the arc. `0.0` disables
    /// snapping. Defaults to `0.0`.
    #[serde(default)]
    pub spread: f32,
    /// Sweeps per second for [`ArcMode::Loop`] and [`ArcMode::PingPong`], sampled by
    /// the emitter's duration phase. Defaults to `1.0`.
    #[serde(default = "default_arc_speed")]
    pub speed: MinMaxCurve,
}

impl Default for ArcSettings {
    fn default() -> Self {
        Self {
            mode: ArcMode::Random,
            arc: default_arc(),
            spread: 0.0,
            speed: default_arc_speed(),
        }
    }
}

impl ArcSettings {
    /// Normalized arc position for a particle.
    ///
    /// `phase` is the sweep phase kept by the shape module; `batch` is the index and
    /// size of the emission batch the particle belongs to.
    pub fn sample(&self, rng: &mut ParticleRng, phase: f32, batch: (u32, u32)) -> f32 {
        let t = match self.mode {
            ArcMode::Random => rng.f32(),
            ArcMode::Loop => phase.rem_euclid(1.0),
            ArcMode::PingPong => {
                let p = phase.rem_euclid(2.0);
                if p > 1.0 { 2.0 - p } else { p }
            }
            ArcMode::BurstSpread => {
                let (index, count) = batch;
                if count == 0 {
                    0.0
                } else {
                    index as f32 / count as f32
                }
            }
        };
        if self.spread > 0.0 {
            ((t / self.spread).floor() * self.spread).clamp(0.0, 1.0)
        } else {
            t
        }
    }
}

/// The shape particles are emitted from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub enum ParticleSystemShape {
    /// Sphere around the origin.
    Sphere(SphereShape),
    /// Half sphere facing +Z.
    Hemisphere(HemisphereShape),
    /// Cone opening along +Z.
    Cone(ConeShape),
    /// Axis-aligned box.
    Box(BoxShape),
    /// Disc in the XY plane.
    Circle(CircleShape),
    /// Line segment along X emitting along +Y.
    Edge(EdgeShape),
}

impl Default for ParticleSystemShape {
    fn default() -> Self {
        Self::Cone(ConeShape::default())
    }
}

impl ParticleSystemShape {
    /// Arc settings of arc-based shapes.
    pub fn arc(&self) -> Option<&ArcSettings> {
        match self {
            Self::Cone(s) => Some(&s.arc),
            Self::Circle(s) => Some(&s.arc),
            Self::Edge(s) => Some(&s.arc),
            _ => None,
        }
    }
}

impl EmitterShape for ParticleSystemShape {
    fn calc_particle_pos_dir(
        &self,
        rng: &mut ParticleRng,
        arc: Option<f32>,
        position: &mut Vec3,
        direction: &mut Vec3,
    ) {
        match self {
            Self::Sphere(s) => s.calc_particle_pos_dir(rng, arc, position, direction),
            Self::Hemisphere(s) => s.calc_particle_pos_dir(rng, arc, position, direction),
            Self::Cone(s) => s.calc_particle_pos_dir(rng, arc, position, direction),
            Self::Box(s) => s.calc_particle_pos_dir(rng, arc, position, direction),
            Self::Circle(s) => s.calc_particle_pos_dir(rng, arc, position, direction),
            Self::Edge(s) => s.calc_particle_pos_dir(rng, arc, position, direction),
        }
    }
}

pub(crate) fn is_degenerate(value: f32) -> bool {
    value.is_nan() || value <= 0.0
}

pub(crate) fn degenerate(position: &mut Vec3, direction: &mut Vec3) {
    *position = Vec3::ZERO;
    *direction = Vec3::ZERO;
}
