use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{FrameInfo, ParticleModule, SpawnContext, UpdateContext};
use crate::asset::serde_helpers::{default_true, is_false, is_true, serde_default};
use crate::asset::{MinMaxCurve, MinMaxCurveVector3};
use crate::particle::{ContributionName, Particle};

serde_default!(strength, MinMaxCurveVector3, MinMaxCurveVector3::splat(1.0));
serde_default!(frequency, f32, 0.5);
serde_default!(octave_count, u32, 1);
serde_default!(octave_multiplier, f32, 0.5);
serde_default!(octave_scale, f32, 2.0);
serde_default!(position_amount, MinMaxCurve, MinMaxCurve::Constant(1.0));
serde_default!(
    remap,
    MinMaxCurveVector3,
    MinMaxCurveVector3 {
        x: MinMaxCurve::curve(crate::asset::AnimationCurve::linear(-1.0, 1.0)),
        y: MinMaxCurve::curve(crate::asset::AnimationCurve::linear(-1.0, 1.0)),
        z: MinMaxCurve::curve(crate::asset::AnimationCurve::linear(-1.0, 1.0)),
    }
);

const MAX_OCTAVES: u32 = 4;
const AXIS_SEED_STEP: u32 = 0x9e37_79b9;

/// Dimensionality of the noise field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum NoiseQuality {
    /// 1D noise over particle age.
    Low,
    /// 2D noise over the particle's XY position.
    Medium,
    /// 3D noise over the particle's position.
    #[default]
    High,
}

/// Turbulence from a seeded fractal gradient noise field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct NoiseModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Use each axis of `strength` and `remap`. Otherwise only `x` is used.
    ///
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate_axes: bool,
    /// Noise amplitude over particle lifetime. Defaults to `1.0`.
    #[serde(default = "default_strength", skip_serializing_if = "is_default_strength")]
    pub strength: MinMaxCurveVector3,
    /// Spatial frequency of the field. Defaults to `0.5`.
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Scroll speed of the field over emitter duration. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub scroll_speed: MinMaxCurve,
    /// Divide the strength by the frequency. Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub damping: bool,
    /// Fractal layers, from `1` to `4`. Defaults to `1`.
    #[serde(default = "default_octave_count")]
    pub octave_count: u32,
    /// Amplitude falloff per octave. Defaults to `0.5`.
    #[serde(default = "default_octave_multiplier")]
    pub octave_multiplier: f32,
    /// Frequency growth per octave. Defaults to `2.0`.
    #[serde(default = "default_octave_scale")]
    pub octave_scale: f32,
    /// Defaults to [`NoiseQuality::High`].
    #[serde(default)]
    pub quality: NoiseQuality,
    /// Remap the noise through `remap`. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub remap_enabled: bool,
    /// Maps noise in `[-1, 1]`, sampled at `[0, 1]`, to the output value.
    #[serde(default = "default_remap", skip_serializing_if = "is_default_remap")]
    pub remap: MinMaxCurveVector3,
    /// Scale of the velocity contribution. Defaults to `1.0`.
    #[serde(default = "default_position_amount")]
    pub position_amount: MinMaxCurve,
    /// Scale of the angular velocity contribution, in degrees per second.
    ///
    /// Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub rotation_amount: MinMaxCurve,
    /// Scale of the size contribution. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub size_amount: MinMaxCurve,
    #[serde(skip)]
    #[reflect(ignore)]
    scroll_offset: f32,
}

impl Default for NoiseModule {
    fn default() -> Self {
        Self {
            enabled: false,
            separate_axes: false,
            strength: default_strength(),
            frequency: default_frequency(),
            scroll_speed: MinMaxCurve::Constant(0.0),
            damping: true,
            octave_count: default_octave_count(),
            octave_multiplier: default_octave_multiplier(),
            octave_scale: default_octave_scale(),
            quality: NoiseQuality::High,
            remap_enabled: false,
            remap: default_remap(),
            position_amount: default_position_amount(),
            rotation_amount: MinMaxCurve::Constant(0.0),
            size_amount: MinMaxCurve::Constant(0.0),
            scroll_offset: 0.0,
        }
    }
}

impl NoiseModule {
    /// Current scroll offset of the field.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    fn sample_point(&self, particle: &Particle) -> Vec3 {
        let f = self.frequency;
        let s = self.scroll_offset;
        match self.quality {
            NoiseQuality::Low => Vec3::new(particle.age() * f + s, 0.5, 0.5),
            NoiseQuality::Medium => Vec3::new(
                particle.position.x * f + s,
                particle.position.y * f + s,
                0.5,
            ),
            NoiseQuality::High => particle.position * f + Vec3::splat(s),
        }
    }

    fn fractal(&self, p: Vec3, seed: u32) -> f32 {
        let octaves = self.octave_count.clamp(1, MAX_OCTAVES);
        let mut amplitude = 1.0;
        let mut scale = 1.0;
        let mut sum = 0.0;
        let mut norm = 0.0;
        for octave in 0..octaves {
            sum += amplitude * gradient_noise(p * scale, seed.wrapping_add(octave));
            norm += amplitude;
            amplitude *= self.octave_multiplier;
            scale *= self.octave_scale;
        }
        if norm > 0.0 {
            (sum / norm).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Noise value per axis in `[-1, 1]` before strength is applied.
    pub(crate) fn sample(&self, particle: &Particle) -> Vec3 {
        let p = self.sample_point(particle);
        let seed = particle.cache.noise_seed;
        let mut n = Vec3::new(
            self.fractal(p, seed),
            self.fractal(p, seed.wrapping_add(AXIS_SEED_STEP)),
            self.fractal(p, seed.wrapping_add(AXIS_SEED_STEP.wrapping_mul(2))),
        );
        if self.remap_enabled {
            let r = particle.cache.noise_random;
            let t = (n + Vec3::ONE) * 0.5;
            n = if self.separate_axes {
                Vec3::new(
                    self.remap.x.get_value(t.x, r),
                    self.remap.y.get_value(t.y, r),
                    self.remap.z.get_value(t.z, r),
                )
            } else {
                Vec3::new(
                    self.remap.x.get_value(t.x, r),
                    self.remap.x.get_value(t.y, r),
                    self.remap.x.get_value(t.z, r),
                )
            };
        }
        n
    }
}

impl ParticleModule for NoiseModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.noise_seed = ctx.rng.u32();
        particle.cache.noise_random = ctx.rng.f32();
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let t = particle.rate_at_life_time;
        let r = particle.cache.noise_random;
        let n = self.sample(particle);

        let mut strength = if self.separate_axes {
            self.strength.get_value(t, r)
        } else {
            Vec3::splat(self.strength.x.get_value(t, r))
        };
        if self.damping && self.frequency > 0.0 {
            strength /= self.frequency;
        }
        let scaled = n * strength;

        let position_amount = self.position_amount.get_value(t, r);
        particle.set_velocity_contribution(ContributionName::Noise, scaled * position_amount);

        if !self.rotation_amount.is_zero() {
            let amount = self.rotation_amount.get_value(t, r);
            particle.set_angular_velocity_contribution(ContributionName::Noise, scaled * amount);
        }
        if !self.size_amount.is_zero() {
            let amount = self.size_amount.get_value(t, r);
            particle.set_size_contribution(ContributionName::Noise, Vec3::splat(n.x * amount));
        }
    }

    fn update(&mut self, frame: &FrameInfo) {
        let speed = self.scroll_speed.get_value(frame.rate_at_duration, 0.5);
        self.scroll_offset += speed * frame.interval;
    }
}

fn hash(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    let mut h = seed
        ^ (x as u32).wrapping_mul(0x8da6_b343)
        ^ (y as u32).wrapping_mul(0xd816_3841)
        ^ (z as u32).wrapping_mul(0xcb1a_b31f);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^ (h >> 15)
}

fn grad(hash: u32, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Improved gradient noise with a hashed lattice, roughly in `[-1, 1]`.
pub(crate) fn gradient_noise(p: Vec3, seed: u32) -> f32 {
    if !p.is_finite() {
        return 0.0;
    }
    let cell = p.floor();
    let (xi, yi, zi) = (cell.x as i32, cell.y as i32, cell.z as i32);
    let f = p - cell;
    let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

    let corner = |dx: i32, dy: i32, dz: i32| {
        grad(
            hash(xi.wrapping_add(dx), yi.wrapping_add(dy), zi.wrapping_add(dz), seed),
            f.x - dx as f32,
            f.y - dy as f32,
            f.z - dz as f32,
        )
    };

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);
    let y0 = lerp(x00, x10, v);
    let y1 = lerp(x01, x11, v);
    lerp(y0, y1, w).clamp(-1.0, 1.0)
}
