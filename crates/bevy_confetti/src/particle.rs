use bevy::prelude::*;

use crate::asset::gradient::multiply_color;
use crate::emit_info::ParticleSystemEmitInfo;

/// Key of a named contribution to one of a particle's shared fields.
///
/// Setting a name replaces only that slice, so modules can recompute their share every
/// frame without compounding the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributionName {
    /// Gravity from the main module.
    Gravity,
    /// Velocity over lifetime.
    VelocityOverLifetime,
    /// Speed modifier of the velocity over lifetime module.
    SpeedModifier,
    /// Emitter velocity inherited every frame.
    InheritVelocity,
    /// Force over lifetime.
    ForceOverLifetime,
    /// Noise displacement.
    Noise,
    /// Color over lifetime.
    ColorOverLifetime,
    /// Color by speed.
    ColorBySpeed,
    /// Size over lifetime.
    SizeOverLifetime,
    /// Size by speed.
    SizeBySpeed,
    /// Rotation over lifetime.
    RotationOverLifetime,
    /// Rotation by speed.
    RotationBySpeed,
    /// Caller defined contribution.
    Custom(u32),
}

/// Small map of named vector contributions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedVectors {
    entries: Vec<(ContributionName, Vec3)>,
}

impl NamedVectors {
    /// Sets the slice for `name`, replacing any previous value.
    pub fn set(&mut self, name: ContributionName, value: Vec3) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes the slice for `name`, returning it if it existed.
    pub fn remove(&mut self, name: ContributionName) -> Option<Vec3> {
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.swap_remove(index).1)
    }

    /// Current value of `name`.
    pub fn get(&self, name: ContributionName) -> Option<Vec3> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Sum of every slice.
    pub fn sum(&self) -> Vec3 {
        self.entries.iter().fold(Vec3::ZERO, |acc, (_, v)| acc + *v)
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no slices.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Small map of named multiplicative color contributions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedColors {
    entries: Vec<(ContributionName, LinearRgba)>,
}

impl NamedColors {
    /// Sets the slice for `name`, replacing any previous value.
    pub fn set(&mut self, name: ContributionName, value: LinearRgba) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes the slice for `name`, returning it if it existed.
    pub fn remove(&mut self, name: ContributionName) -> Option<LinearRgba> {
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.swap_remove(index).1)
    }

    /// Product of every slice, white when empty.
    pub fn product(&self) -> LinearRgba {
        self.entries
            .iter()
            .fold(LinearRgba::WHITE, |acc, (_, c)| multiply_color(acc, *c))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Every named contribution a particle carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleContributions {
    /// Added to the base velocity.
    pub velocity: NamedVectors,
    /// Added to the base acceleration.
    pub acceleration: NamedVectors,
    /// Added to the base angular velocity, in degrees per second.
    pub angular_velocity: NamedVectors,
    /// Summed into the size multiplier `1 + Σ`.
    pub size: NamedVectors,
    /// Multiplied into the start color.
    pub color: NamedColors,
}

impl ParticleContributions {
    fn clear(&mut self) {
        self.velocity.clear();
        self.acceleration.clear();
        self.angular_velocity.clear();
        self.size.clear();
        self.color.clear();
    }
}

/// Per-particle scratch owned by individual modules.
///
/// Each field is read and written by exactly one module.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticleCache {
    /// Random blend for the main module's gravity modifier.
    pub gravity_random: f32,
    /// Random blend for velocity over lifetime.
    pub velocity_random: f32,
    /// Random blend for limit velocity over lifetime.
    pub limit_velocity_random: f32,
    /// Random blend for inherit velocity.
    pub inherit_random: f32,
    /// Random blend for force over lifetime.
    pub force_random: f32,
    /// Random blend for color over lifetime.
    pub color_random: f32,
    /// Random blend for color by speed.
    pub color_by_speed_random: f32,
    /// Random blend for size over lifetime.
    pub size_random: f32,
    /// Random blend for size by speed.
    pub size_by_speed_random: f32,
    /// Random blend for rotation over lifetime.
    pub rotation_random: f32,
    /// Random blend for rotation by speed.
    pub rotation_by_speed_random: f32,
    /// Seed of the particle's noise field.
    pub noise_seed: u32,
    /// Random blend for the noise curves.
    pub noise_random: f32,
    /// Random blend for the texture sheet frame curves.
    pub texture_random: f32,
    /// Row picked by a random-row texture sheet.
    pub texture_row: u32,
}

/// A nested emit info driving a Birth sub-emitter from a living particle.
#[derive(Debug, Clone, PartialEq)]
pub struct SubEmitTrail {
    /// Index into the sub-emitters module's entries.
    pub sub_emitter: usize,
    /// Emission timing of this trail, in the parent system's time.
    pub info: ParticleSystemEmitInfo,
}

/// One simulated particle.
///
/// Positions, velocities and accelerations are expressed in the owning system's
/// simulation space. Rotations are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// System time at which the particle was born.
    pub birth_time: f32,
    /// Lifetime in seconds.
    pub lifetime: f32,
    /// Integrated position.
    pub position: Vec3,
    /// Base velocity, excluding contributions.
    pub velocity: Vec3,
    /// Base acceleration, excluding contributions.
    pub acceleration: Vec3,
    /// Rotation per axis, in degrees.
    pub rotation: Vec3,
    /// Base angular velocity per axis, in degrees per second.
    pub angular_velocity: Vec3,
    /// Size at birth.
    pub start_size: Vec3,
    /// Current size, recomputed every frame from `start_size`.
    pub size: Vec3,
    /// Color at birth.
    pub start_color: LinearRgba,
    /// Current color, recomputed every frame from `start_color`.
    pub color: LinearRgba,
    /// Initial speed sampled by the main module.
    pub start_speed: f32,
    /// Texture tile scale in `xy` and tile offset in `zw`.
    pub tiling_offset: Vec4,
    /// `1.0` on an axis when that UV axis is flipped.
    pub flip_uv: Vec2,
    /// The emitter's duration phase at birth.
    pub birth_rate_at_duration: f32,
    /// Normalized age, `(cur_time - birth_time) / lifetime`.
    pub rate_at_life_time: f32,
    /// Position before the last advance.
    pub pre_position: Vec3,
    /// Position after the last advance.
    pub cur_position: Vec3,
    /// System time before the last advance.
    pub pre_time: f32,
    /// System time after the last advance.
    pub cur_time: f32,
    /// Module scratch.
    pub cache: ParticleCache,
    /// Birth sub-emitter trails driven by this particle.
    pub sub_emit_info: Vec<SubEmitTrail>,
    pub(crate) contributions: ParticleContributions,
    pub(crate) random_seed: u32,
    pub(crate) sub_emit_depth: u32,
    pub(crate) collided: bool,
    pub(crate) killed: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            birth_time: 0.0,
            lifetime: 1.0,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            start_size: Vec3::ONE,
            size: Vec3::ONE,
            start_color: LinearRgba::WHITE,
            color: LinearRgba::WHITE,
            start_speed: 0.0,
            tiling_offset: Vec4::new(1.0, 1.0, 0.0, 0.0),
            flip_uv: Vec2::ZERO,
            birth_rate_at_duration: 0.0,
            rate_at_life_time: 0.0,
            pre_position: Vec3::ZERO,
            cur_position: Vec3::ZERO,
            pre_time: 0.0,
            cur_time: 0.0,
            cache: ParticleCache::default(),
            sub_emit_info: Vec::new(),
            contributions: ParticleContributions::default(),
            random_seed: 0,
            sub_emit_depth: 0,
            collided: false,
            killed: false,
        }
    }
}

impl Particle {
    /// Resets a recycled particle, keeping its allocations.
    pub(crate) fn reset(&mut self) {
        let mut sub_emit_info = std::mem::take(&mut self.sub_emit_info);
        let mut contributions = std::mem::take(&mut self.contributions);
        sub_emit_info.clear();
        contributions.clear();
        *self = Self {
            sub_emit_info,
            contributions,
            ..default()
        };
    }

    /// Effective velocity, base plus every velocity contribution.
    pub fn total_velocity(&self) -> Vec3 {
        self.velocity + self.contributions.velocity.sum()
    }

    /// Effective acceleration, base plus every acceleration contribution.
    pub fn total_acceleration(&self) -> Vec3 {
        self.acceleration + self.contributions.acceleration.sum()
    }

    /// Effective angular velocity in degrees per second.
    pub fn total_angular_velocity(&self) -> Vec3 {
        self.angular_velocity + self.contributions.angular_velocity.sum()
    }

    /// Read access to the named contributions.
    pub fn contributions(&self) -> &ParticleContributions {
        &self.contributions
    }

    /// Seconds since birth.
    pub fn age(&self) -> f32 {
        self.cur_time - self.birth_time
    }

    /// Length of the last advance in seconds.
    pub fn delta_time(&self) -> f32 {
        (self.cur_time - self.pre_time).max(0.0)
    }

    /// Sub-emitter nesting depth, `0` for particles emitted by the system itself.
    pub fn sub_emit_depth(&self) -> u32 {
        self.sub_emit_depth
    }

    /// Returns `true` once the particle has outlived its lifetime or was killed.
    pub fn is_dead(&self) -> bool {
        self.killed || self.rate_at_life_time >= 1.0
    }

    pub(crate) fn set_velocity_contribution(&mut self, name: ContributionName, value: Vec3) {
        self.contributions.velocity.set(name, value);
    }

    pub(crate) fn set_acceleration_contribution(&mut self, name: ContributionName, value: Vec3) {
        self.contributions.acceleration.set(name, value);
    }

    pub(crate) fn set_angular_velocity_contribution(
        &mut self,
        name: ContributionName,
        value: Vec3,
    ) {
        self.contributions.angular_velocity.set(name, value);
    }

    pub(crate) fn set_size_contribution(&mut self, name: ContributionName, value: Vec3) {
        self.contributions.size.set(name, value);
    }

    pub(crate) fn set_color_contribution(&mut self, name: ContributionName, value: LinearRgba) {
        self.contributions.color.set(name, value);
    }

    /// Updates age markers for an advance to `now`.
    pub(crate) fn advance_time(&mut self, now: f32) {
        self.pre_time = self.cur_time;
        self.cur_time = now;
        let rate = if self.lifetime > 0.0 {
            (now - self.birth_time) / self.lifetime
        } else {
            1.0
        };
        self.rate_at_life_time = rate.max(self.rate_at_life_time);
    }

    /// Semi-implicit Euler step over the last advance.
    pub(crate) fn integrate(&mut self) {
        let dt = self.delta_time();
        self.pre_position = self.position;
        if dt > 0.0 {
            self.velocity += self.total_acceleration() * dt;
            self.position += self.total_velocity() * dt;
            self.rotation += self.total_angular_velocity() * dt;
        }
        self.cur_position = self.position;
    }

    /// Recomputes `size` and `color` from their start values.
    pub(crate) fn resolve_visuals(&mut self) {
        let factor = (Vec3::ONE + self.contributions.size.sum()).max(Vec3::ZERO);
        self.size = self.start_size * factor;
        self.color = multiply_color(self.start_color, self.contributions.color.product());
    }
}
