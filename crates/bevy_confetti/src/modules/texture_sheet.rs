use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, SpawnContext, UpdateContext};
use crate::asset::serde_helpers::{is_false, is_zero_f32, serde_default};
use crate::asset::{AnimationCurve, MinMaxCurve};
use crate::particle::Particle;

serde_default!(tiles, UVec2, UVec2::ONE);
serde_default!(
    frame_over_time,
    MinMaxCurve,
    MinMaxCurve::curve(AnimationCurve::linear(0.0, 1.0))
);
serde_default!(sheet_cycle_count, u32, 1);

/// Row choice of a single-row animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum TextureSheetRow {
    /// A fixed row index.
    Custom(u32),
    /// A row picked per particle at birth.
    Random,
}

impl Default for TextureSheetRow {
    fn default() -> Self {
        Self::Custom(0)
    }
}

/// Frames an animation steps through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum TextureSheetAnimation {
    /// Every tile, row by row.
    #[default]
    WholeSheet,
    /// The tiles of one row.
    SingleRow(TextureSheetRow),
}

/// Flipbook animation over a grid of texture tiles.
///
/// Writes [`Particle::tiling_offset`] as the tile scale in `xy` and the tile offset in
/// `zw`, with `(0, 0)` at the top left tile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct TextureSheetAnimationModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Columns and rows of the sheet. Defaults to `(1, 1)`.
    #[serde(default = "default_tiles")]
    pub tiles: UVec2,
    /// Defaults to [`TextureSheetAnimation::WholeSheet`].
    #[serde(default)]
    pub animation: TextureSheetAnimation,
    /// Animation progress over lifetime, from `0.0` to `1.0` across one cycle.
    ///
    /// Defaults to a linear ramp.
    #[serde(default = "default_frame_over_time")]
    pub frame_over_time: MinMaxCurve,
    /// Frame offset at birth, in frames. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub start_frame: MinMaxCurve,
    /// Times the animation plays over a particle's lifetime. Defaults to `1`.
    #[serde(default = "default_sheet_cycle_count")]
    pub cycle_count: u32,
    /// Probability of flipping U, from `0.0` to `1.0`. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub flip_u: f32,
    /// Probability of flipping V, from `0.0` to `1.0`. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub flip_v: f32,
}

impl Default for TextureSheetAnimationModule {
    fn default() -> Self {
        Self {
            enabled: false,
            tiles: UVec2::ONE,
            animation: TextureSheetAnimation::WholeSheet,
            frame_over_time: default_frame_over_time(),
            start_frame: MinMaxCurve::Constant(0.0),
            cycle_count: default_sheet_cycle_count(),
            flip_u: 0.0,
            flip_v: 0.0,
        }
    }
}

impl TextureSheetAnimationModule {
    /// Number of frames the animation steps through.
    pub fn frame_count(&self) -> u32 {
        let tiles = self.tiles.max(UVec2::ONE);
        match self.animation {
            TextureSheetAnimation::WholeSheet => tiles.x * tiles.y,
            TextureSheetAnimation::SingleRow(_) => tiles.x,
        }
    }

    fn row(&self, particle: &Particle) -> u32 {
        let rows = self.tiles.y.max(1);
        match self.animation {
            TextureSheetAnimation::WholeSheet => 0,
            TextureSheetAnimation::SingleRow(TextureSheetRow::Custom(row)) => row.min(rows - 1),
            TextureSheetAnimation::SingleRow(TextureSheetRow::Random) => {
                particle.cache.texture_row.min(rows - 1)
            }
        }
    }

    /// Tile index shown at the particle's current age.
    pub fn frame(&self, particle: &Particle) -> u32 {
        let frames = self.frame_count();
        let r = particle.cache.texture_random;
        let t = particle.rate_at_life_time;
        let cycles = self.cycle_count.max(1) as f32;
        let progress = (t * cycles).fract();
        let progress = if t >= 1.0 { 1.0 } else { progress };
        let animated = (self.frame_over_time.get_value(progress, r) * frames as f32)
            .floor()
            .clamp(0.0, (frames - 1) as f32) as u32;
        let offset = self.start_frame.get_value(0.0, r).floor().max(0.0) as u32;
        (animated + offset) % frames
    }
}

impl ParticleModule for TextureSheetAnimationModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        particle.cache.texture_random = ctx.rng.f32();
        if self.animation == TextureSheetAnimation::SingleRow(TextureSheetRow::Random) {
            particle.cache.texture_row = ctx.rng.u32() % self.tiles.y.max(1);
        }
        particle.flip_uv = Vec2::new(
            if ctx.rng.chance(self.flip_u) { 1.0 } else { 0.0 },
            if ctx.rng.chance(self.flip_v) { 1.0 } else { 0.0 },
        );
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let tiles = self.tiles.max(UVec2::ONE);
        let frame = self.frame(particle);
        let (column, row) = match self.animation {
            TextureSheetAnimation::WholeSheet => (frame % tiles.x, frame / tiles.x),
            TextureSheetAnimation::SingleRow(_) => (frame, self.row(particle)),
        };
        let scale = Vec2::ONE / tiles.as_vec2();
        particle.tiling_offset = Vec4::new(
            scale.x,
            scale.y,
            column as f32 * scale.x,
            row as f32 * scale.y,
        );
    }
}
