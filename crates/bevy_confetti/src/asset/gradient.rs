use bevy::prelude::*;
use serde::{Deserialize, Serialize};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// How colors are blended between two [`GradientStop`]s.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash, Reflect)]
pub enum GradientInterpolation {
    /// Holds each stop's color until the next stop.
    Steps,
    /// Straight interpolation.
    #[default]
    Linear,
    /// Hermite smoothstep between stops.
    Smoothstep,
}

/// A color at a normalized position of a [`Gradient`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Reflect)]
pub struct GradientStop {
    /// Linear RGBA color.
    pub color: [f32; 4],
    /// Position of the stop, from `0.0` to `1.0`.
    pub position: f32,
}

/// Color ramp sampled by normalized time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct Gradient {
    /// Stops sorted by position.
    pub stops: Vec<GradientStop>,
    /// Blending between stops. Defaults to [`GradientInterpolation::Linear`].
    #[serde(default)]
    pub interpolation: GradientInterpolation,
}

impl Default for Gradient {
    fn default() -> Self {
        Self::white()
    }
}

impl Gradient {
    /// Creates a linear gradient from stops, sorting them by position.
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self {
            stops,
            interpolation: GradientInterpolation::Linear,
        }
    }

    /// A gradient that is opaque white everywhere.
    pub fn white() -> Self {
        Self {
            stops: vec![GradientStop {
                color: WHITE,
                position: 0.0,
            }],
            interpolation: GradientInterpolation::Linear,
        }
    }

    /// A two stop gradient.
    pub fn linear(start: [f32; 4], end: [f32; 4]) -> Self {
        Self::new(vec![
            GradientStop {
                color: start,
                position: 0.0,
            },
            GradientStop {
                color: end,
                position: 1.0,
            },
        ])
    }

    /// Samples the gradient at `t`, clamped to `[0, 1]`.
    ///
    /// An empty gradient samples as opaque white.
    pub fn sample(&self, t: f32) -> LinearRgba {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return color_from_array(WHITE);
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        if t <= first.position {
            return color_from_array(first.color);
        }
        if t >= last.position {
            return color_from_array(last.color);
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t >= a.position && t <= b.position {
                let span = b.position - a.position;
                if span <= f32::EPSILON {
                    return color_from_array(b.color);
                }
                let f = (t - a.position) / span;
                let f = match self.interpolation {
                    GradientInterpolation::Steps => 0.0,
                    GradientInterpolation::Linear => f,
                    GradientInterpolation::Smoothstep => f * f * (3.0 - 2.0 * f),
                };
                return lerp_color(color_from_array(a.color), color_from_array(b.color), f);
            }
        }

        color_from_array(last.color)
    }
}

/// Converts a `[r, g, b, a]` array to [`LinearRgba`].
pub fn color_from_array(c: [f32; 4]) -> LinearRgba {
    LinearRgba::new(c[0], c[1], c[2], c[3])
}

pub(crate) fn lerp_color(a: LinearRgba, b: LinearRgba, t: f32) -> LinearRgba {
    LinearRgba::new(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
        a.alpha + (b.alpha - a.alpha) * t,
    )
}

pub(crate) fn multiply_color(a: LinearRgba, b: LinearRgba) -> LinearRgba {
    LinearRgba::new(
        a.red * b.red,
        a.green * b.green,
        a.blue * b.blue,
        a.alpha * b.alpha,
    )
}

/// A color that is constant, gradient driven, or randomized between two colors or
/// two gradients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub enum MinMaxGradient {
    /// A fixed linear RGBA color.
    Color([f32; 4]),
    /// A gradient sampled by normalized time.
    Gradient(Gradient),
    /// A color between `min` and `max`.
    TwoColors {
        /// Color at a random factor of `0.0`.
        min: [f32; 4],
        /// Color at a random factor of `1.0`.
        max: [f32; 4],
    },
    /// A color between two gradients.
    TwoGradients {
        /// Gradient at a random factor of `0.0`.
        min: Gradient,
        /// Gradient at a random factor of `1.0`.
        max: Gradient,
    },
    /// A color picked from the gradient at the random factor, ignoring time.
    RandomColor(Gradient),
}

impl Default for MinMaxGradient {
    fn default() -> Self {
        Self::Color(WHITE)
    }
}

impl MinMaxGradient {
    /// Evaluates the color at normalized time `t`, blending the random variants by
    /// `random_between` in `[0, 1]`.
    pub fn get_value(&self, t: f32, random_between: f32) -> LinearRgba {
        match self {
            Self::Color(color) => color_from_array(*color),
            Self::Gradient(gradient) => gradient.sample(t),
            Self::TwoColors { min, max } => lerp_color(
                color_from_array(*min),
                color_from_array(*max),
                random_between,
            ),
            Self::TwoGradients { min, max } => {
                lerp_color(min.sample(t), max.sample(t), random_between)
            }
            Self::RandomColor(gradient) => gradient.sample(random_between),
        }
    }

    /// Returns `true` for constant opaque white.
    pub fn is_white(&self) -> bool {
        matches!(self, Self::Color(c) if *c == WHITE)
    }
}
