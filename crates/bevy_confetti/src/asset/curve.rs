use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::serde_helpers::{default_one_f32, is_one_f32};

/// Easing applied between a key and the one that follows it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash, Reflect)]
pub enum CurveEasing {
    /// Straight interpolation.
    #[default]
    Linear,
    /// Holds the key's value until the next key.
    Constant,
    /// Quadratic ease in.
    EaseIn,
    /// Quadratic ease out.
    EaseOut,
    /// Quadratic ease in and out.
    EaseInOut,
    /// Hermite smoothstep.
    Smoothstep,
}

impl CurveEasing {
    /// Applies the easing to a linear factor `t` in `[0, 1]`.
    pub fn ease(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::Constant => 0.0,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A single key of an [`AnimationCurve`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Reflect)]
pub struct CurveKey {
    /// Normalized time of the key, from `0.0` to `1.0`.
    pub time: f32,
    /// Value at this key.
    pub value: f32,
    /// Easing towards the next key. Defaults to [`CurveEasing::Linear`].
    #[serde(default, skip_serializing_if = "CurveEasing::is_default")]
    pub easing: CurveEasing,
}

impl CurveKey {
    /// Creates a linear key.
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            easing: CurveEasing::Linear,
        }
    }

    /// Returns this key with a different easing.
    pub fn with_easing(mut self, easing: CurveEasing) -> Self {
        self.easing = easing;
        self
    }
}

/// Keyframed scalar curve over normalized time.
///
/// An empty curve evaluates to `0.0` everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Reflect)]
#[serde(from = "CurveKeys")]
pub struct AnimationCurve {
    /// Keys sorted by time.
    pub keys: Vec<CurveKey>,
}

// asset files may list keys in any order
#[derive(Deserialize)]
struct CurveKeys {
    keys: Vec<CurveKey>,
}

impl From<CurveKeys> for AnimationCurve {
    fn from(raw: CurveKeys) -> Self {
        Self::new(raw.keys)
    }
}

impl AnimationCurve {
    /// Creates a curve from keys, sorting them by time.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// A curve with a single key.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, value)],
        }
    }

    /// A straight ramp from `start` at `t = 0` to `end` at `t = 1`.
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, start), CurveKey::new(1.0, end)],
        }
    }

    /// Samples the curve at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t >= a.time && t <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let eased = a.easing.ease((t - a.time) / span);
                return a.value + (b.value - a.value) * eased;
            }
        }

        last.value
    }

    /// Smallest and largest key values, or `(0.0, 0.0)` for an empty curve.
    pub fn value_bounds(&self) -> (f32, f32) {
        if self.keys.is_empty() {
            return (0.0, 0.0);
        }
        self.keys
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), k| {
                (lo.min(k.value), hi.max(k.value))
            })
    }
}

/// A scalar that is either constant, curve driven, or randomized between two
/// constants or two curves.
///
/// The random variants blend by a caller supplied factor so that the same particle
/// can sample the same variation every frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub enum MinMaxCurve {
    /// A fixed value.
    Constant(f32),
    /// A curve scaled by `multiplier`.
    Curve {
        /// The curve sampled by normalized time.
        curve: AnimationCurve,
        /// Scale applied to the sampled value. Defaults to `1.0`.
        #[serde(default = "default_one_f32", skip_serializing_if = "is_one_f32")]
        multiplier: f32,
    },
    /// A value between `min` and `max`.
    TwoConstants {
        /// Value at a random factor of `0.0`.
        min: f32,
        /// Value at a random factor of `1.0`.
        max: f32,
    },
    /// A value between two curves, scaled by `multiplier`.
    TwoCurves {
        /// Curve at a random factor of `0.0`.
        min: AnimationCurve,
        /// Curve at a random factor of `1.0`.
        max: AnimationCurve,
        /// Scale applied to the blended value. Defaults to `1.0`.
        #[serde(default = "default_one_f32", skip_serializing_if = "is_one_f32")]
        multiplier: f32,
    },
}

impl Default for MinMaxCurve {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl MinMaxCurve {
    /// A constant value.
    pub fn constant(value: f32) -> Self {
        Self::Constant(value)
    }

    /// A value between two constants.
    pub fn between(min: f32, max: f32) -> Self {
        Self::TwoConstants { min, max }
    }

    /// A curve with a multiplier of `1.0`.
    pub fn curve(curve: AnimationCurve) -> Self {
        Self::Curve {
            curve,
            multiplier: 1.0,
        }
    }

    /// Evaluates the curve at normalized time `t`, blending the random variants by
    /// `random_between` in `[0, 1]`.
    pub fn get_value(&self, t: f32, random_between: f32) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Curve { curve, multiplier } => curve.sample(t) * multiplier,
            Self::TwoConstants { min, max } => min + (max - min) * random_between,
            Self::TwoCurves {
                min,
                max,
                multiplier,
            } => {
                let a = min.sample(t);
                let b = max.sample(t);
                (a + (b - a) * random_between) * multiplier
            }
        }
    }

    /// Returns `true` for a constant zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Constant(v) if *v == 0.0)
    }

    /// Returns `true` if the result depends on the random factor.
    pub fn is_random(&self) -> bool {
        matches!(self, Self::TwoConstants { .. } | Self::TwoCurves { .. })
    }
}

/// Three independent [`MinMaxCurve`]s, one per axis.
///
/// Missing axes deserialize to a constant zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Reflect)]
pub struct MinMaxCurveVector3 {
    /// X axis curve.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub x: MinMaxCurve,
    /// Y axis curve.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub y: MinMaxCurve,
    /// Z axis curve.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub z: MinMaxCurve,
}

impl MinMaxCurveVector3 {
    /// Constant value on every axis.
    pub fn splat(value: f32) -> Self {
        Self {
            x: MinMaxCurve::Constant(value),
            y: MinMaxCurve::Constant(value),
            z: MinMaxCurve::Constant(value),
        }
    }

    /// Constant per-axis values.
    pub fn constant(value: Vec3) -> Self {
        Self {
            x: MinMaxCurve::Constant(value.x),
            y: MinMaxCurve::Constant(value.y),
            z: MinMaxCurve::Constant(value.z),
        }
    }

    /// Evaluates every axis with the same random factor.
    pub fn get_value(&self, t: f32, random_between: f32) -> Vec3 {
        Vec3::new(
            self.x.get_value(t, random_between),
            self.y.get_value(t, random_between),
            self.z.get_value(t, random_between),
        )
    }

    /// Returns `true` when every axis is a constant zero.
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }
}
