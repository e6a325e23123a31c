use bevy::prelude::*;

pub(crate) fn is_false(v: &bool) -> bool {
    !*v
}

pub(crate) fn is_true(v: &bool) -> bool {
    *v
}

pub(crate) fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

pub(crate) fn is_one_f32(v: &f32) -> bool {
    *v == 1.0
}

pub(crate) fn is_zero_vec3(v: &Vec3) -> bool {
    *v == Vec3::ZERO
}

pub(crate) fn is_one_vec3(v: &Vec3) -> bool {
    *v == Vec3::ONE
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_one_f32() -> f32 {
    1.0
}

pub(crate) fn default_one_vec3() -> Vec3 {
    Vec3::ONE
}

/// Declares a `default_<name>()` function for `#[serde(default = ...)]` together with the
/// matching `is_default_<name>()` predicate for `skip_serializing_if`.
macro_rules! serde_default {
    ($name:ident, $ty:ty, $val:expr) => {
        ::paste::paste! {
            #[allow(dead_code)]
            fn [<default_ $name>]() -> $ty { $val }
            #[allow(dead_code)]
            fn [<is_default_ $name>](v: &$ty) -> bool { *v == [<default_ $name>]() }
        }
    };
}

pub(crate) use serde_default;
