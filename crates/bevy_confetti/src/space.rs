use bevy::math::Affine3A;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The frame particle kinematics are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum SimulationSpace {
    /// Relative to the emitter; particles follow it when it moves.
    #[default]
    Local,
    /// World coordinates; particles stay where they were emitted.
    World,
}

impl SimulationSpace {
    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// The emitter's local to world transform together with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterTransform {
    local_to_world: Affine3A,
    world_to_local: Affine3A,
}

impl Default for EmitterTransform {
    fn default() -> Self {
        Self {
            local_to_world: Affine3A::IDENTITY,
            world_to_local: Affine3A::IDENTITY,
        }
    }
}

impl From<&GlobalTransform> for EmitterTransform {
    fn from(transform: &GlobalTransform) -> Self {
        Self::new(transform.affine())
    }
}

impl From<Transform> for EmitterTransform {
    fn from(transform: Transform) -> Self {
        Self::new(transform.compute_affine())
    }
}

impl EmitterTransform {
    /// Wraps an affine transform. Singular transforms fall back to identity for the
    /// inverse direction.
    pub fn new(local_to_world: Affine3A) -> Self {
        let world_to_local = if local_to_world.matrix3.determinant().abs() > f32::EPSILON {
            local_to_world.inverse()
        } else {
            Affine3A::from_translation(-Vec3::from(local_to_world.translation))
        };
        Self {
            local_to_world,
            world_to_local,
        }
    }

    /// Emitter origin in world space.
    pub fn translation(&self) -> Vec3 {
        self.local_to_world.translation.into()
    }

    /// Emitter rotation in world space.
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.local_to_world.to_scale_rotation_translation();
        rotation
    }

    /// Local point to world point.
    pub fn local_to_world_point(&self, p: Vec3) -> Vec3 {
        self.local_to_world.transform_point3(p)
    }

    /// World point to local point.
    pub fn world_to_local_point(&self, p: Vec3) -> Vec3 {
        self.world_to_local.transform_point3(p)
    }

    /// Local direction to world direction. Translation is ignored.
    pub fn local_to_world_vector(&self, v: Vec3) -> Vec3 {
        self.local_to_world.transform_vector3(v)
    }

    /// World direction to local direction. Translation is ignored.
    pub fn world_to_local_vector(&self, v: Vec3) -> Vec3 {
        self.world_to_local.transform_vector3(v)
    }

    /// Converts a vector expressed in `from` into the simulation space `to`.
    pub fn convert_vector(&self, v: Vec3, from: SimulationSpace, to: SimulationSpace) -> Vec3 {
        match (from, to) {
            (SimulationSpace::Local, SimulationSpace::World) => self.local_to_world_vector(v),
            (SimulationSpace::World, SimulationSpace::Local) => self.world_to_local_vector(v),
            _ => v,
        }
    }

    /// Converts a point expressed in `from` into the simulation space `to`.
    pub fn convert_point(&self, p: Vec3, from: SimulationSpace, to: SimulationSpace) -> Vec3 {
        match (from, to) {
            (SimulationSpace::Local, SimulationSpace::World) => self.local_to_world_point(p),
            (SimulationSpace::World, SimulationSpace::Local) => self.world_to_local_point(p),
            _ => p,
        }
    }
}
