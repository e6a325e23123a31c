use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleModule, UpdateContext};
use crate::asset::serde_helpers::{is_false, serde_default};
use crate::particle::Particle;

serde_default!(collision_radius, f32, 0.05);

/// Shape of a collider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Reflect)]
pub enum ColliderShape {
    /// An infinite plane through the collider position. Particles are kept on the side
    /// `normal` points to.
    Plane {
        /// Plane normal. Does not need to be normalized.
        normal: Vec3,
    },
    /// A solid sphere.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// A solid axis-aligned box.
    Box {
        /// Full extents of the box.
        size: Vec3,
    },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Plane { normal: Vec3::Y }
    }
}

/// A collider placed in the system's simulation space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, Reflect)]
pub struct Collider {
    /// The collider shape.
    pub shape: ColliderShape,
    /// Center of the collider, or a point on the plane.
    #[serde(default)]
    pub position: Vec3,
}

impl Collider {
    /// Surface contact for a particle of `radius` at `point`, as the push-out
    /// distance and the outward surface normal.
    fn contact(&self, point: Vec3, radius: f32) -> Option<(f32, Vec3)> {
        let local = point - self.position;
        match self.shape {
            ColliderShape::Plane { normal } => {
                let normal = normal.normalize_or_zero();
                if normal == Vec3::ZERO {
                    return None;
                }
                let distance = local.dot(normal);
                (distance < radius).then_some((radius - distance, normal))
            }
            ColliderShape::Sphere { radius: sphere } => {
                let distance = local.length();
                let reach = sphere.max(0.0) + radius;
                if distance >= reach {
                    return None;
                }
                let normal = if distance > 0.0 {
                    local / distance
                } else {
                    Vec3::Y
                };
                Some((reach - distance, normal))
            }
            ColliderShape::Box { size } => {
                let half = size.abs() * 0.5 + Vec3::splat(radius);
                let depth = half - local.abs();
                if depth.min_element() <= 0.0 {
                    return None;
                }
                let axis = if depth.x <= depth.y && depth.x <= depth.z {
                    Vec3::X
                } else if depth.y <= depth.z {
                    Vec3::Y
                } else {
                    Vec3::Z
                };
                let sign = if local.dot(axis) < 0.0 { -1.0 } else { 1.0 };
                Some((depth.dot(axis), axis * sign))
            }
        }
    }
}

/// Response of a particle touching a collider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Reflect)]
pub enum CollisionMode {
    /// Bounce off the surface.
    Rigid {
        /// Fraction of the tangential speed lost on contact, from `0.0` to `1.0`.
        #[serde(default)]
        friction: f32,
        /// Fraction of the normal speed kept on contact, from `0.0` to `1.0`.
        #[serde(default)]
        bounce: f32,
    },
    /// Kill the particle on contact.
    HideOnContact,
}

impl Default for CollisionMode {
    fn default() -> Self {
        Self::Rigid {
            friction: 0.0,
            bounce: 0.5,
        }
    }
}

/// Collides particles against simple colliders.
///
/// Contacts mark the particle as collided, which triggers Collision sub-emitters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct CollisionModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Colliders in simulation space.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colliders: Vec<Collider>,
    /// Defaults to a rigid bounce keeping half the normal speed.
    #[serde(default)]
    pub mode: CollisionMode,
    /// Particle collision radius. Defaults to `0.05`.
    #[serde(default = "default_collision_radius")]
    pub radius: f32,
    /// Multiply the radius by the particle's largest size axis. Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub scale_with_size: bool,
}

impl Default for CollisionModule {
    fn default() -> Self {
        Self {
            enabled: false,
            colliders: Vec::new(),
            mode: CollisionMode::default(),
            radius: default_collision_radius(),
            scale_with_size: false,
        }
    }
}

impl ParticleModule for CollisionModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn update_particle_state(&self, particle: &mut Particle, _ctx: &UpdateContext) {
        let radius = if self.scale_with_size {
            self.radius * particle.size.abs().max_element()
        } else {
            self.radius
        }
        .max(0.0);

        for collider in &self.colliders {
            let Some((depth, normal)) = collider.contact(particle.position, radius) else {
                continue;
            };
            particle.collided = true;
            match self.mode {
                CollisionMode::HideOnContact => {
                    particle.killed = true;
                    return;
                }
                CollisionMode::Rigid { friction, bounce } => {
                    particle.position += normal * depth;
                    particle.cur_position = particle.position;

                    let total = particle.total_velocity();
                    let approach = total.dot(normal);
                    if approach < 0.0 {
                        let normal_part = normal * approach;
                        let tangent = total - normal_part;
                        let response = -normal_part * (1.0 + bounce.clamp(0.0, 1.0))
                            - tangent * friction.clamp(0.0, 1.0);
                        particle.velocity += response;
                    }
                }
            }
        }
    }
}
