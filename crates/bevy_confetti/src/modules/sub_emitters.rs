use bevy::prelude::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{EmissionModule, EmissionSample, ParticleModule, SpaceContext, SpawnContext};
use crate::asset::gradient::multiply_color;
use crate::asset::serde_helpers::{default_one_f32, is_false, serde_default};
use crate::emit_info::ParticleSystemEmitInfo;
use crate::particle::{Particle, SubEmitTrail};
use crate::random::ParticleRng;
use crate::space::SimulationSpace;

serde_default!(max_depth, u32, 4);

/// When a sub-emitter fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Reflect)]
pub enum SubEmitterType {
    /// Emits continuously while the parent particle lives.
    #[default]
    Birth,
    /// Emits once when the parent particle dies.
    Death,
    /// Emits once when the parent particle touches a collider.
    Collision,
    /// Emits once when triggered by gameplay code.
    Trigger,
    /// Emits once when triggered manually.
    Manual,
}

bitflags! {
    /// Parent particle state passed on to sub-emitted particles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SubEmitterProperties: u32 {
        /// Multiply the child start color by the parent color.
        const COLOR = 1 << 0;
        /// Multiply the child start size by the parent size.
        const SIZE = 1 << 1;
        /// Add the parent rotation to the child rotation.
        const ROTATION = 1 << 2;
        /// Scale the child lifetime by the parent's remaining lifetime fraction.
        const LIFETIME = 1 << 3;
        /// Run a one-shot emission for the parent's remaining lifetime.
        const DURATION = 1 << 4;
        /// Add the parent velocity to the child velocity.
        const VELOCITY = 1 << 5;
    }
}

/// One sub-emitter of a system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct SubEmitterEntry {
    /// Index of the child emitter within the same asset.
    pub emitter: usize,
    /// Defaults to [`SubEmitterType::Birth`].
    #[serde(default)]
    pub kind: SubEmitterType,
    /// Defaults to nothing inherited.
    #[serde(default, skip_serializing_if = "SubEmitterProperties::is_empty")]
    #[reflect(ignore)]
    pub properties: SubEmitterProperties,
    /// Chance of each trigger firing, from `0.0` to `1.0`. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub emit_probability: f32,
}

impl SubEmitterEntry {
    /// An entry firing `kind` into `emitter` without inheriting anything.
    pub fn new(emitter: usize, kind: SubEmitterType) -> Self {
        Self {
            emitter,
            kind,
            properties: SubEmitterProperties::empty(),
            emit_probability: 1.0,
        }
    }

    /// Sets the inherited properties.
    pub fn with_properties(mut self, properties: SubEmitterProperties) -> Self {
        self.properties = properties;
        self
    }
}

/// The child system's emission settings, bound to an entry when the effect is built.
///
/// Birth trails run on the parent particle using these.
#[derive(Debug, Clone, PartialEq)]
pub struct SubEmitterTarget {
    /// The child's emission module.
    pub emission: EmissionModule,
    /// The child's cycle length.
    pub duration: f32,
    /// Whether the child's cycle repeats.
    pub looping: bool,
    /// The child's particle limit. One trail step never emits more.
    pub max_particles: u32,
}

/// Parent particle state captured when a sub-emitter fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InheritedState {
    /// Parent color.
    pub color: LinearRgba,
    /// Parent size.
    pub size: Vec3,
    /// Parent rotation in degrees.
    pub rotation: Vec3,
    /// Parent velocity in world space.
    pub velocity: Vec3,
    /// Seconds the parent had left to live.
    pub remaining_lifetime: f32,
    /// Fraction of the parent's lifetime left, from `0.0` to `1.0`.
    pub lifetime_fraction: f32,
    /// Which of the above the child uses.
    pub properties: SubEmitterProperties,
}

impl InheritedState {
    fn capture(
        particle: &Particle,
        space: &SpaceContext,
        properties: SubEmitterProperties,
    ) -> Self {
        Self {
            color: particle.color,
            size: particle.size,
            rotation: particle.rotation,
            velocity: space.to_world_vector(particle.total_velocity()),
            remaining_lifetime: (particle.lifetime - particle.age()).max(0.0),
            lifetime_fraction: (1.0 - particle.rate_at_life_time).clamp(0.0, 1.0),
            properties,
        }
    }

    /// Applies the inherited properties to a freshly spawned child particle.
    pub fn apply(&self, particle: &mut Particle, space: &SpaceContext) {
        let p = self.properties;
        if p.contains(SubEmitterProperties::COLOR) {
            particle.start_color = multiply_color(particle.start_color, self.color);
        }
        if p.contains(SubEmitterProperties::SIZE) {
            particle.start_size *= self.size;
        }
        if p.contains(SubEmitterProperties::ROTATION) {
            particle.rotation += self.rotation;
        }
        if p.contains(SubEmitterProperties::LIFETIME) {
            particle.lifetime *= self.lifetime_fraction;
        }
        if p.contains(SubEmitterProperties::VELOCITY) {
            particle.velocity += space.vector(self.velocity, SimulationSpace::World);
        }
    }

    /// Duration of a one-shot emission, overridden by the parent's remaining lifetime
    /// when [`SubEmitterProperties::DURATION`] is set.
    pub fn duration(&self, own: f32) -> f32 {
        if self.properties.contains(SubEmitterProperties::DURATION) && self.remaining_lifetime > 0.0
        {
            self.remaining_lifetime
        } else {
            own
        }
    }
}

/// What a sub-emit event asks the child system to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubEmitKind {
    /// Run one non-looping duration of the child's emission at the event position.
    OneShot,
    /// Spawn a single particle born `age` seconds ago.
    Particle {
        /// Seconds since the particle's birth time.
        age: f32,
    },
}

/// A sub-emission queued by a parent system for a child system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubEmitEvent {
    /// Index of the child system within the effect.
    pub target: usize,
    /// Emission point in world space.
    pub position: Vec3,
    /// Parent state.
    pub inherit: InheritedState,
    /// Sub-emission depth of the particles this event creates.
    pub depth: u32,
    /// Duration phase the child samples start values at, for trail particles.
    pub rate_at_duration: f32,
    /// What to emit.
    pub kind: SubEmitKind,
}

/// Spawns particles in other systems of the same effect from this system's particles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct SubEmittersModule {
    /// Defaults to `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    /// Sub-emitters, addressed by index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<SubEmitterEntry>,
    /// Particles at or beyond this sub-emission depth no longer fire sub-emitters.
    ///
    /// Defaults to `4`.
    #[serde(default = "default_max_depth", skip_serializing_if = "is_default_max_depth")]
    pub max_depth: u32,
    #[serde(skip)]
    #[reflect(ignore)]
    targets: Vec<Option<SubEmitterTarget>>,
}

impl Default for SubEmittersModule {
    fn default() -> Self {
        Self {
            enabled: false,
            entries: Vec::new(),
            max_depth: default_max_depth(),
            targets: Vec::new(),
        }
    }
}

impl SubEmittersModule {
    /// Binds the child emission settings of entry `index`.
    pub(crate) fn bind(&mut self, index: usize, target: SubEmitterTarget) {
        if self.targets.len() < self.entries.len() {
            self.targets.resize(self.entries.len(), None);
        }
        if let Some(slot) = self.targets.get_mut(index) {
            *slot = Some(target);
        }
    }

    /// The bound child emission settings of entry `index`.
    pub fn target(&self, index: usize) -> Option<&SubEmitterTarget> {
        self.targets.get(index).and_then(Option::as_ref)
    }

    fn depth_allows(&self, particle: &Particle) -> bool {
        if particle.sub_emit_depth >= self.max_depth {
            debug!(
                "Ignoring sub-emitter trigger at depth {} (max {})",
                particle.sub_emit_depth, self.max_depth
            );
            return false;
        }
        true
    }

    /// Queues one-shot events for every entry of `kind`.
    pub(crate) fn fire(
        &self,
        kind: SubEmitterType,
        particle: &Particle,
        space: &SpaceContext,
        rng: &mut ParticleRng,
        out: &mut Vec<SubEmitEvent>,
    ) {
        if !self.enabled || !self.entries.iter().any(|e| e.kind == kind) {
            return;
        }
        if !self.depth_allows(particle) {
            return;
        }
        for index in 0..self.entries.len() {
            if self.entries[index].kind == kind {
                self.fire_entry(index, particle, space, rng, out);
            }
        }
    }

    /// Queues a one-shot event for entry `index`, whatever its type.
    pub(crate) fn fire_entry(
        &self,
        index: usize,
        particle: &Particle,
        space: &SpaceContext,
        rng: &mut ParticleRng,
        out: &mut Vec<SubEmitEvent>,
    ) {
        let Some(entry) = self.entries.get(index) else {
            return;
        };
        if self.target(index).is_none() || particle.sub_emit_depth >= self.max_depth {
            return;
        }
        if !rng.chance(entry.emit_probability) {
            return;
        }
        out.push(SubEmitEvent {
            target: entry.emitter,
            position: space.to_world_point(particle.position),
            inherit: InheritedState::capture(particle, space, entry.properties),
            depth: particle.sub_emit_depth + 1,
            rate_at_duration: 0.0,
            kind: SubEmitKind::OneShot,
        });
    }

    /// Advances the particle's Birth trails to its current time and queues a
    /// particle event for every emission.
    pub(crate) fn advance_trails(
        &self,
        particle: &mut Particle,
        space: &SpaceContext,
        rng: &mut ParticleRng,
        samples: &mut Vec<EmissionSample>,
        out: &mut Vec<SubEmitEvent>,
    ) {
        if !self.enabled || particle.sub_emit_info.is_empty() {
            return;
        }
        let now = particle.cur_time;
        let world = space.to_world_point(particle.position);
        let mut trails = std::mem::take(&mut particle.sub_emit_info);
        for trail in &mut trails {
            let Some(entry) = self.entries.get(trail.sub_emitter) else {
                continue;
            };
            let Some(target) = self.target(trail.sub_emitter) else {
                continue;
            };
            trail.info.advance_to(now, world);
            samples.clear();
            target
                .emission
                .collect(&mut trail.info, rng, target.max_particles as usize, samples);
            if samples.is_empty() {
                continue;
            }

            let inherit = InheritedState::capture(particle, space, entry.properties);
            let (pre, cur) = (trail.info.pre_time, trail.info.current_time);
            let span = cur - pre;
            for sample in samples.iter() {
                if !rng.chance(entry.emit_probability) {
                    continue;
                }
                let position = sample.position.unwrap_or_else(|| {
                    let f = if span > 0.0 {
                        ((sample.time - pre) / span).clamp(0.0, 1.0)
                    } else {
                        1.0
                    };
                    trail.info.pre_world_position.lerp(trail.info.current_world_position, f)
                });
                out.push(SubEmitEvent {
                    target: entry.emitter,
                    position,
                    inherit,
                    depth: particle.sub_emit_depth + 1,
                    rate_at_duration: trail.info.rate_at(sample.time),
                    kind: SubEmitKind::Particle {
                        age: (now - sample.time).max(0.0),
                    },
                });
            }
        }
        particle.sub_emit_info = trails;
    }
}

impl ParticleModule for SubEmittersModule {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init_particle_state(&mut self, particle: &mut Particle, ctx: &mut SpawnContext) {
        if !self.entries.iter().any(|e| e.kind == SubEmitterType::Birth) {
            return;
        }
        if !self.depth_allows(particle) {
            return;
        }
        let world = ctx.space.to_world_point(particle.position);
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.kind != SubEmitterType::Birth {
                continue;
            }
            let Some(target) = self.targets.get(index).and_then(Option::as_ref) else {
                continue;
            };
            particle.sub_emit_info.push(SubEmitTrail {
                sub_emitter: index,
                info: ParticleSystemEmitInfo::new(
                    particle.birth_time,
                    world,
                    0.0,
                    target.duration,
                    target.looping,
                ),
            });
        }
    }
}
