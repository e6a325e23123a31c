use bevy::math::Affine3A;
use bevy::prelude::*;

use crate::asset::EmitterData;
use crate::error::ParticleSystemError;
use crate::modules::{SubEmitEvent, SubEmitterTarget, SubEmitterType};
use crate::random::ParticleRng;
use crate::space::EmitterTransform;
use crate::system::{ParticleSystem, ParticleSystemEvent};

/// Every particle system described by one asset, with sub-emissions routed between
/// them.
///
/// Sub-emissions queued during an update are delivered after all systems have
/// updated, in the same frame.
#[derive(Component, Debug, Clone)]
pub struct ParticleEffect {
    systems: Vec<ParticleSystem>,
    enabled: Vec<bool>,
    offsets: Vec<Vec3>,
    routed: Vec<SubEmitEvent>,
}

impl ParticleEffect {
    /// Builds one system per emitter. Each system gets its own seed derived from
    /// `seed`.
    pub fn new(emitters: &[EmitterData], seed: u64) -> Result<Self, ParticleSystemError> {
        let len = emitters.len();
        let mut seeds = ParticleRng::new(seed);
        let mut systems = emitters
            .iter()
            .map(|data| ParticleSystem::new(data, seeds.u64()))
            .collect::<Result<Vec<_>, _>>()?;

        for (parent, data) in emitters.iter().enumerate() {
            for (index, entry) in data.sub_emitters.entries.iter().enumerate() {
                let Some(target) = emitters.get(entry.emitter) else {
                    return Err(ParticleSystemError::SubEmitterTargetOutOfRange {
                        index,
                        target: entry.emitter,
                        len,
                    });
                };
                if entry.emitter == parent && entry.kind == SubEmitterType::Birth {
                    warn!(
                        "Emitter {parent} ({}) lists itself as a Birth sub-emitter, ignoring it",
                        data.name
                    );
                    continue;
                }
                systems[parent].modules_mut().sub_emitters.bind(
                    index,
                    SubEmitterTarget {
                        emission: target.emission.clone(),
                        duration: target.main.duration,
                        looping: target.main.looping,
                        max_particles: target.main.max_particles,
                    },
                );
                if data.enabled && data.sub_emitters.enabled {
                    systems[entry.emitter].set_standalone_emission(false);
                }
            }
        }

        Ok(Self {
            systems,
            enabled: emitters.iter().map(|e| e.enabled).collect(),
            offsets: emitters.iter().map(|e| e.position).collect(),
            routed: Vec::new(),
        })
    }

    /// Plays every enabled system.
    pub fn play(&mut self) {
        for (system, enabled) in self.systems.iter_mut().zip(&self.enabled) {
            if *enabled {
                system.play();
            }
        }
    }

    /// Pauses every system.
    pub fn pause(&mut self) {
        self.systems.iter_mut().for_each(ParticleSystem::pause);
    }

    /// Resumes every paused system.
    pub fn resume(&mut self) {
        self.systems.iter_mut().for_each(ParticleSystem::resume);
    }

    /// Stops every system with its own stop behavior.
    pub fn stop(&mut self) {
        self.systems.iter_mut().for_each(ParticleSystem::stop);
    }

    /// Moves every system to `effect` combined with its emitter offset.
    pub fn set_transform(&mut self, effect: Affine3A) {
        for (system, offset) in self.systems.iter_mut().zip(&self.offsets) {
            let local = Affine3A::from_translation(*offset);
            system.set_transform(EmitterTransform::new(effect * local));
        }
    }

    /// Updates every system, then delivers the sub-emissions they queued.
    pub fn update(&mut self, interval: f32) {
        for system in &mut self.systems {
            system.update(interval);
        }
        self.route();
    }

    /// Fires sub-emitter `index` of system `system`, see
    /// [`ParticleSystem::trigger_sub_emitter`], and delivers the result immediately.
    pub fn trigger_sub_emitter(
        &mut self,
        system: usize,
        index: usize,
        particles: Option<&[usize]>,
    ) {
        if let Some(system) = self.systems.get_mut(system) {
            system.trigger_sub_emitter(index, particles);
        }
        self.route();
    }

    fn route(&mut self) {
        loop {
            self.routed.clear();
            for system in &mut self.systems {
                self.routed.extend(system.drain_sub_emit_events());
            }
            if self.routed.is_empty() {
                return;
            }
            for event in &self.routed {
                if let Some(target) = self.systems.get_mut(event.target) {
                    target.receive_sub_emission(event);
                }
            }
        }
    }

    /// Lifecycle events of every system, tagged with the system index.
    pub fn drain_events(&mut self) -> Vec<(usize, ParticleSystemEvent)> {
        let mut events = Vec::new();
        for (i, system) in self.systems.iter_mut().enumerate() {
            events.extend(system.drain_events().map(|e| (i, e)));
        }
        events
    }

    /// Returns `true` once no system is emitting and every system is empty.
    pub fn is_completed(&self) -> bool {
        self.systems
            .iter()
            .all(|s| !s.is_emitting() && s.particle_count() == 0)
    }

    /// The systems, in emitter order.
    pub fn systems(&self) -> &[ParticleSystem] {
        &self.systems
    }

    /// A single system.
    pub fn system(&self, index: usize) -> Option<&ParticleSystem> {
        self.systems.get(index)
    }

    /// Mutable access to a single system.
    pub fn system_mut(&mut self, index: usize) -> Option<&mut ParticleSystem> {
        self.systems.get_mut(index)
    }

    /// Total number of active particles.
    pub fn particle_count(&self) -> usize {
        self.systems.iter().map(ParticleSystem::particle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MinMaxCurve;
    use crate::modules::{
        EmissionModule, MainModule, ParticleEmissionBurst, SubEmitterEntry, SubEmittersModule,
    };

    fn burst_once(lifetime: f32) -> EmitterData {
        EmitterData {
            main: MainModule {
                duration: 1.0,
                looping: false,
                start_lifetime: MinMaxCurve::Constant(lifetime),
                ..default()
            },
            emission: EmissionModule {
                rate_over_time: MinMaxCurve::Constant(0.0),
                bursts: vec![ParticleEmissionBurst {
                    time: 0.0,
                    count: MinMaxCurve::Constant(1.0),
                    ..default()
                }],
                ..default()
            },
            ..default()
        }
    }

    fn with_sub_emitter(mut data: EmitterData, entry: SubEmitterEntry) -> EmitterData {
        data.sub_emitters = SubEmittersModule::default();
        data.sub_emitters.enabled = true;
        data.sub_emitters.entries = vec![entry];
        data
    }

    #[test]
    fn out_of_range_target_is_an_error() {
        let emitters = [with_sub_emitter(
            burst_once(1.0),
            SubEmitterEntry::new(3, SubEmitterType::Death),
        )];
        assert_eq!(
            ParticleEffect::new(&emitters, 0).err(),
            Some(ParticleSystemError::SubEmitterTargetOutOfRange {
                index: 0,
                target: 3,
                len: 1
            })
        );
    }

    #[test]
    fn self_birth_entries_are_ignored() {
        let emitters = [with_sub_emitter(
            burst_once(1.0),
            SubEmitterEntry::new(0, SubEmitterType::Birth),
        )];
        let mut effect = ParticleEffect::new(&emitters, 0).expect("valid effect");
        effect.play();
        for _ in 0..10 {
            effect.update(0.05);
        }
        assert_eq!(effect.particle_count(), 1);
    }

    #[test]
    fn death_sub_emitters_spawn_in_the_target() {
        let emitters = [
            with_sub_emitter(burst_once(0.1), SubEmitterEntry::new(1, SubEmitterType::Death)),
            burst_once(1.0),
        ];
        let mut effect = ParticleEffect::new(&emitters, 0).expect("valid effect");
        effect.play();
        for _ in 0..6 {
            effect.update(0.05);
        }
        let child = effect.system(1).expect("child system");
        assert_eq!(child.particle_count(), 1);
        assert_eq!(child.particles()[0].sub_emit_depth(), 1);
    }

    #[test]
    fn birth_sub_emitters_trail_their_parent() {
        let mut child = burst_once(5.0);
        child.main.looping = true;
        child.emission.bursts.clear();
        child.emission.rate_over_time = MinMaxCurve::Constant(20.0);
        let emitters = [
            with_sub_emitter(burst_once(1.0), SubEmitterEntry::new(1, SubEmitterType::Birth)),
            child,
        ];
        let mut effect = ParticleEffect::new(&emitters, 0).expect("valid effect");
        effect.play();
        for _ in 0..10 {
            effect.update(0.05);
        }
        let count = effect.system(1).map_or(0, ParticleSystem::particle_count);
        assert!((9..=11).contains(&count), "trail emitted {count}");
    }

    #[test]
    fn recursive_death_chain_stops_at_max_depth() {
        let emitters = [
            with_sub_emitter(burst_once(0.1), SubEmitterEntry::new(1, SubEmitterType::Death)),
            with_sub_emitter(burst_once(0.1), SubEmitterEntry::new(1, SubEmitterType::Death)),
        ];
        let mut effect = ParticleEffect::new(&emitters, 0).expect("valid effect");
        effect.play();
        let mut deepest = 0;
        for _ in 0..100 {
            effect.update(0.05);
            let system = effect.system(1).expect("child system");
            for p in system.particles() {
                deepest = deepest.max(p.sub_emit_depth());
            }
        }
        assert_eq!(deepest, 4);
        assert_eq!(effect.particle_count(), 0);
    }
}
