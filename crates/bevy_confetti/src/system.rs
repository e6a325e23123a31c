use bevy::prelude::*;

use crate::asset::EmitterData;
use crate::emit_info::ParticleSystemEmitInfo;
use crate::error::ParticleSystemError;
use crate::modules::{
    EmissionSample, FrameInfo, InheritedState, ParticleModules, SpaceContext, SpawnContext,
    StopBehavior, SubEmitEvent, SubEmitKind, SubEmitterType, UpdateContext,
};
use crate::particle::{ContributionName, Particle};
use crate::random::ParticleRng;
use crate::space::{EmitterTransform, SimulationSpace};

/// Fixed step used to simulate one duration when a prewarmed system starts playing.
pub const PREWARM_STEP: f32 = 1.0 / 30.0;

/// Playback state of a [`ParticleSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    /// Emitting and simulating.
    Playing,
    /// Frozen. Updates are ignored.
    Paused,
    /// Not emitting. Remaining particles keep aging.
    #[default]
    Stopped,
}

/// Lifecycle notifications produced by [`ParticleSystem::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleSystemEvent {
    /// A duration cycle finished.
    Cycled {
        /// Index of the finished cycle, starting at `0`.
        cycle: u32,
    },
    /// A non-looping system finished its duration and its last particle died.
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
struct TriggeredEmission {
    info: ParticleSystemEmitInfo,
    inherit: InheritedState,
    depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSpawn {
    time: f32,
    origin: Option<Vec3>,
    batch: (u32, u32),
    rate_at_duration: f32,
    inherit: Option<InheritedState>,
    depth: u32,
}

/// A single CPU simulated emitter.
///
/// Owns its particles, a recycle pool, its emission timing and a seeded random
/// source. Feeding two systems built from the same data and seed the same intervals
/// produces identical particles.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    modules: ParticleModules,
    transform: EmitterTransform,
    rng: ParticleRng,
    time: f32,
    state: PlaybackState,
    emit_info: Option<ParticleSystemEmitInfo>,
    standalone_emission: bool,
    active: Vec<Particle>,
    pool: Vec<Particle>,
    triggered: Vec<TriggeredEmission>,
    outbox: Vec<SubEmitEvent>,
    events: Vec<ParticleSystemEvent>,
    reported_cycles: u32,
    completed: bool,
    last_world_position: Option<Vec3>,
    emitter_velocity: Vec3,
    pending: Vec<PendingSpawn>,
    samples: Vec<EmissionSample>,
}

fn check_probability(p: f32) -> Result<(), ParticleSystemError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ParticleSystemError::InvalidProbability(p))
    }
}

impl ParticleSystem {
    /// Builds a stopped system from emitter data.
    ///
    /// `seed` is used unless the emitter has a fixed seed.
    pub fn new(data: &EmitterData, seed: u64) -> Result<Self, ParticleSystemError> {
        let main = &data.main;
        if main.max_particles == 0 {
            return Err(ParticleSystemError::ZeroMaxParticles);
        }
        if !main.duration.is_finite() || main.duration <= 0.0 {
            return Err(ParticleSystemError::InvalidDuration(main.duration));
        }
        for burst in &data.emission.bursts {
            check_probability(burst.probability)?;
        }
        for entry in &data.sub_emitters.entries {
            check_probability(entry.emit_probability)?;
        }

        Ok(Self {
            modules: ParticleModules::from(data),
            transform: EmitterTransform::default(),
            rng: ParticleRng::new(data.fixed_seed.unwrap_or(seed)),
            time: 0.0,
            state: PlaybackState::Stopped,
            emit_info: None,
            standalone_emission: true,
            active: Vec::new(),
            pool: Vec::new(),
            triggered: Vec::new(),
            outbox: Vec::new(),
            events: Vec::new(),
            reported_cycles: 0,
            completed: false,
            last_world_position: None,
            emitter_velocity: Vec3::ZERO,
            pending: Vec::new(),
            samples: Vec::new(),
        })
    }

    /// Starts playback, or resumes a paused system. Never clears particles.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => self.state = PlaybackState::Playing,
            PlaybackState::Stopped => {
                let main = &self.modules.main;
                let delay = main.start_delay.get_value(0.0, self.rng.f32());
                self.emit_info = Some(ParticleSystemEmitInfo::new(
                    self.time,
                    self.transform.translation(),
                    delay,
                    main.duration,
                    main.looping,
                ));
                self.reported_cycles = 0;
                self.completed = false;
                self.state = PlaybackState::Playing;
                if main.prewarm && main.looping {
                    self.prewarm();
                }
            }
        }
    }

    fn prewarm(&mut self) {
        let steps = (self.modules.main.duration / PREWARM_STEP).ceil() as u32;
        for _ in 0..steps {
            self.step(PREWARM_STEP);
        }
        self.events.clear();
        self.outbox.clear();
    }

    /// Freezes a playing system.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Continues a paused system.
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Stops emitting using the main module's stop behavior.
    pub fn stop(&mut self) {
        self.stop_with(self.modules.main.stop_behavior);
    }

    /// Stops emitting. Pending one-shot sub-emissions are dropped.
    pub fn stop_with(&mut self, behavior: StopBehavior) {
        self.state = PlaybackState::Stopped;
        self.emit_info = None;
        self.triggered.clear();
        if behavior == StopBehavior::StopEmittingAndClear {
            self.pool.append(&mut self.active);
        }
    }

    /// Advances the simulation by `interval` seconds, scaled by the simulation speed.
    pub fn update(&mut self, interval: f32) {
        if self.state == PlaybackState::Paused {
            return;
        }
        if self.state == PlaybackState::Stopped
            && self.active.is_empty()
            && self.triggered.is_empty()
        {
            return;
        }
        let dt = interval.max(0.0) * self.modules.main.simulation_speed.max(0.0);
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.step(dt);
    }

    fn step(&mut self, dt: f32) {
        let world = self.transform.translation();
        self.emitter_velocity = match self.last_world_position {
            Some(last) => (world - last) / dt,
            None => Vec3::ZERO,
        };
        self.last_world_position = Some(world);
        self.time += dt;
        let now = self.time;

        if let Some(info) = &mut self.emit_info {
            info.advance_to(now, world);
        }
        let rate_at_duration = self.rate_at_duration();
        self.modules.update(&FrameInfo {
            interval: dt,
            time: now,
            rate_at_duration,
        });

        let capacity = (self.modules.main.max_particles as usize).saturating_sub(self.active.len());
        self.collect_emissions(now, capacity);
        let pending = std::mem::take(&mut self.pending);
        for spawn in pending.iter().take(capacity) {
            self.spawn(spawn);
        }
        self.pending = pending;

        let ctx = self.update_context();
        for particle in &mut self.active {
            simulate(
                particle,
                now,
                &self.modules,
                &ctx,
                &mut self.rng,
                &mut self.samples,
                &mut self.outbox,
            );
        }
        self.cull_dead();
        self.report_events();
    }

    fn collect_emissions(&mut self, now: f32, capacity: usize) {
        self.pending.clear();
        if self.state == PlaybackState::Playing
            && self.standalone_emission
            && let Some(info) = &mut self.emit_info
        {
            self.samples.clear();
            self.modules
                .emission
                .collect(info, &mut self.rng, capacity, &mut self.samples);
            self.pending.extend(self.samples.iter().map(|s| PendingSpawn {
                time: s.time,
                origin: s.position,
                batch: s.batch,
                rate_at_duration: info.rate_at(s.time),
                inherit: None,
                depth: 0,
            }));
        }

        for triggered in &mut self.triggered {
            let origin = triggered.info.current_world_position;
            triggered.info.advance_to(now, origin);
            self.samples.clear();
            self.modules
                .emission
                .collect(&mut triggered.info, &mut self.rng, capacity, &mut self.samples);
            self.pending.extend(self.samples.iter().map(|s| PendingSpawn {
                time: s.time,
                origin: Some(s.position.unwrap_or(origin)),
                batch: s.batch,
                rate_at_duration: triggered.info.rate_at(s.time),
                inherit: Some(triggered.inherit),
                depth: triggered.depth,
            }));
        }
        self.triggered.retain(|t| !t.info.is_finished());
        self.pending.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    fn spawn(&mut self, spawn: &PendingSpawn) {
        let mut particle = self.pool.pop().unwrap_or_default();
        particle.reset();
        particle.birth_time = spawn.time;
        particle.pre_time = spawn.time;
        particle.cur_time = spawn.time;
        particle.random_seed = self.rng.u32();
        particle.sub_emit_depth = spawn.depth;

        let space = self.space();
        let mut ctx = SpawnContext {
            space,
            origin: spawn.origin,
            emitter_velocity: self.emitter_velocity,
            rate_at_duration: spawn.rate_at_duration,
            birth_offset: (self.time - spawn.time).max(0.0),
            batch: spawn.batch,
            rng: &mut self.rng,
        };
        self.modules.init_particle(&mut particle, &mut ctx);
        if let Some(inherit) = &spawn.inherit {
            inherit.apply(&mut particle, &space);
        }
        particle.pre_position = particle.position;
        particle.cur_position = particle.position;
        particle.resolve_visuals();
        self.active.push(particle);
    }

    fn cull_dead(&mut self) {
        let space = self.space();
        let mut i = 0;
        while i < self.active.len() {
            if !self.active[i].is_dead() {
                i += 1;
                continue;
            }
            let particle = self.active.swap_remove(i);
            self.modules.sub_emitters.fire(
                SubEmitterType::Death,
                &particle,
                &space,
                &mut self.rng,
                &mut self.outbox,
            );
            self.pool.push(particle);
        }
    }

    fn report_events(&mut self) {
        if !self.standalone_emission {
            return;
        }
        let Some(info) = &self.emit_info else {
            return;
        };
        let cycles = info.completed_cycles();
        while self.reported_cycles < cycles {
            self.events.push(ParticleSystemEvent::Cycled {
                cycle: self.reported_cycles,
            });
            self.reported_cycles += 1;
        }
        if !self.completed
            && info.is_finished()
            && self.triggered.is_empty()
            && self.active.is_empty()
        {
            self.completed = true;
            self.events.push(ParticleSystemEvent::Completed);
            self.state = PlaybackState::Stopped;
            self.emit_info = None;
        }
    }

    fn rate_at_duration(&self) -> f32 {
        self.emit_info.as_ref().map_or(0.0, |info| info.rate_at_duration)
    }

    /// The emitter transform paired with this system's simulation space.
    pub fn space(&self) -> SpaceContext {
        SpaceContext {
            transform: self.transform,
            simulation_space: self.modules.main.simulation_space,
        }
    }

    fn update_context(&self) -> UpdateContext {
        UpdateContext {
            space: self.space(),
            emitter_velocity: self.emitter_velocity,
            rate_at_duration: self.rate_at_duration(),
            time: self.time,
        }
    }

    /// Applies a sub-emission queued by another system of the same effect.
    pub fn receive_sub_emission(&mut self, event: &SubEmitEvent) {
        match event.kind {
            SubEmitKind::OneShot => {
                let duration = event.inherit.duration(self.modules.main.duration);
                self.triggered.push(TriggeredEmission {
                    info: ParticleSystemEmitInfo::new(
                        self.time,
                        event.position,
                        0.0,
                        duration,
                        false,
                    ),
                    inherit: event.inherit,
                    depth: event.depth,
                });
            }
            SubEmitKind::Particle { age } => {
                if self.active.len() >= self.modules.main.max_particles as usize {
                    return;
                }
                self.spawn(&PendingSpawn {
                    time: self.time - age,
                    origin: Some(event.position),
                    batch: (0, 1),
                    rate_at_duration: event.rate_at_duration,
                    inherit: Some(event.inherit),
                    depth: event.depth,
                });
                let ctx = self.update_context();
                if let Some(particle) = self.active.last_mut() {
                    simulate(
                        particle,
                        self.time,
                        &self.modules,
                        &ctx,
                        &mut self.rng,
                        &mut self.samples,
                        &mut self.outbox,
                    );
                }
                self.cull_dead();
            }
        }
    }

    /// Fires sub-emitter `index` once for the given active particle indices, or for
    /// every active particle when `particles` is `None`.
    ///
    /// Fires regardless of the entry's type. The events are delivered by the owning
    /// effect.
    pub fn trigger_sub_emitter(&mut self, index: usize, particles: Option<&[usize]>) {
        let space = self.space();
        let sub_emitters = &self.modules.sub_emitters;
        if !sub_emitters.enabled {
            return;
        }
        let selected: Vec<&Particle> = match particles {
            Some(indices) => indices.iter().filter_map(|&i| self.active.get(i)).collect(),
            None => self.active.iter().collect(),
        };
        for particle in selected {
            sub_emitters.fire_entry(index, particle, &space, &mut self.rng, &mut self.outbox);
        }
    }

    /// Sets a named velocity on an active particle, converted from `space`.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn add_particle_velocity(
        &mut self,
        index: usize,
        name: ContributionName,
        velocity: Vec3,
        space: SimulationSpace,
    ) -> bool {
        let velocity = self.space().vector(velocity, space);
        let Some(particle) = self.active.get_mut(index) else {
            return false;
        };
        particle.set_velocity_contribution(name, velocity);
        true
    }

    /// Removes a named velocity from an active particle.
    pub fn remove_particle_velocity(
        &mut self,
        index: usize,
        name: ContributionName,
    ) -> Option<Vec3> {
        self.active
            .get_mut(index)?
            .contributions
            .velocity
            .remove(name)
    }

    /// Sets a named acceleration on an active particle, converted from `space`.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn add_particle_acceleration(
        &mut self,
        index: usize,
        name: ContributionName,
        acceleration: Vec3,
        space: SimulationSpace,
    ) -> bool {
        let acceleration = self.space().vector(acceleration, space);
        let Some(particle) = self.active.get_mut(index) else {
            return false;
        };
        particle.set_acceleration_contribution(name, acceleration);
        true
    }

    /// Removes a named acceleration from an active particle.
    pub fn remove_particle_acceleration(
        &mut self,
        index: usize,
        name: ContributionName,
    ) -> Option<Vec3> {
        self.active
            .get_mut(index)?
            .contributions
            .acceleration
            .remove(name)
    }

    /// Active particles, in no particular order.
    pub fn particles(&self) -> &[Particle] {
        &self.active
    }

    /// Number of active particles.
    pub fn particle_count(&self) -> usize {
        self.active.len()
    }

    /// Number of recycled particles waiting for reuse.
    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Simulated seconds since the system was created.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns `true` while playing.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Returns `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Returns `true` while stopped.
    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    /// Returns `true` while the system can still spawn particles on its own or from
    /// pending one-shot sub-emissions.
    pub fn is_emitting(&self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        let own = self.standalone_emission
            && self
                .emit_info
                .as_ref()
                .is_some_and(|info| !info.is_finished());
        own || !self.triggered.is_empty()
    }

    /// The system's modules.
    pub fn modules(&self) -> &ParticleModules {
        &self.modules
    }

    /// Mutable access to the modules. Changes apply from the next update.
    pub fn modules_mut(&mut self) -> &mut ParticleModules {
        &mut self.modules
    }

    /// Emission timing of the current playback, if playing or paused.
    pub fn emit_info(&self) -> Option<&ParticleSystemEmitInfo> {
        self.emit_info.as_ref()
    }

    /// The emitter transform.
    pub fn transform(&self) -> &EmitterTransform {
        &self.transform
    }

    /// Moves the emitter. Movement between updates drives distance emission and the
    /// emitter velocity.
    pub fn set_transform(&mut self, transform: EmitterTransform) {
        self.transform = transform;
    }

    /// World space emitter velocity measured over the last update.
    pub fn emitter_velocity(&self) -> Vec3 {
        self.emitter_velocity
    }

    /// Sub-emission depth beyond which particles no longer fire sub-emitters.
    pub fn max_sub_emitter_depth(&self) -> u32 {
        self.modules.sub_emitters.max_depth
    }

    /// Takes the lifecycle events produced since the last call.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ParticleSystemEvent> + '_ {
        self.events.drain(..)
    }

    /// Takes the sub-emissions queued for other systems since the last call.
    pub fn drain_sub_emit_events(&mut self) -> impl Iterator<Item = SubEmitEvent> + '_ {
        self.outbox.drain(..)
    }

    pub(crate) fn set_standalone_emission(&mut self, standalone: bool) {
        self.standalone_emission = standalone;
    }
}

/// Advances one particle to `now`: integration, module updates, collision triggers
/// and Birth trails. Dead particles are left untouched for culling.
fn simulate(
    particle: &mut Particle,
    now: f32,
    modules: &ParticleModules,
    ctx: &UpdateContext,
    rng: &mut ParticleRng,
    samples: &mut Vec<EmissionSample>,
    outbox: &mut Vec<SubEmitEvent>,
) {
    particle.advance_time(now);
    if particle.is_dead() {
        return;
    }
    particle.integrate();
    modules.update_particle(particle, ctx);
    if particle.collided {
        particle.collided = false;
        modules
            .sub_emitters
            .fire(SubEmitterType::Collision, particle, &ctx.space, rng, outbox);
    }
    modules
        .sub_emitters
        .advance_trails(particle, &ctx.space, rng, samples, outbox);
    particle.resolve_visuals();
}
