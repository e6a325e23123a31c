use bevy::prelude::*;

/// Normalized phase of `time` within the emitter's duration cycle.
///
/// Looping systems wrap every `duration` seconds, non-looping systems clamp to
/// `[0, 1]`. The phase is `0.0` until the start delay has elapsed.
pub fn compute_rate_at_duration(time: f32, start_delay: f32, duration: f32, looping: bool) -> f32 {
    if duration <= 0.0 || !duration.is_finite() {
        return 0.0;
    }
    let elapsed = time - start_delay;
    if elapsed < 0.0 {
        return 0.0;
    }
    if looping {
        elapsed.rem_euclid(duration) / duration
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

/// Number of whole duration cycles completed by `time`.
pub fn cycle_index(time: f32, start_delay: f32, duration: f32) -> u32 {
    if duration <= 0.0 || !duration.is_finite() {
        return 0;
    }
    let elapsed = time - start_delay;
    if elapsed < 0.0 {
        return 0;
    }
    (elapsed / duration).floor() as u32
}

/// Emission timing state of one emitter instance.
///
/// Owned by a particle system for its own emission, by a particle for a Birth
/// sub-emitter trail, or by a triggered one-shot sub-emission.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystemEmitInfo {
    /// Time at the start of the last advance.
    pub pre_time: f32,
    /// Time at the end of the last advance.
    pub current_time: f32,
    /// Emitter world position at the start of the last advance.
    pub pre_world_position: Vec3,
    /// Emitter world position at the end of the last advance.
    pub current_world_position: Vec3,
    /// Time at which emission starts, the creation time plus the sampled delay.
    pub start_delay: f32,
    /// World space movement during the last advance.
    pub move_vec: Vec3,
    /// World space speed during the last advance.
    pub speed: f32,
    /// Phase within the duration cycle at `current_time`.
    pub rate_at_duration: f32,
    pub(crate) duration: f32,
    pub(crate) looping: bool,
    pub(crate) left_rate_over_time: f32,
    pub(crate) left_rate_over_distance: f32,
}

impl ParticleSystemEmitInfo {
    /// Starts timing at `time` and `world_position`.
    pub fn new(
        time: f32,
        world_position: Vec3,
        start_delay: f32,
        duration: f32,
        looping: bool,
    ) -> Self {
        let start_delay = time + start_delay.max(0.0);
        Self {
            pre_time: time,
            current_time: time,
            pre_world_position: world_position,
            current_world_position: world_position,
            start_delay,
            move_vec: Vec3::ZERO,
            speed: 0.0,
            rate_at_duration: 0.0,
            duration,
            looping,
            left_rate_over_time: 0.0,
            left_rate_over_distance: 0.0,
        }
    }

    /// Advances to `time` with the emitter now at `world_position`.
    pub fn advance_to(&mut self, time: f32, world_position: Vec3) {
        let interval = time - self.current_time;
        self.pre_time = self.current_time;
        self.current_time = time;
        self.pre_world_position = self.current_world_position;
        self.current_world_position = world_position;
        self.move_vec = self.current_world_position - self.pre_world_position;
        self.speed = if interval > 0.0 {
            self.move_vec.length() / interval
        } else {
            0.0
        };
        self.rate_at_duration = self.rate_at(time);
    }

    /// Advances by `interval` seconds.
    pub fn advance(&mut self, interval: f32, world_position: Vec3) {
        self.advance_to(self.current_time + interval, world_position);
    }

    /// Phase within the duration cycle at an arbitrary time.
    pub fn rate_at(&self, time: f32) -> f32 {
        compute_rate_at_duration(time, self.start_delay, self.duration, self.looping)
    }

    /// Length of one cycle in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Whether the cycle repeats.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Absolute time the first cycle starts.
    pub fn emission_start(&self) -> f32 {
        self.start_delay
    }

    /// Absolute time emission ends, if the emitter does not loop.
    pub fn emission_end(&self) -> Option<f32> {
        (!self.looping).then_some(self.start_delay + self.duration)
    }

    /// Cycles completed by `current_time`. A non-looping emitter completes at most one.
    pub fn completed_cycles(&self) -> u32 {
        let cycles = cycle_index(self.current_time, self.start_delay, self.duration);
        if self.looping { cycles } else { cycles.min(1) }
    }

    /// Returns `true` once a non-looping emitter has passed its duration.
    pub fn is_finished(&self) -> bool {
        self.emission_end()
            .is_some_and(|end| self.current_time >= end)
    }

    /// The part of the last advance during which the emitter was emitting.
    pub fn emitting_window(&self) -> Option<(f32, f32)> {
        let start = self.pre_time.max(self.start_delay);
        let end = match self.emission_end() {
            Some(end) => self.current_time.min(end),
            None => self.current_time,
        };
        (end > start).then_some((start, end))
    }
}
