use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ParticleModule;
use crate::asset::MinMaxCurve;
use crate::asset::serde_helpers::{default_one_f32, default_true, is_true, serde_default};
use crate::emit_info::ParticleSystemEmitInfo;
use crate::random::ParticleRng;

serde_default!(rate_over_time, MinMaxCurve, MinMaxCurve::Constant(10.0));
serde_default!(burst_count, MinMaxCurve, MinMaxCurve::Constant(30.0));
serde_default!(cycle_count, u32, 1);
serde_default!(repeat_interval, f32, 0.01);

/// A batch of particles emitted at a fixed time of the duration cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct ParticleEmissionBurst {
    /// Seconds into the cycle.
    pub time: f32,
    /// Number of particles, sampled at the burst's duration phase and rounded.
    ///
    /// Defaults to `30`.
    #[serde(default = "default_burst_count")]
    pub count: MinMaxCurve,
    /// How many times the burst repeats within a cycle. `0` repeats until the end of
    /// the cycle. Defaults to `1`.
    #[serde(default = "default_cycle_count")]
    pub cycle_count: u32,
    /// Seconds between repeats. Defaults to `0.01`.
    #[serde(default = "default_repeat_interval")]
    pub repeat_interval: f32,
    /// Chance of the burst firing, from `0.0` to `1.0`. Defaults to `1.0`.
    #[serde(default = "default_one_f32")]
    pub probability: f32,
}

impl Default for ParticleEmissionBurst {
    fn default() -> Self {
        Self {
            time: 0.0,
            count: default_burst_count(),
            cycle_count: default_cycle_count(),
            repeat_interval: default_repeat_interval(),
            probability: 1.0,
        }
    }
}

impl ParticleEmissionBurst {
    /// Offsets of every firing within one cycle of `duration` seconds.
    fn firings(&self, duration: f32) -> impl Iterator<Item = f32> + '_ {
        let interval = self.repeat_interval.max(1e-4);
        let limit = if self.cycle_count == 0 {
            u32::MAX
        } else {
            self.cycle_count
        };
        (0..limit)
            .map(move |i| self.time + i as f32 * interval)
            .take_while(move |&t| t < duration)
    }
}

/// One particle the emission module decided to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionSample {
    /// Birth time.
    pub time: f32,
    /// World point to spawn at, when emission is tied to movement.
    pub position: Option<Vec3>,
    /// Index within the emission batch and the batch size.
    pub batch: (u32, u32),
}

/// Decides how many particles spawn and when.
///
/// Rates carry their fractional remainder in the emit info so that sub-integer rates
/// emit the right total over many frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Reflect)]
pub struct EmissionModule {
    /// Whether the system emits on its own. Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// Particles per second, sampled by duration phase. Defaults to `10.0`.
    #[serde(default = "default_rate_over_time")]
    pub rate_over_time: MinMaxCurve,
    /// Particles per world unit travelled. Defaults to `0.0`.
    #[serde(default, skip_serializing_if = "MinMaxCurve::is_zero")]
    pub rate_over_distance: MinMaxCurve,
    /// Bursts within each cycle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bursts: Vec<ParticleEmissionBurst>,
}

impl Default for EmissionModule {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_over_time: default_rate_over_time(),
            rate_over_distance: MinMaxCurve::Constant(0.0),
            bursts: Vec::new(),
        }
    }
}

impl ParticleModule for EmissionModule {
    fn enabled(&self) -> bool {
        self.enabled
    }
}

fn random_for(curve: &MinMaxCurve, rng: &mut ParticleRng) -> f32 {
    if curve.is_random() { rng.f32() } else { 0.0 }
}

fn kept(count: u32, capacity: usize) -> u32 {
    u32::try_from(capacity).map_or(count, |capacity| count.min(capacity))
}

// bursts of one advance are not in time order across cycles and bursts
fn keep_earliest(out: &mut Vec<EmissionSample>, first: usize, capacity: usize) {
    out[first..].sort_by(|a, b| a.time.total_cmp(&b.time));
    out.truncate(first + capacity);
}

impl EmissionModule {
    /// Appends the emissions of the last advance of `info` to `out`.
    ///
    /// Each source appends at most its earliest `capacity` samples. Rate remainders
    /// are consumed whether or not their particles fit.
    pub fn collect(
        &self,
        info: &mut ParticleSystemEmitInfo,
        rng: &mut ParticleRng,
        capacity: usize,
        out: &mut Vec<EmissionSample>,
    ) {
        if !self.enabled {
            return;
        }
        self.collect_over_time(info, rng, capacity, out);
        self.collect_over_distance(info, rng, capacity, out);
        self.collect_bursts(info, rng, capacity, out);
    }

    fn collect_over_time(
        &self,
        info: &mut ParticleSystemEmitInfo,
        rng: &mut ParticleRng,
        capacity: usize,
        out: &mut Vec<EmissionSample>,
    ) {
        let Some((start, end)) = info.emitting_window() else {
            return;
        };
        let interval = end - start;
        let rate = self
            .rate_over_time
            .get_value(info.rate_at_duration, random_for(&self.rate_over_time, rng))
            .max(0.0);
        let amount = rate * interval;
        let before = info.left_rate_over_time;
        let total = before + amount;
        let count = total.floor();
        info.left_rate_over_time = total - count;

        let count = count as u32;
        for k in 1..=kept(count, capacity) {
            let f = if amount > 0.0 {
                ((k as f32 - before) / amount).clamp(0.0, 1.0)
            } else {
                1.0
            };
            out.push(EmissionSample {
                time: start + f * interval,
                position: None,
                batch: (k - 1, count),
            });
        }
    }

    fn collect_over_distance(
        &self,
        info: &mut ParticleSystemEmitInfo,
        rng: &mut ParticleRng,
        capacity: usize,
        out: &mut Vec<EmissionSample>,
    ) {
        if self.rate_over_distance.is_zero() || info.emitting_window().is_none() {
            return;
        }
        let distance = info.move_vec.length();
        if distance <= 0.0 {
            return;
        }
        let rate = self
            .rate_over_distance
            .get_value(
                info.rate_at_duration,
                random_for(&self.rate_over_distance, rng),
            )
            .max(0.0);
        let amount = rate * distance;
        let before = info.left_rate_over_distance;
        let total = before + amount;
        let count = total.floor();
        info.left_rate_over_distance = total - count;

        let count = count as u32;
        let elapsed = info.current_time - info.pre_time;
        for k in 1..=kept(count, capacity) {
            let f = if amount > 0.0 {
                ((k as f32 - before) / amount).clamp(0.0, 1.0)
            } else {
                1.0
            };
            out.push(EmissionSample {
                time: info.pre_time + f * elapsed,
                position: Some(info.pre_world_position + info.move_vec * f),
                batch: (k - 1, count),
            });
        }
    }

    fn collect_bursts(
        &self,
        info: &ParticleSystemEmitInfo,
        rng: &mut ParticleRng,
        capacity: usize,
        out: &mut Vec<EmissionSample>,
    ) {
        let duration = info.duration();
        if self.bursts.is_empty() || duration <= 0.0 || !duration.is_finite() {
            return;
        }
        let (pre, cur) = (info.pre_time, info.current_time);
        if cur <= pre || cur <= info.emission_start() {
            return;
        }

        let first_cycle = ((pre - info.emission_start()) / duration).floor().max(0.0) as u32;
        let last_cycle = ((cur - info.emission_start()) / duration).floor().max(0.0) as u32;
        let last_cycle = if info.is_looping() { last_cycle } else { 0 };
        let first = out.len();

        for cycle in first_cycle..=last_cycle {
            let cycle_start = info.emission_start() + cycle as f32 * duration;
            for burst in &self.bursts {
                for offset in burst.firings(duration) {
                    let time = cycle_start + offset;
                    if time < pre || time >= cur {
                        continue;
                    }
                    if !rng.chance(burst.probability) {
                        continue;
                    }
                    let value = burst
                        .count
                        .get_value(info.rate_at(time), random_for(&burst.count, rng));
                    let count = value.round().max(0.0) as u32;
                    out.extend((0..kept(count, capacity)).map(|i| EmissionSample {
                        time,
                        position: None,
                        batch: (i, count),
                    }));
                    if out.len() - first > capacity.saturating_mul(2) {
                        keep_earliest(out, first, capacity);
                    }
                }
            }
        }
        if out.len() - first > capacity {
            keep_earliest(out, first, capacity);
        }
    }
}
