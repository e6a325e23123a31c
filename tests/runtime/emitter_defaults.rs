use bevy_confetti::prelude::*;

#[test]
fn emitter_data_defaults() {
    let data = EmitterData::default();
    assert!(data.enabled);
    assert_eq!(data.fixed_seed, None);
    assert_eq!(data.main.duration, 5.0);
    assert!(data.main.looping);
    assert!(!data.main.prewarm);
    assert_eq!(data.main.max_particles, 1000);
    assert_eq!(data.main.simulation_speed, 1.0);
    assert_eq!(data.main.stop_behavior, StopBehavior::StopEmitting);
    assert_eq!(data.main.simulation_space, SimulationSpace::Local);
    assert_eq!(data.main.start_size, StartSize::Uniform(MinMaxCurve::Constant(1.0)));
    assert!(data.main.start_color.is_white());
    assert_eq!(data.emission.rate_over_time, MinMaxCurve::Constant(10.0));
    assert!(data.emission.bursts.is_empty());
    assert!(matches!(data.shape.shape, ParticleSystemShape::Cone(_)));
}

#[test]
fn optional_modules_start_disabled() {
    let data = EmitterData::default();
    let enabled = [
        data.velocity_over_lifetime.enabled,
        data.limit_velocity_over_lifetime.enabled,
        data.inherit_velocity.enabled,
        data.force_over_lifetime.enabled,
        data.color_over_lifetime.enabled,
        data.color_by_speed.enabled,
        data.size_over_lifetime.enabled,
        data.size_by_speed.enabled,
        data.rotation_over_lifetime.enabled,
        data.rotation_by_speed.enabled,
        data.noise.enabled,
        data.collision.enabled,
        data.sub_emitters.enabled,
        data.texture_sheet_animation.enabled,
    ];
    assert!(enabled.iter().all(|e| !e));
    assert!(data.emission.enabled);
    assert!(data.shape.enabled);
}

#[test]
fn sub_emitter_depth_defaults_to_four() {
    let data = EmitterData::default();
    assert_eq!(data.sub_emitters.max_depth, 4);
    let system = ParticleSystem::new(&data, 0).expect("default data should be valid");
    assert_eq!(system.max_sub_emitter_depth(), 4);
}

#[test]
fn new_systems_are_stopped_and_empty() {
    let system = ParticleSystem::new(&EmitterData::default(), 0).expect("valid system");
    assert_eq!(system.state(), PlaybackState::Stopped);
    assert!(!system.is_emitting());
    assert_eq!(system.particle_count(), 0);
    assert_eq!(system.pooled_count(), 0);
    assert_eq!(system.time(), 0.0);
    assert!(system.emit_info().is_none());
}

#[test]
fn update_without_play_does_nothing() {
    let mut system = ParticleSystem::new(&EmitterData::default(), 0).expect("valid system");
    for _ in 0..30 {
        system.update(1.0 / 60.0);
    }
    assert_eq!(system.particle_count(), 0);
    assert_eq!(system.time(), 0.0);
}
