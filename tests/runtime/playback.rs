use bevy::prelude::default;
use bevy_confetti::prelude::*;

use super::helpers::*;

#[test]
fn paused_particles_do_not_drift() {
    let mut data = rate_emitter(20.0, 10.0);
    data.main.start_speed = MinMaxCurve::Constant(2.0);
    data.main.gravity_modifier = MinMaxCurve::Constant(1.0);
    let mut system = build(&data, 3);
    system.play();
    run(&mut system, 30, FRAME);

    let snapshot: Vec<_> = system
        .particles()
        .iter()
        .map(|p| (p.rate_at_life_time, p.position))
        .collect();
    let time = system.time();
    assert!(!snapshot.is_empty());

    system.pause();
    assert!(system.is_paused());
    run(&mut system, 120, FRAME);

    let paused: Vec<_> = system
        .particles()
        .iter()
        .map(|p| (p.rate_at_life_time, p.position))
        .collect();
    assert_eq!(paused, snapshot);
    assert_eq!(system.time(), time);

    system.resume();
    system.update(FRAME);
    assert!(system.time() > time);
    assert_ne!(system.particles()[0].position, snapshot[0].1);
}

#[test]
fn non_looping_system_ramps_up_then_completes_once() {
    let data = EmitterData {
        main: MainModule {
            duration: 1.0,
            looping: false,
            max_particles: 100,
            start_lifetime: MinMaxCurve::Constant(1.0),
            ..default()
        },
        emission: EmissionModule {
            rate_over_time: MinMaxCurve::Constant(100.0),
            ..default()
        },
        ..default()
    };
    let mut system = build(&data, 11);
    system.play();

    let mut completed = 0;
    let mut peak = 0;
    for _ in 0..60 {
        system.update(FRAME);
        peak = peak.max(system.particle_count());
        completed += system
            .drain_events()
            .filter(|e| *e == ParticleSystemEvent::Completed)
            .count();
    }
    assert!(peak <= 100);
    assert!(
        (95..=100).contains(&system.particle_count()),
        "count after one second: {}",
        system.particle_count()
    );
    assert_eq!(completed, 0);

    for _ in 0..70 {
        system.update(FRAME);
        completed += system
            .drain_events()
            .filter(|e| *e == ParticleSystemEvent::Completed)
            .count();
    }
    assert_eq!(system.particle_count(), 0);
    assert!(system.pooled_count() >= 95);
    assert_eq!(completed, 1);
    assert!(system.is_stopped());
}

#[test]
fn looping_system_reports_every_cycle() {
    let mut data = rate_emitter(5.0, 0.5);
    data.main.duration = 1.0;
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 210, FRAME);

    let events: Vec<_> = system.drain_events().collect();
    assert_eq!(
        events,
        vec![
            ParticleSystemEvent::Cycled { cycle: 0 },
            ParticleSystemEvent::Cycled { cycle: 1 },
            ParticleSystemEvent::Cycled { cycle: 2 },
        ]
    );
    assert!(system.is_emitting());
}

#[test]
fn stop_lets_particles_age_out() {
    let mut system = build(&rate_emitter(30.0, 1.0), 1);
    system.play();
    run(&mut system, 30, FRAME);
    let count = system.particle_count();
    assert!(count > 0);

    system.stop();
    assert!(!system.is_emitting());
    run(&mut system, 40, FRAME);
    assert!(system.particle_count() < count);
    run(&mut system, 60, FRAME);
    assert_eq!(system.particle_count(), 0);
}

#[test]
fn stop_behavior_can_clear_immediately() {
    let mut data = rate_emitter(30.0, 1.0);
    data.main.stop_behavior = StopBehavior::StopEmittingAndClear;
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 30, FRAME);
    let count = system.particle_count();
    assert!(count > 0);

    system.stop();
    assert_eq!(system.particle_count(), 0);
    assert_eq!(system.pooled_count(), count);
}

#[test]
fn playing_again_reuses_pooled_particles() {
    let mut data = rate_emitter(30.0, 1.0);
    data.main.stop_behavior = StopBehavior::StopEmittingAndClear;
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 30, FRAME);
    system.stop();
    let pooled = system.pooled_count();

    system.play();
    run(&mut system, 10, FRAME);
    assert!(system.particle_count() > 0);
    assert_eq!(system.pooled_count(), pooled - system.particle_count());
}

#[test]
fn simulation_speed_scales_time() {
    let mut data = rate_emitter(10.0, 5.0);
    data.main.simulation_speed = 2.0;
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 30, FRAME);
    assert!((system.time() - 1.0).abs() < 1e-4);
}

#[test]
fn start_delay_postpones_emission() {
    let mut data = rate_emitter(20.0, 5.0);
    data.main.start_delay = MinMaxCurve::Constant(0.5);
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 24, FRAME);
    assert_eq!(system.particle_count(), 0);
    run(&mut system, 36, FRAME);
    assert!(system.particle_count() > 0);
}

#[test]
fn same_seed_reproduces_the_same_particles() {
    let mut data = rate_emitter(40.0, 2.0);
    data.main.start_speed = MinMaxCurve::between(1.0, 4.0);
    data.shape = ShapeModule::new(ParticleSystemShape::Sphere(SphereShape::default()));

    let mut a = build(&data, 42);
    let mut b = build(&data, 42);
    let mut c = build(&data, 43);
    for system in [&mut a, &mut b, &mut c] {
        system.play();
        run(system, 45, FRAME);
    }
    assert_eq!(a.particles(), b.particles());
    assert_ne!(a.particles(), c.particles());
}

#[test]
fn fixed_seed_overrides_the_given_seed() {
    let mut data = rate_emitter(40.0, 2.0);
    data.main.start_speed = MinMaxCurve::between(1.0, 4.0);
    data.fixed_seed = Some(5);

    let mut a = build(&data, 1);
    let mut b = build(&data, 2);
    for system in [&mut a, &mut b] {
        system.play();
        run(system, 20, FRAME);
    }
    assert_eq!(a.particles(), b.particles());
}
