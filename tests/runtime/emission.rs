use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy_confetti::prelude::*;
use bevy_confetti::space::EmitterTransform;

use super::helpers::*;

#[test]
fn fractional_rates_accumulate_across_frames() {
    let mut system = build(&rate_emitter(2.5, 100.0), 9);
    system.play();

    let mut previous = 0;
    for frame in 1..=240 {
        system.update(FRAME);
        let count = system.particle_count();
        assert!(count - previous <= 1, "frame {frame} emitted {}", count - previous);
        previous = count;
        if frame == 60 {
            assert!((1..=4).contains(&count), "one second emitted {count}");
        }
    }
    assert!(
        (9..=11).contains(&previous),
        "four seconds emitted {previous}"
    );
}

fn burst_at_half_second(rate: f32) -> EmitterData {
    let mut data = rate_emitter(rate, 100.0);
    data.main.duration = 10.0;
    data.main.looping = false;
    data.emission.bursts.push(ParticleEmissionBurst {
        time: 0.5,
        count: MinMaxCurve::Constant(5.0),
        probability: 1.0,
        ..default()
    });
    data
}

#[test]
fn burst_fires_once_when_its_time_is_crossed() {
    let mut system = build(&burst_at_half_second(0.0), 1);
    system.play();
    run(&mut system, 27, FRAME);
    assert_eq!(system.particle_count(), 0);
    run(&mut system, 303, FRAME);
    assert_eq!(system.particle_count(), 5);

    let birth = system.particles()[0].birth_time;
    assert!(system.particles().iter().all(|p| p.birth_time == birth));
    assert!((birth - 0.5).abs() < 1e-4);
}

#[test]
fn burst_runs_are_reproducible() {
    let data = burst_at_half_second(3.0);
    let mut a = build(&data, 21);
    let mut b = build(&data, 21);
    a.play();
    b.play();
    for _ in 0..330 {
        a.update(FRAME);
        b.update(FRAME);
        assert_eq!(a.particle_count(), b.particle_count());
    }
    assert!(a.particle_count() >= 5 + 15);
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn burst_probability_zero_never_fires() {
    let mut data = burst_at_half_second(0.0);
    data.emission.bursts[0].probability = 0.0;
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 60, FRAME);
    assert_eq!(system.particle_count(), 0);
}

#[test]
fn repeating_bursts_fire_every_interval() {
    let mut data = burst_at_half_second(0.0);
    data.emission.bursts[0] = ParticleEmissionBurst {
        time: 0.0,
        count: MinMaxCurve::Constant(2.0),
        cycle_count: 3,
        repeat_interval: 0.25,
        probability: 1.0,
    };
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 60, FRAME);
    assert_eq!(system.particle_count(), 6);
}

fn sphere_burst(emit_from_shell: bool) -> ParticleSystem {
    let mut data = burst_emitter(10_000.0, 10.0);
    data.main.max_particles = 10_000;
    data.main.start_speed = MinMaxCurve::Constant(0.0);
    data.shape = ShapeModule::new(ParticleSystemShape::Sphere(SphereShape {
        radius: 5.0,
        emit_from_shell,
    }));
    let mut system = build(&data, 17);
    system.play();
    system.update(FRAME);
    system
}

#[test]
fn sphere_volume_emission_stays_inside_radius() {
    let system = sphere_burst(false);
    assert_eq!(system.particle_count(), 10_000);
    assert!(
        system
            .particles()
            .iter()
            .all(|p| p.position.length() <= 5.0 + 1e-3)
    );
}

#[test]
fn sphere_shell_emission_stays_on_surface() {
    let system = sphere_burst(true);
    assert_eq!(system.particle_count(), 10_000);
    assert!(
        system
            .particles()
            .iter()
            .all(|p| (p.position.length() - 5.0).abs() <= 1e-3)
    );
}

#[test]
fn moving_emitters_emit_over_distance() {
    let mut data = rate_emitter(0.0, 100.0);
    data.emission.rate_over_distance = MinMaxCurve::Constant(2.0);
    data.main.simulation_space = SimulationSpace::World;
    let mut system = build(&data, 1);
    system.play();

    for i in 1..=20 {
        let x = i as f32 * 0.5;
        system.set_transform(EmitterTransform::new(Affine3A::from_translation(
            Vec3::new(x, 0.0, 0.0),
        )));
        system.update(FRAME);
    }
    assert!(
        (19..=21).contains(&system.particle_count()),
        "ten units emitted {}",
        system.particle_count()
    );
}

#[test]
fn resting_emitters_do_not_emit_over_distance() {
    let mut data = rate_emitter(0.0, 100.0);
    data.emission.rate_over_distance = MinMaxCurve::Constant(2.0);
    let mut system = build(&data, 1);
    system.play();
    run(&mut system, 60, FRAME);
    assert_eq!(system.particle_count(), 0);
}

fn swept_circle(rate: f32) -> EmitterData {
    let mut data = rate_emitter(rate, 100.0);
    data.shape = ShapeModule::new(ParticleSystemShape::Circle(CircleShape {
        radius: 1.0,
        emit_from_edge: true,
        arc: ArcSettings {
            mode: ArcMode::Loop,
            speed: MinMaxCurve::Constant(0.5),
            ..default()
        },
    }));
    data
}

fn angles_by_birth(system: &ParticleSystem) -> Vec<f32> {
    let mut particles: Vec<&Particle> = system.particles().iter().collect();
    particles.sort_by(|a, b| a.birth_time.total_cmp(&b.birth_time));
    particles
        .iter()
        .map(|p| p.position.y.atan2(p.position.x).to_degrees())
        .collect()
}

#[test]
fn looping_arcs_sweep_between_particles_of_one_frame() {
    let mut system = build(&swept_circle(100.0), 2);
    system.play();

    system.update(0.1);
    let first = angles_by_birth(&system);
    assert_eq!(first.len(), 10);
    assert!(
        first.windows(2).all(|w| w[1] > w[0] + 1.0),
        "angles should advance with birth time: {first:?}"
    );
    assert!(first[9] - first[0] > 10.0);

    system.update(0.1);
    let both = angles_by_birth(&system);
    assert_eq!(both.len(), 20);
    assert!(both.windows(2).all(|w| w[1] > w[0] + 1.0), "{both:?}");
    assert!(both[19] < 40.0);
}

#[test]
fn huge_bursts_respect_max_particles() {
    let mut data = burst_emitter(1e9, 10.0);
    data.main.max_particles = 10;
    data.emission.rate_over_time = MinMaxCurve::Constant(1e9);
    let mut system = build(&data, 5);
    system.play();

    run(&mut system, 3, FRAME);
    assert_eq!(system.particle_count(), 10);
}
