use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy_confetti::prelude::*;
use bevy_confetti::prelude::AnimationCurve;
use bevy_confetti::space::EmitterTransform;

use super::helpers::*;

#[test]
fn size_over_lifetime_stays_within_curve_bounds() {
    let mut data = rate_emitter(30.0, 1.0);
    data.size_over_lifetime = SizeOverLifetimeModule {
        enabled: true,
        size: MinMaxCurve::curve(AnimationCurve::linear(0.0, 2.0)),
        ..default()
    };
    let mut system = build(&data, 3);
    system.play();

    let mut largest = 0.0_f32;
    for _ in 0..180 {
        system.update(FRAME);
        for particle in system.particles() {
            assert!(particle.size.min_element() >= 0.0);
            assert!(particle.size.max_element() <= 2.0 + 1e-4);
            let expected = 2.0 * particle.rate_at_life_time;
            assert!((particle.size.x - expected).abs() < 1e-3);
            largest = largest.max(particle.size.x);
        }
    }
    assert!(largest > 1.5);
}

#[test]
fn color_over_lifetime_fades_alpha() {
    let mut data = rate_emitter(30.0, 1.0);
    data.color_over_lifetime = ColorOverLifetimeModule {
        enabled: true,
        color: MinMaxGradient::Gradient(Gradient::linear(
            [1.0, 1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0, 0.0],
        )),
    };
    let mut system = build(&data, 3);
    system.play();
    run(&mut system, 90, FRAME);

    assert!(system.particle_count() > 0);
    for particle in system.particles() {
        let expected = 1.0 - particle.rate_at_life_time;
        assert!((particle.color.alpha - expected).abs() < 1e-3);
    }
}

#[test]
fn disabled_modules_leave_visuals_at_start_values() {
    let mut system = build(&rate_emitter(30.0, 1.0), 3);
    system.play();
    run(&mut system, 45, FRAME);
    for particle in system.particles() {
        assert_eq!(particle.size, particle.start_size);
        assert_eq!(particle.color, particle.start_color);
        assert!(particle.contributions().size.is_empty());
    }
}

fn single_resting_particle() -> ParticleSystem {
    let mut data = burst_emitter(1.0, 10.0);
    data.main.start_speed = MinMaxCurve::Constant(0.0);
    let mut system = build(&data, 1);
    system.play();
    system.update(FRAME);
    assert_eq!(system.particle_count(), 1);
    system
}

#[test]
fn external_acceleration_integrates_until_removed() {
    let mut system = single_resting_particle();
    let thrust = ContributionName::Custom(1);
    assert!(system.add_particle_acceleration(0, thrust, Vec3::Y * 2.0, SimulationSpace::Local));

    run(&mut system, 30, FRAME);
    let velocity = system.particles()[0].velocity;
    assert!((velocity.y - 1.0).abs() < 1e-3, "velocity {velocity}");

    assert_eq!(
        system.remove_particle_acceleration(0, thrust),
        Some(Vec3::Y * 2.0)
    );
    assert_eq!(system.remove_particle_acceleration(0, thrust), None);
    run(&mut system, 30, FRAME);
    assert!((system.particles()[0].velocity.y - velocity.y).abs() < 1e-6);
}

#[test]
fn out_of_range_contributions_are_rejected() {
    let mut system = single_resting_particle();
    let name = ContributionName::Custom(1);
    assert!(!system.add_particle_acceleration(3, name, Vec3::Y, SimulationSpace::Local));
    assert_eq!(system.remove_particle_velocity(3, name), None);
}

#[test]
fn world_space_contributions_are_converted_from_local() {
    let mut data = burst_emitter(1.0, 10.0);
    data.main.start_speed = MinMaxCurve::Constant(0.0);
    data.main.simulation_space = SimulationSpace::World;
    let mut system = build(&data, 1);
    system.set_transform(EmitterTransform::new(Affine3A::from_rotation_z(
        std::f32::consts::FRAC_PI_2,
    )));
    system.play();
    system.update(FRAME);

    let wind = ContributionName::Custom(2);
    assert!(system.add_particle_velocity(0, wind, Vec3::X, SimulationSpace::Local));
    let stored = system.particles()[0]
        .contributions()
        .velocity
        .get(wind)
        .expect("contribution should be stored");
    assert!((stored - Vec3::Y).length() < 1e-5, "stored {stored}");
    assert!((system.particles()[0].total_velocity() - Vec3::Y).length() < 1e-5);
}

#[test]
fn initial_inherit_velocity_follows_emitter_motion() {
    let mut data = burst_emitter(4.0, 10.0);
    data.emission.bursts[0].time = 0.5;
    data.main.start_speed = MinMaxCurve::Constant(0.0);
    data.main.simulation_space = SimulationSpace::World;
    data.inherit_velocity = InheritVelocityModule {
        enabled: true,
        mode: InheritVelocityMode::Initial,
        multiplier: MinMaxCurve::Constant(1.0),
    };
    let mut system = build(&data, 1);
    system.play();

    for i in 1..=40 {
        let x = i as f32 * FRAME;
        system.set_transform(EmitterTransform::new(Affine3A::from_translation(
            Vec3::new(x, 0.0, 0.0),
        )));
        system.update(FRAME);
    }
    assert_eq!(system.particle_count(), 4);
    for particle in system.particles() {
        assert!((particle.velocity.x - 1.0).abs() < 1e-2, "velocity {}", particle.velocity);
    }
}

#[test]
fn local_space_ignores_inherit_velocity() {
    let mut data = burst_emitter(4.0, 10.0);
    data.emission.bursts[0].time = 0.5;
    data.main.start_speed = MinMaxCurve::Constant(0.0);
    data.inherit_velocity = InheritVelocityModule {
        enabled: true,
        mode: InheritVelocityMode::Initial,
        multiplier: MinMaxCurve::Constant(1.0),
    };
    let mut system = build(&data, 1);
    system.play();

    for i in 1..=40 {
        let x = i as f32 * FRAME;
        system.set_transform(EmitterTransform::new(Affine3A::from_translation(
            Vec3::new(x, 0.0, 0.0),
        )));
        system.update(FRAME);
    }
    assert!(system.particles().iter().all(|p| p.velocity == Vec3::ZERO));
}
