use bevy::prelude::*;
use bevy_confetti::prelude::*;

use super::helpers::*;

fn effect_of(emitters: &[EmitterData]) -> ParticleEffect {
    let mut effect = ParticleEffect::new(emitters, 5).expect("emitters should be valid");
    effect.play();
    effect
}

fn resting(mut data: EmitterData) -> EmitterData {
    data.main.start_speed = MinMaxCurve::Constant(0.0);
    data.shape.enabled = false;
    data
}

#[test]
fn death_children_inherit_parent_color() {
    let mut parent = burst_emitter(3.0, 0.2);
    parent.main.start_color = MinMaxGradient::Color([1.0, 0.0, 0.0, 1.0]);
    let parent = with_sub_emitter(
        parent,
        SubEmitterEntry::new(1, SubEmitterType::Death).with_properties(SubEmitterProperties::COLOR),
    );
    let child = burst_emitter(2.0, 1.0);
    let mut effect = effect_of(&[parent, child]);

    run_effect(&mut effect, 30, FRAME);
    let children = effect.system(1).expect("child system");
    assert_eq!(effect.system(0).map(ParticleSystem::particle_count), Some(0));
    assert_eq!(children.particle_count(), 6);
    for particle in children.particles() {
        assert_eq!(particle.color, LinearRgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(particle.sub_emit_depth(), 1);
    }
}

#[test]
fn children_without_inherited_color_keep_their_own() {
    let mut parent = burst_emitter(1.0, 0.2);
    parent.main.start_color = MinMaxGradient::Color([1.0, 0.0, 0.0, 1.0]);
    let parent = with_sub_emitter(parent, SubEmitterEntry::new(1, SubEmitterType::Death));
    let mut effect = effect_of(&[parent, burst_emitter(2.0, 1.0)]);

    run_effect(&mut effect, 30, FRAME);
    let children = effect.system(1).expect("child system");
    assert_eq!(children.particle_count(), 2);
    assert!(
        children
            .particles()
            .iter()
            .all(|p| p.color == LinearRgba::WHITE)
    );
}

#[test]
fn collision_children_spawn_once_on_hide() {
    let mut parent = resting(burst_emitter(1.0, 10.0));
    parent.main.gravity_modifier = MinMaxCurve::Constant(1.0);
    parent.collision = CollisionModule {
        enabled: true,
        colliders: vec![Collider {
            shape: ColliderShape::Plane { normal: Vec3::Y },
            position: Vec3::new(0.0, -0.5, 0.0),
        }],
        mode: CollisionMode::HideOnContact,
        ..default()
    };
    let parent = with_sub_emitter(parent, SubEmitterEntry::new(1, SubEmitterType::Collision));
    let mut effect = effect_of(&[parent, resting(burst_emitter(2.0, 10.0))]);

    run_effect(&mut effect, 60, FRAME);
    assert_eq!(effect.system(0).map(ParticleSystem::particle_count), Some(0));
    let children = effect.system(1).expect("child system");
    assert_eq!(children.particle_count(), 2);
    assert!(children.particles().iter().all(|p| p.position.y < -0.4));
}

#[test]
fn manual_trigger_fires_for_selected_particles() {
    let parent = with_sub_emitter(
        resting(burst_emitter(3.0, 10.0)),
        SubEmitterEntry::new(1, SubEmitterType::Manual),
    );
    let mut effect = effect_of(&[parent, resting(burst_emitter(1.0, 10.0))]);
    run_effect(&mut effect, 2, FRAME);
    assert_eq!(effect.system(0).map(ParticleSystem::particle_count), Some(3));
    assert_eq!(effect.system(1).map(ParticleSystem::particle_count), Some(0));

    effect.trigger_sub_emitter(0, 0, Some(&[0, 2]));
    run_effect(&mut effect, 1, FRAME);
    assert_eq!(effect.system(1).map(ParticleSystem::particle_count), Some(2));

    effect.trigger_sub_emitter(0, 0, None);
    run_effect(&mut effect, 1, FRAME);
    assert_eq!(effect.system(1).map(ParticleSystem::particle_count), Some(5));
}

#[test]
fn out_of_range_triggers_are_ignored() {
    let parent = with_sub_emitter(
        resting(burst_emitter(3.0, 10.0)),
        SubEmitterEntry::new(1, SubEmitterType::Manual),
    );
    let mut effect = effect_of(&[parent, resting(burst_emitter(1.0, 10.0))]);
    run_effect(&mut effect, 2, FRAME);

    effect.trigger_sub_emitter(0, 4, None);
    effect.trigger_sub_emitter(0, 0, Some(&[17]));
    effect.trigger_sub_emitter(9, 0, None);
    run_effect(&mut effect, 1, FRAME);
    assert_eq!(effect.system(1).map(ParticleSystem::particle_count), Some(0));
}

#[test]
fn sub_emission_depth_is_capped() {
    let parent = with_sub_emitter(
        burst_emitter(1.0, 0.1),
        SubEmitterEntry::new(1, SubEmitterType::Death),
    );
    let mut chain = with_sub_emitter(
        burst_emitter(1.0, 0.1),
        SubEmitterEntry::new(1, SubEmitterType::Death),
    );
    chain.sub_emitters.max_depth = 2;
    let mut effect = effect_of(&[parent, chain]);

    let mut deepest = 0;
    let mut spawned_any = false;
    for _ in 0..300 {
        effect.update(FRAME);
        for particle in effect.system(1).expect("chain system").particles() {
            spawned_any = true;
            deepest = deepest.max(particle.sub_emit_depth());
        }
    }
    assert!(spawned_any);
    assert_eq!(deepest, 2);
    assert!(effect.is_completed());
}

#[test]
fn disabled_children_still_receive_sub_emissions() {
    let parent = with_sub_emitter(
        burst_emitter(2.0, 0.2),
        SubEmitterEntry::new(1, SubEmitterType::Death),
    );
    let mut child = burst_emitter(3.0, 1.0);
    child.enabled = false;
    let mut effect = effect_of(&[parent, child]);

    assert!(effect.system(1).is_some_and(ParticleSystem::is_stopped));
    run_effect(&mut effect, 30, FRAME);
    assert_eq!(effect.system(1).map(ParticleSystem::particle_count), Some(6));
}

#[test]
fn effect_completes_once_children_die() {
    let parent = with_sub_emitter(
        burst_emitter(2.0, 0.2),
        SubEmitterEntry::new(1, SubEmitterType::Death),
    );
    let mut effect = effect_of(&[parent, burst_emitter(3.0, 0.5)]);

    run_effect(&mut effect, 30, FRAME);
    assert!(!effect.is_completed());
    assert!(effect.particle_count() > 0);

    run_effect(&mut effect, 240, FRAME);
    assert!(effect.is_completed());
    assert_eq!(effect.particle_count(), 0);

    let events = effect.drain_events();
    assert!(events.contains(&(0, ParticleSystemEvent::Completed)));
    assert!(events.iter().all(|(system, _)| *system == 0));
}

#[test]
fn invalid_sub_emitter_targets_are_rejected() {
    let parent = with_sub_emitter(
        burst_emitter(1.0, 1.0),
        SubEmitterEntry::new(3, SubEmitterType::Death),
    );
    assert!(matches!(
        ParticleEffect::new(&[parent], 0),
        Err(ParticleSystemError::SubEmitterTargetOutOfRange { target: 3, .. })
    ));
}
