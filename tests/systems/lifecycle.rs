use super::helpers::*;

use bevy::prelude::*;
use bevy_confetti::prelude::*;

#[derive(Resource, Default)]
struct Collected {
    cycled: Vec<ParticleSystemCycled>,
    completed: Vec<ParticleSystemCompleted>,
}

fn collect_messages(
    mut collected: ResMut<Collected>,
    mut cycled: MessageReader<ParticleSystemCycled>,
    mut completed: MessageReader<ParticleSystemCompleted>,
) {
    collected.cycled.extend(cycled.read().copied());
    collected.completed.extend(completed.read().copied());
}

fn collecting_app(fixture: &str) -> (App, Entity) {
    let mut app = create_minimal_app();
    app.init_resource::<Collected>()
        .add_systems(PostUpdate, collect_messages);
    let handle = load_fixture(&mut app, fixture);
    let entity = spawn_particle_system(&mut app, handle.clone(), 3);
    assert!(run_until_loaded(&mut app, &handle, 200), "fixture should load");
    (app, entity)
}

#[test]
fn system_time_advances_each_frame() {
    let (app, _, system_entity) = setup_loaded_system("minimal.ron");

    let system = effect(&app, system_entity)
        .system(0)
        .expect("should have one system");
    assert!(system.time() > 0.0, "system time should have advanced");
    assert!(system.is_playing());
}

#[test]
fn looping_systems_send_cycle_messages() {
    let (mut app, entity) = collecting_app("minimal.ron");
    advance_frames(&mut app, 150);

    let collected = app.world().resource::<Collected>();
    let cycles: Vec<u32> = collected.cycled.iter().map(|m| m.cycle).collect();
    assert!(cycles.len() >= 2, "cycles {cycles:?}");
    assert_eq!(&cycles[..2], &[0, 1]);
    assert!(
        collected
            .cycled
            .iter()
            .all(|m| m.entity == entity && m.emitter_index == 0)
    );
    assert!(collected.completed.is_empty());
}

#[test]
fn non_looping_systems_send_one_completed_message() {
    let (mut app, entity) = collecting_app("firework.ron");
    advance_frames(&mut app, 240);

    let collected = app.world().resource::<Collected>();
    assert_eq!(
        collected.completed,
        vec![ParticleSystemCompleted {
            entity,
            emitter_index: 0,
        }]
    );
    assert!(effect(&app, entity).is_completed());
}

#[test]
fn paused_runtime_freezes_every_emitter() {
    let (mut app, _, system_entity) = setup_loaded_system("minimal.ron");
    advance_frames(&mut app, 10);

    app.world_mut()
        .get_mut::<ParticleSystemRuntime>(system_entity)
        .expect("runtime should exist")
        .pause();
    let time = effect(&app, system_entity).system(0).map(ParticleSystem::time);
    let count = effect(&app, system_entity).particle_count();
    advance_frames(&mut app, 30);
    assert_eq!(
        effect(&app, system_entity).system(0).map(ParticleSystem::time),
        time
    );
    assert_eq!(effect(&app, system_entity).particle_count(), count);

    app.world_mut()
        .get_mut::<ParticleSystemRuntime>(system_entity)
        .expect("runtime should exist")
        .toggle();
    advance_frames(&mut app, 5);
    assert!(effect(&app, system_entity).system(0).map(ParticleSystem::time) > time);
}

#[test]
fn cleanup_removes_emitters_when_system_despawned() {
    let (mut app, _, system_entity) = setup_loaded_system("minimal.ron");
    assert_eq!(emitter_entities(&mut app).len(), 1, "should have 1 emitter before cleanup");

    app.world_mut()
        .entity_mut(system_entity)
        .remove::<ParticleSystem3D>();
    advance_frames(&mut app, 5);

    assert!(emitter_entities(&mut app).is_empty(), "emitters should be cleaned up");
    assert!(app.world().get::<ParticleEffect>(system_entity).is_none());
    assert!(app.world().get::<ParticleSystemRuntime>(system_entity).is_none());
}
