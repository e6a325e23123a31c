use super::helpers::*;

use bevy::prelude::*;
use bevy_confetti::prelude::*;

#[test]
fn particle_system_3d_spawns_emitter_entities() {
    let (mut app, _, system_entity) = setup_loaded_system("firework.ron");

    let emitters = emitter_entities(&mut app);
    assert_eq!(emitters.len(), 2, "should spawn 2 emitters");
    for (index, (entity, emitter)) in emitters.iter().enumerate() {
        assert_eq!(emitter.emitter_index, index);
        assert_eq!(
            emitter.parent_system, system_entity,
            "emitter should reference the parent system"
        );
        assert_eq!(
            app.world().get::<ChildOf>(*entity).map(ChildOf::parent),
            Some(system_entity)
        );
    }

    let names: Vec<&str> = emitters
        .iter()
        .filter_map(|(entity, _)| app.world().get::<Name>(*entity))
        .map(Name::as_str)
        .collect();
    assert_eq!(names, vec!["Rocket", "Sparks"]);
}

#[test]
fn particle_system_gets_runtime_component() {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, "minimal.ron");
    let system_entity = app
        .world_mut()
        .spawn(ParticleSystem3D {
            handle: handle.clone(),
        })
        .id();
    assert!(run_until_loaded(&mut app, &handle, 200), "fixture should load");
    advance_frames(&mut app, 2);

    let runtime = app
        .world()
        .get::<ParticleSystemRuntime>(system_entity)
        .expect("system should have runtime component");
    assert!(!runtime.paused);
    assert!(app.world().get::<ParticleEffect>(system_entity).is_some());
}

#[test]
fn emitter_instances_mirror_particles() {
    let (mut app, _, system_entity) = setup_loaded_system("minimal.ron");
    advance_frames(&mut app, 30);

    let (emitter_entity, _) = emitter_entities(&mut app)[0];
    let instances = app
        .world()
        .get::<ParticleInstances>(emitter_entity)
        .expect("emitter should have instances");
    let system = effect(&app, system_entity)
        .system(0)
        .expect("should have one system");
    assert!(system.particle_count() > 0);
    assert_eq!(instances.0.len(), system.particle_count());
    assert_eq!(
        instances.as_bytes().len(),
        instances.0.len() * std::mem::size_of::<ParticleInstance>()
    );
}

#[test]
fn systems_follow_their_entity_transform() {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, "minimal.ron");
    let system_entity = app
        .world_mut()
        .spawn((
            ParticleSystem3D {
                handle: handle.clone(),
            },
            ParticleSystemRuntime::with_seed(1),
            Transform::from_xyz(5.0, 0.0, 0.0),
        ))
        .id();
    assert!(run_until_loaded(&mut app, &handle, 200), "fixture should load");
    advance_frames(&mut app, 5);

    let translation = effect(&app, system_entity)
        .system(0)
        .map(|s| s.transform().translation())
        .expect("should have one system");
    assert!((translation - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
}

#[test]
fn invalid_effects_are_not_spawned() {
    let (mut app, _, system_entity) = setup_loaded_system("bad_sub_emitter.ron");
    advance_frames(&mut app, 5);

    assert!(app.world().get::<ParticleEffect>(system_entity).is_none());
    assert!(emitter_entities(&mut app).is_empty());
    assert!(app.world().get::<ParticleSystemRuntime>(system_entity).is_some());
}
