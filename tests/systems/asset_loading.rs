use super::helpers::*;

use bevy::prelude::*;
use bevy_confetti::prelude::*;

#[test]
fn load_minimal_particle_system() {
    let mut app = create_minimal_app();
    let asset = load_asset(&mut app, "minimal.ron");

    assert_eq!(asset.name, "Minimal");
    assert_eq!(asset.emitters.len(), 1);

    let emitter = &asset.emitters[0];
    assert_eq!(emitter.name, "Emitter");
    assert!(emitter.enabled);
    assert_eq!(emitter.main.duration, 1.0);
    assert_eq!(emitter.main.max_particles, 64);
    assert_eq!(emitter.emission.rate_over_time, MinMaxCurve::Constant(20.0));
    assert_eq!(emitter.shape, ShapeModule::default());
}

#[test]
fn load_firework_with_sub_emitter() {
    let mut app = create_minimal_app();
    let asset = load_asset(&mut app, "firework.ron");

    assert_eq!(asset.emitters.len(), 2);
    let rocket = &asset.emitters[0];
    assert!(!rocket.main.looping);
    assert_eq!(rocket.main.simulation_space, SimulationSpace::World);
    assert_eq!(rocket.emission.bursts.len(), 1);

    let entry = &rocket.sub_emitters.entries[0];
    assert_eq!(entry.emitter, 1);
    assert_eq!(entry.kind, SubEmitterType::Death);
    assert_eq!(entry.properties, SubEmitterProperties::COLOR);

    let sparks = &asset.emitters[1];
    match &sparks.shape.shape {
        ParticleSystemShape::Sphere(sphere) => assert_eq!(sphere.radius, 0.2),
        other => panic!("expected Sphere, found {other:?}"),
    }
    assert!(sparks.color_over_lifetime.enabled);
    assert_eq!(sparks.main.start_lifetime, MinMaxCurve::between(0.4, 0.8));
}

#[test]
fn failed_loads_never_spawn_effects() {
    for fixture in ["unknown_version.ron", "invalid_syntax.ron"] {
        let mut app = create_minimal_app();
        let handle = load_fixture(&mut app, fixture);
        let entity = spawn_particle_system(&mut app, handle.clone(), 1);

        assert!(
            !run_until_loaded(&mut app, &handle, 200),
            "{fixture} should fail to load"
        );
        advance_frames(&mut app, 3);
        assert!(app.world().get::<ParticleEffect>(entity).is_none());
        assert!(emitter_entities(&mut app).is_empty());
    }
}

#[test]
fn modified_assets_rebuild_the_effect() {
    let (mut app, handle, entity) = setup_loaded_system("minimal.ron");
    let before: Vec<Entity> = emitter_entities(&mut app)
        .into_iter()
        .map(|(e, _)| e)
        .collect();
    assert_eq!(before.len(), 1);

    {
        let mut assets = app.world_mut().resource_mut::<Assets<ParticleSystemAsset>>();
        let asset = assets.get_mut(&handle).expect("asset should exist");
        let mut second = asset.emitters[0].clone();
        second.name = "Second".to_string();
        asset.emitters.push(second);
    }
    advance_frames(&mut app, 3);

    let after = emitter_entities(&mut app);
    assert_eq!(after.len(), 2);
    assert!(after.iter().all(|(e, _)| !before.contains(e)));
    assert_eq!(effect(&app, entity).systems().len(), 2);

    let runtime = app
        .world()
        .get::<ParticleSystemRuntime>(entity)
        .expect("runtime should survive reload");
    assert_eq!(runtime.global_seed, 7);
}
