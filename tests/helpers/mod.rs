#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use bevy::asset::{AssetPlugin, AssetServer, LoadState};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_confetti::prelude::*;

pub const FRAME: f32 = 1.0 / 60.0;

pub fn fixtures_path() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("crates")
        .join("bevy_confetti")
        .join("tests")
        .join("fixtures")
        .to_string_lossy()
        .to_string()
}

pub fn create_minimal_app() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        AssetPlugin {
            file_path: fixtures_path(),
            ..default()
        },
        bevy::transform::TransformPlugin,
        ConfettiPlugin,
    ));

    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        FRAME,
    )));

    app
}

pub fn load_fixture(app: &mut App, filename: &str) -> Handle<ParticleSystemAsset> {
    let asset_server = app.world().resource::<AssetServer>();
    asset_server.load(filename.to_string())
}

pub fn run_until_loaded<T: Asset>(app: &mut App, handle: &Handle<T>, max_updates: u32) -> bool {
    for _ in 0..max_updates {
        app.update();

        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(handle) {
            LoadState::Loaded => return true,
            LoadState::Failed(_) => return false,
            _ => std::thread::sleep(Duration::from_millis(1)),
        }
    }
    false
}

pub fn spawn_particle_system(
    app: &mut App,
    handle: Handle<ParticleSystemAsset>,
    seed: u64,
) -> Entity {
    app.world_mut()
        .spawn((
            ParticleSystem3D { handle },
            ParticleSystemRuntime::with_seed(seed),
        ))
        .id()
}

pub fn setup_loaded_system(fixture: &str) -> (App, Handle<ParticleSystemAsset>, Entity) {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, fixture);
    let entity = spawn_particle_system(&mut app, handle.clone(), 7);
    assert!(
        run_until_loaded(&mut app, &handle, 200),
        "fixture should load"
    );
    advance_frames(&mut app, 5);
    (app, handle, entity)
}

pub fn advance_frames(app: &mut App, n: u32) {
    for _ in 0..n {
        app.update();
    }
}

pub fn effect(app: &App, entity: Entity) -> &ParticleEffect {
    app.world()
        .get::<ParticleEffect>(entity)
        .expect("system should have an effect")
}

/// A looping emitter with a constant rate and constant lifetime, at rest.
pub fn rate_emitter(rate: f32, lifetime: f32) -> EmitterData {
    EmitterData {
        main: MainModule {
            start_lifetime: MinMaxCurve::Constant(lifetime),
            start_speed: MinMaxCurve::Constant(0.0),
            ..default()
        },
        emission: EmissionModule {
            rate_over_time: MinMaxCurve::Constant(rate),
            ..default()
        },
        ..default()
    }
}

/// A non-looping emitter that bursts `count` particles at the start of its cycle.
pub fn burst_emitter(count: f32, lifetime: f32) -> EmitterData {
    EmitterData {
        main: MainModule {
            duration: 1.0,
            looping: false,
            start_lifetime: MinMaxCurve::Constant(lifetime),
            ..default()
        },
        emission: EmissionModule {
            rate_over_time: MinMaxCurve::Constant(0.0),
            bursts: vec![ParticleEmissionBurst {
                time: 0.0,
                count: MinMaxCurve::Constant(count),
                ..default()
            }],
            ..default()
        },
        ..default()
    }
}

pub fn build(data: &EmitterData, seed: u64) -> ParticleSystem {
    ParticleSystem::new(data, seed).expect("emitter data should be valid")
}

pub fn run(system: &mut ParticleSystem, frames: u32, dt: f32) {
    for _ in 0..frames {
        system.update(dt);
    }
}

pub fn run_effect(effect: &mut ParticleEffect, frames: u32, dt: f32) {
    for _ in 0..frames {
        effect.update(dt);
    }
}

pub fn with_sub_emitter(mut data: EmitterData, entry: SubEmitterEntry) -> EmitterData {
    data.sub_emitters.enabled = true;
    data.sub_emitters.entries.push(entry);
    data
}

pub fn load_asset(app: &mut App, filename: &str) -> ParticleSystemAsset {
    let handle = load_fixture(app, filename);
    assert!(
        run_until_loaded(app, &handle, 200),
        "fixture should load: {filename}"
    );
    app.world()
        .resource::<Assets<ParticleSystemAsset>>()
        .get(&handle)
        .expect("loaded asset should exist")
        .clone()
}

pub fn emitter_entities(app: &mut App) -> Vec<(Entity, EmitterEntity)> {
    let mut emitters: Vec<(Entity, EmitterEntity)> = app
        .world_mut()
        .query::<(Entity, &EmitterEntity)>()
        .iter(app.world())
        .map(|(entity, emitter)| (entity, *emitter))
        .collect();
    emitters.sort_by_key(|(_, emitter)| emitter.emitter_index);
    emitters
}
