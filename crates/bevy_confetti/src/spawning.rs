use bevy::prelude::*;

use crate::{
    asset::ParticleSystemAsset,
    effect::ParticleEffect,
    render::ParticleInstances,
    runtime::{
        EmitterEntity, ParticleSystem3D, ParticleSystemCompleted, ParticleSystemCycled,
        ParticleSystemRuntime,
    },
    system::ParticleSystemEvent,
};

const MAX_FRAME_DELTA: f32 = 0.1;

/// Marks a particle system whose asset could not be turned into an effect.
#[derive(Component)]
pub struct InvalidParticleSystem;

pub fn setup_particle_systems(
    mut commands: Commands,
    query: Query<
        (Entity, &ParticleSystem3D, Option<&ParticleSystemRuntime>),
        (Without<ParticleEffect>, Without<InvalidParticleSystem>),
    >,
    assets: Res<Assets<ParticleSystemAsset>>,
) {
    for (system_entity, particle_system, runtime) in query.iter() {
        let Some(asset) = assets.get(&particle_system.handle) else {
            continue;
        };

        if asset.emitters.is_empty() {
            continue;
        }

        let runtime = runtime.cloned().unwrap_or_default();
        let mut effect = match ParticleEffect::new(&asset.emitters, runtime.global_seed) {
            Ok(effect) => effect,
            Err(err) => {
                error!(
                    "{system_entity}: could not build particle effect \"{}\": {err}",
                    asset.name
                );
                commands
                    .entity(system_entity)
                    .insert((runtime, InvalidParticleSystem));
                continue;
            }
        };
        effect.play();
        debug!(
            "{system_entity}: playing \"{}\" with {} emitters",
            asset.name,
            asset.emitters.len()
        );

        commands.entity(system_entity).insert((effect, runtime));

        for (emitter_index, emitter) in asset.emitters.iter().enumerate() {
            let emitter_entity = commands
                .spawn((
                    EmitterEntity {
                        parent_system: system_entity,
                        emitter_index,
                    },
                    ParticleInstances::default(),
                    Transform::from_translation(emitter.position),
                    Visibility::default(),
                    Name::new(emitter.name.clone()),
                ))
                .id();

            commands.entity(system_entity).add_child(emitter_entity);
        }
    }
}

pub fn update_particle_systems(
    time: Res<Time>,
    mut query: Query<(
        Entity,
        &mut ParticleEffect,
        &ParticleSystemRuntime,
        &GlobalTransform,
    )>,
    mut cycled: MessageWriter<ParticleSystemCycled>,
    mut completed: MessageWriter<ParticleSystemCompleted>,
) {
    let delta = time.delta_secs().min(MAX_FRAME_DELTA);

    for (entity, mut effect, runtime, transform) in query.iter_mut() {
        if runtime.paused {
            continue;
        }

        effect.set_transform(transform.affine());
        effect.update(delta);

        for (emitter_index, event) in effect.drain_events() {
            match event {
                ParticleSystemEvent::Cycled { cycle } => {
                    cycled.write(ParticleSystemCycled {
                        entity,
                        emitter_index,
                        cycle,
                    });
                }
                ParticleSystemEvent::Completed => {
                    completed.write(ParticleSystemCompleted {
                        entity,
                        emitter_index,
                    });
                }
            }
        }
    }
}

pub fn sync_particle_instances(
    effects: Query<&ParticleEffect>,
    mut emitter_query: Query<(&EmitterEntity, &mut ParticleInstances)>,
) {
    for (emitter, mut instances) in emitter_query.iter_mut() {
        let Ok(effect) = effects.get(emitter.parent_system) else {
            continue;
        };
        if let Some(system) = effect.system(emitter.emitter_index) {
            instances.rebuild(system);
        }
    }
}

pub fn reload_particle_systems(
    mut commands: Commands,
    mut asset_events: MessageReader<AssetEvent<ParticleSystemAsset>>,
    systems: Query<(Entity, &ParticleSystem3D)>,
    emitters: Query<(Entity, &EmitterEntity)>,
) {
    for event in asset_events.read() {
        let AssetEvent::Modified { id } = event else {
            continue;
        };
        for (system_entity, particle_system) in systems.iter() {
            if particle_system.handle.id() != *id {
                continue;
            }
            for (emitter_entity, emitter) in emitters.iter() {
                if emitter.parent_system == system_entity {
                    commands.entity(emitter_entity).despawn();
                }
            }
            // the runtime stays so the rebuilt effect keeps its seed and pause state
            commands
                .entity(system_entity)
                .remove::<(ParticleEffect, InvalidParticleSystem)>();
        }
    }
}

pub fn cleanup_particle_entities(
    mut commands: Commands,
    mut removed_systems: RemovedComponents<ParticleSystem3D>,
    emitter_entities: Query<(Entity, &EmitterEntity)>,
) {
    for removed_system in removed_systems.read() {
        for (emitter_entity, emitter) in emitter_entities.iter() {
            if emitter.parent_system == removed_system {
                commands.entity(emitter_entity).despawn();
            }
        }
        if let Ok(mut entity) = commands.get_entity(removed_system) {
            entity.try_remove::<(ParticleEffect, ParticleSystemRuntime, InvalidParticleSystem)>();
        }
    }
}
