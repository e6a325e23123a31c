#![deny(missing_docs)]
//! **Confetti** is a CPU particle simulation for the
//! [Bevy game engine](https://bevyengine.org/), built from composable emitter modules.
//!
//! # Getting started
//!
//! ## Add the dependency
//!
//! First, add `bevy_confetti` to the dependencies in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bevy_confetti = "0.1"
//! ```
//!
//! ## Add the plugin
//!
//! Add [`ConfettiPlugin`] to your Bevy app:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_confetti::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, ConfettiPlugin))
//!         // ...your other plugins, systems and resources
//!         .run();
//! }
//! ```
//!
//! ## Spawning a particle system
//!
//! An effect is defined by a [`ParticleSystemAsset`] containing one or more
//! [`EmitterData`] entries. Spawn a [`ParticleSystem3D`] component to play it.
//!
//! ### Loading from a file
//!
//! Effects can be loaded from RON asset files:
//!
//! ```
//! use bevy::prelude::*;
//! use bevy_confetti::prelude::*;
//!
//! fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(ParticleSystem3D {
//!         handle: asset_server.load("sparks.ron"),
//!     });
//! }
//! ```
//!
//! ### Building in code
//!
//! ```
//! use bevy::prelude::*;
//! use bevy_confetti::prelude::*;
//!
//! fn setup(mut commands: Commands, mut assets: ResMut<Assets<ParticleSystemAsset>>) {
//!     let handle = assets.add(ParticleSystemAsset::new(
//!         "Sparks".into(),
//!         vec![EmitterData {
//!             main: MainModule {
//!                 start_speed: MinMaxCurve::between(1.0, 5.0),
//!                 max_particles: 64,
//!                 ..default()
//!             },
//!             emission: EmissionModule {
//!                 rate_over_time: MinMaxCurve::constant(20.0),
//!                 ..default()
//!             },
//!             ..default()
//!         }],
//!     ));
//!
//!     commands.spawn(ParticleSystem3D { handle });
//! }
//! ```
//!
//! ### Driving a system directly
//!
//! [`ParticleSystem`] does not need an [`App`]. Feed it frame intervals and read the
//! particles back:
//!
//! ```
//! use bevy_confetti::prelude::*;
//!
//! let mut system = ParticleSystem::new(&EmitterData::default(), 7)?;
//! system.play();
//! for _ in 0..60 {
//!     system.update(1.0 / 60.0);
//! }
//! for particle in system.particles() {
//!     let _ = (particle.position, particle.color, particle.size);
//! }
//! # Ok::<(), ParticleSystemError>(())
//! ```
//!
//! # Table of contents
//!
//! ## Particle systems
//!
//! - [Emitter simulation](ParticleSystem): playback, emission and the particle pool
//! - [Effects](ParticleEffect): the systems of one asset with sub-emissions routed between them
//! - [Playback control](ParticleSystemRuntime) for spawned entities
//! - [Renderer snapshots](render::ParticleInstances) rebuilt every frame per emitter
//!
//! ## Modules
//!
//! Each [emitter](EmitterData) is a fixed set of [modules](modules), run in order every
//! frame. Modules contribute to particle velocity, acceleration, angular velocity, size
//! and color under their own name, see [`particle::ContributionName`].
//!
//! - [Main](modules::MainModule): duration, looping and start values
//! - [Emission](modules::EmissionModule): rate over time, rate over distance and bursts
//! - [Shape](modules::ShapeModule): where particles spawn, see [`shapes`]
//! - [Noise](modules::NoiseModule): gradient noise turbulence
//! - [Collision](modules::CollisionModule): planes, spheres and boxes
//! - [Sub-emitters](modules::SubEmittersModule): secondary emissions on birth, death,
//!   collision or on demand
//!
//! ## Assets
//!
//! Curves and gradients with random ranges back every animated property, see the
//! [`asset`] module.

/// Particle system asset definitions, emitter data, curves and gradients.
pub mod asset;
mod effect;
/// Emission timing of a single duration sequence.
pub mod emit_info;
mod error;
pub mod modules;
/// Per-particle state and named contributions.
pub mod particle;
/// Convenience re-exports for common particle system types.
pub mod prelude;
/// Seeded random source shared by a particle system.
pub mod random;
/// Renderer-facing particle snapshots.
pub mod render;
/// Components and messages for particle systems spawned in a Bevy app.
pub mod runtime;
/// Emission shapes.
pub mod shapes;
/// Simulation spaces and emitter transforms.
pub mod space;
mod spawning;
mod system;

use bevy::prelude::*;

use asset::{ParticleSystemAsset, ParticleSystemAssetLoader};
use runtime::{ParticleSystemCompleted, ParticleSystemCycled};
use spawning::{
    cleanup_particle_entities, reload_particle_systems, setup_particle_systems,
    sync_particle_instances, update_particle_systems,
};

/// Plugin that adds CPU particle system support to a Bevy app.
///
/// Registers the asset loader, the lifecycle messages, and the systems that build,
/// advance and snapshot every [`ParticleSystem3D`].
pub struct ConfettiPlugin;

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<ParticleSystemAsset>()
            .init_asset_loader::<ParticleSystemAssetLoader>();

        app.add_message::<ParticleSystemCycled>()
            .add_message::<ParticleSystemCompleted>();

        app.add_systems(
            Update,
            (
                reload_particle_systems,
                cleanup_particle_entities,
                setup_particle_systems,
                update_particle_systems,
                sync_particle_instances,
            )
                .chain(),
        );
    }
}

pub use asset::EmitterData;
pub use effect::ParticleEffect;
pub use error::ParticleSystemError;
pub use runtime::{EmitterEntity, ParticleSystem3D, ParticleSystemRuntime};
pub use system::{PREWARM_STEP, ParticleSystem, ParticleSystemEvent, PlaybackState};
