mod curve;
pub(crate) mod gradient;
pub(crate) mod serde_helpers;
/// Asset format version tracking and compatibility validation.
pub mod versioning;

pub use curve::{AnimationCurve, CurveEasing, CurveKey, MinMaxCurve, MinMaxCurveVector3};
pub use gradient::{Gradient, GradientInterpolation, GradientStop, MinMaxGradient, color_from_array};

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::{
    CollisionModule, ColorBySpeedModule, ColorOverLifetimeModule, EmissionModule,
    ForceOverLifetimeModule, InheritVelocityModule, LimitVelocityOverLifetimeModule, MainModule,
    NoiseModule, RotationBySpeedModule, RotationOverLifetimeModule, ShapeModule,
    SizeBySpeedModule, SizeOverLifetimeModule, SubEmittersModule, TextureSheetAnimationModule,
    VelocityOverLifetimeModule,
};
use serde_helpers::*;
use versioning::{VersionStatus, current_format_version};

/// Asset loader for [`ParticleSystemAsset`] files in RON format.
#[derive(Default, TypePath)]
pub struct ParticleSystemAssetLoader;

/// Errors that can occur when loading a [`ParticleSystemAsset`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParticleSystemAssetLoaderError {
    /// An I/O error occurred while reading the asset file.
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    /// The asset file contained invalid RON syntax.
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The asset file has an unknown format version, likely from a newer Confetti.
    #[error(
        "Unknown confetti_version \"{found}\", expected \"{current}\". You may need a newer version of Confetti."
    )]
    UnknownVersion {
        /// The version found in the asset file.
        found: String,
        /// The current format version.
        current: &'static str,
    },
}

impl AssetLoader for ParticleSystemAssetLoader {
    type Asset = ParticleSystemAsset;
    type Settings = ();
    type Error = ParticleSystemAssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let asset = ParticleSystemAsset::from_bytes(&bytes)?;

        if let VersionStatus::Unknown { found } = asset.version_status() {
            let path = load_context.path();
            warn!("{path:?}: unsupported confetti_version \"{found}\"");
            return Err(ParticleSystemAssetLoaderError::UnknownVersion {
                found,
                current: current_format_version(),
            });
        }

        Ok(asset)
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

/// Complete configuration for a single particle emitter.
///
/// Every module listed here runs in a fixed order each frame, see
/// [`ParticleModules`](crate::modules::ParticleModules). Modules other than
/// [`MainModule`], [`EmissionModule`] and [`ShapeModule`] are disabled by default.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
pub struct EmitterData {
    /// Display name for this emitter.
    pub name: String,
    /// Whether this emitter is active. Disabled emitters are never played by their
    /// effect, but can still receive sub-emissions.
    ///
    /// Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,

    /// Position offset of this emitter relative to the effect entity.
    ///
    /// Defaults to [`Vec3::ZERO`].
    #[serde(default, skip_serializing_if = "is_zero_vec3")]
    pub position: Vec3,

    /// Seed used instead of the effect seed, for reproducible playback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_seed: Option<u64>,

    /// Duration, looping, start values and simulation space.
    #[serde(default)]
    pub main: MainModule,
    /// Rate over time, rate over distance and bursts.
    #[serde(default)]
    pub emission: EmissionModule,
    /// Where particles spawn and which direction they leave in.
    #[serde(default)]
    pub shape: ShapeModule,

    /// Velocity curves added on top of the start velocity.
    #[serde(default)]
    pub velocity_over_lifetime: VelocityOverLifetimeModule,
    /// Speed limit and drag.
    #[serde(default)]
    pub limit_velocity_over_lifetime: LimitVelocityOverLifetimeModule,
    /// Share of the emitter velocity passed on to particles.
    #[serde(default)]
    pub inherit_velocity: InheritVelocityModule,
    /// Acceleration curves.
    #[serde(default)]
    pub force_over_lifetime: ForceOverLifetimeModule,
    /// Color multiplier over lifetime.
    #[serde(default)]
    pub color_over_lifetime: ColorOverLifetimeModule,
    /// Color multiplier driven by speed.
    #[serde(default)]
    pub color_by_speed: ColorBySpeedModule,
    /// Size multiplier over lifetime.
    #[serde(default)]
    pub size_over_lifetime: SizeOverLifetimeModule,
    /// Size multiplier driven by speed.
    #[serde(default)]
    pub size_by_speed: SizeBySpeedModule,
    /// Angular velocity over lifetime.
    #[serde(default)]
    pub rotation_over_lifetime: RotationOverLifetimeModule,
    /// Angular velocity driven by speed.
    #[serde(default)]
    pub rotation_by_speed: RotationBySpeedModule,
    /// Turbulence applied to velocity, rotation and size.
    #[serde(default)]
    pub noise: NoiseModule,
    /// Colliders particles bounce off or die on.
    #[serde(default)]
    pub collision: CollisionModule,
    /// Secondary emissions into other emitters of the same asset, by index.
    #[serde(default)]
    pub sub_emitters: SubEmittersModule,
    /// Flipbook animation.
    #[serde(default)]
    pub texture_sheet_animation: TextureSheetAnimationModule,
}

impl Default for EmitterData {
    fn default() -> Self {
        Self {
            name: "Emitter".to_string(),
            enabled: true,
            position: Vec3::ZERO,
            fixed_seed: None,
            main: MainModule::default(),
            emission: EmissionModule::default(),
            shape: ShapeModule::default(),
            velocity_over_lifetime: VelocityOverLifetimeModule::default(),
            limit_velocity_over_lifetime: LimitVelocityOverLifetimeModule::default(),
            inherit_velocity: InheritVelocityModule::default(),
            force_over_lifetime: ForceOverLifetimeModule::default(),
            color_over_lifetime: ColorOverLifetimeModule::default(),
            color_by_speed: ColorBySpeedModule::default(),
            size_over_lifetime: SizeOverLifetimeModule::default(),
            size_by_speed: SizeBySpeedModule::default(),
            rotation_over_lifetime: RotationOverLifetimeModule::default(),
            rotation_by_speed: RotationBySpeedModule::default(),
            noise: NoiseModule::default(),
            collision: CollisionModule::default(),
            sub_emitters: SubEmittersModule::default(),
            texture_sheet_animation: TextureSheetAnimationModule::default(),
        }
    }
}

/// A complete particle effect asset, loadable from RON files.
///
/// Contains one or more emitters. Sub-emitters refer to other emitters of the same
/// asset by index. Reference the asset from a [`ParticleSystem3D`](crate::ParticleSystem3D)
/// component to play it.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystemAsset {
    confetti_version: String,
    /// Display name for this effect.
    pub name: String,
    /// The emitters that make up this effect.
    pub emitters: Vec<EmitterData>,
}

impl ParticleSystemAsset {
    /// Creates a new asset with the current format version.
    pub fn new(name: String, emitters: Vec<EmitterData>) -> Self {
        Self {
            confetti_version: current_format_version().to_string(),
            name,
            emitters,
        }
    }

    /// Parses an asset from RON bytes without checking its version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ron::error::SpannedError> {
        ron::de::from_bytes(bytes)
    }

    /// The format version this asset was written with.
    pub fn version(&self) -> &str {
        &self.confetti_version
    }

    /// Validates this asset's `confetti_version` against the current format version.
    pub fn version_status(&self) -> VersionStatus {
        versioning::validate_version(&self.confetti_version)
    }
}
