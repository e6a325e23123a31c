pub use crate::ConfettiPlugin;

pub use crate::asset::{
    AnimationCurve, CurveEasing, CurveKey, EmitterData, Gradient, GradientInterpolation,
    GradientStop, MinMaxCurve, MinMaxCurveVector3, MinMaxGradient, ParticleSystemAsset,
};
pub use crate::effect::ParticleEffect;
pub use crate::error::ParticleSystemError;
pub use crate::modules::{
    Collider, ColliderShape, CollisionMode, CollisionModule, ColorBySpeedModule,
    ColorOverLifetimeModule, EmissionModule, ForceOverLifetimeModule, InheritVelocityMode,
    InheritVelocityModule, LimitVelocityOverLifetimeModule, MainModule, NoiseModule,
    NoiseQuality, ParticleEmissionBurst, RotationBySpeedModule, RotationOverLifetimeModule,
    ShapeModule, SizeBySpeedModule, SizeOverLifetimeModule, StartRotation, StartSize,
    StopBehavior, SubEmitterEntry, SubEmitterProperties, SubEmitterType, SubEmittersModule,
    TextureSheetAnimation, TextureSheetAnimationModule, TextureSheetRow,
    VelocityOverLifetimeModule,
};
pub use crate::particle::{ContributionName, Particle};
pub use crate::render::{ParticleInstance, ParticleInstances};
pub use crate::runtime::{
    EmitterEntity, ParticleSystem3D, ParticleSystemCompleted, ParticleSystemCycled,
    ParticleSystemRuntime,
};
pub use crate::shapes::{
    ArcMode, ArcSettings, BoxEmitFrom, BoxShape, CircleShape, ConeEmitFrom, ConeShape,
    EdgeShape, HemisphereShape, ParticleSystemShape, SphereShape,
};
pub use crate::space::SimulationSpace;
pub use crate::system::{ParticleSystem, ParticleSystemEvent, PlaybackState};
