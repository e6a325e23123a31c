use bevy_confetti::prelude::*;

#[test]
fn curves_parse_every_variant() {
    let constant: MinMaxCurve = ron::from_str("Constant(3.0)").expect("constant");
    assert_eq!(constant, MinMaxCurve::constant(3.0));

    let range: MinMaxCurve = ron::from_str("TwoConstants(min: 1.0, max: 2.0)").expect("range");
    assert_eq!(range.get_value(0.0, 0.5), 1.5);

    let curve: MinMaxCurve =
        ron::from_str("Curve(curve: (keys: [(time: 0.0, value: 1.0), (time: 1.0, value: 3.0)]))")
            .expect("curve");
    assert!((curve.get_value(0.5, 0.0) - 2.0).abs() < 1e-5);
    assert!(!curve.is_random());
}

#[test]
fn runtime_state_is_not_serialized() {
    let mut noise = NoiseModule::default();
    noise.enabled = true;
    let text = ron::to_string(&noise).expect("serializable noise");
    assert!(!text.contains("scroll_offset"));
    let parsed: NoiseModule = ron::from_str(&text).expect("round trip");
    assert_eq!(parsed, noise);
}

#[test]
fn sub_emitter_properties_use_flag_names() {
    let entry = SubEmitterEntry::new(1, SubEmitterType::Death)
        .with_properties(SubEmitterProperties::COLOR | SubEmitterProperties::SIZE);
    let text = ron::to_string(&entry).expect("serializable entry");
    assert!(text.contains("COLOR | SIZE"), "serialized {text}");

    let parsed: SubEmitterEntry = ron::from_str(&text).expect("round trip");
    assert_eq!(parsed, entry);
}

#[test]
fn shapes_parse_with_defaults() {
    let shape: ParticleSystemShape = ron::from_str("Sphere((radius: 2.0))").expect("sphere");
    assert_eq!(
        shape,
        ParticleSystemShape::Sphere(SphereShape {
            radius: 2.0,
            emit_from_shell: false,
        })
    );
}

#[test]
fn gradients_parse_stops() {
    let color: MinMaxGradient = ron::from_str(
        "Gradient((stops: [(color: (1.0, 0.0, 0.0, 1.0), position: 0.0), (color: (0.0, 0.0, 1.0, 1.0), position: 1.0)]))",
    )
    .expect("gradient");
    let middle = color.get_value(0.5, 0.0);
    assert!((middle.red - 0.5).abs() < 1e-5);
    assert!((middle.blue - 0.5).abs() < 1e-5);
}

#[test]
fn emitters_round_trip_through_asset_text() {
    let mut emitter = EmitterData {
        name: "Sparks".to_string(),
        fixed_seed: Some(42),
        ..Default::default()
    };
    emitter.emission.bursts.push(ParticleEmissionBurst::default());
    emitter.collision.enabled = true;
    let asset = ParticleSystemAsset::new("Round trip".to_string(), vec![emitter]);

    let text = ron::ser::to_string_pretty(&asset, ron::ser::PrettyConfig::default())
        .expect("serializable asset");
    let parsed = ParticleSystemAsset::from_bytes(text.as_bytes()).expect("round trip");
    let emitter = &parsed.emitters[0];
    assert_eq!(emitter.fixed_seed, Some(42));
    assert_eq!(emitter.emission, asset.emitters[0].emission);
    assert_eq!(emitter.collision, asset.emitters[0].collision);
}
