use super::*;
use serde_json::json;

fn nums(v: &[f64]) -> Vec<KeyframeValue> {
    v.iter().copied().map(KeyframeValue::Number).collect()
}

fn approx(v: Option<KeyframeValue>, expected: f64) {
    let got = v.and_then(|v| v.as_number()).expect("number sample");
    assert!((got - expected).abs() < 1e-9, "got {got}, expected {expected}");
}

#[test]
fn key_paths_use_dotted_wire_names() {
    for kp in KeyPath::ALL {
        let v = serde_json::to_value(kp).unwrap();
        assert_eq!(v, json!(kp.as_str()));
        assert_eq!(KeyPath::parse(kp.as_str()), Some(kp));
    }
    assert_eq!(KeyPath::parse("transform.scale"), None);
}

#[test]
fn values_deserialize_by_shape() {
    let vals: Vec<KeyframeValue> =
        serde_json::from_value(json!([{"x": 1, "y": 2}, {"w": 3, "h": 4}, 5])).unwrap();
    assert_eq!(vals[0], KeyframeValue::Point(Vec2Def::new(1.0, 2.0)));
    assert_eq!(vals[1], KeyframeValue::Size(SizeDef::new(3.0, 4.0)));
    assert_eq!(vals[2], KeyframeValue::Number(5.0));
    assert!(serde_json::from_value::<KeyframeValue>(json!({"q": 1})).is_err());
}

#[test]
fn wire_defaults_are_lenient() {
    let a: Animations = serde_json::from_value(json!({"enabled": true})).unwrap();
    assert_eq!(a.key_path, KeyPath::Position);
    assert!(a.is_infinite());
    assert_eq!(a.duration(), 1.0);
    assert_eq!(a.speed(), 1.0);
}

#[test]
fn strict_constructor_rejects_bad_numbers() {
    assert!(Animations::new(KeyPath::Opacity, nums(&[0.0, 1.0]), 0.0).is_err());
    assert!(Animations::new(KeyPath::Opacity, nums(&[0.0, 1.0]), f64::NAN).is_err());
    let ok = Animations::new(KeyPath::Opacity, nums(&[0.0, 1.0]), 2.0).unwrap();
    assert!(ok.clone().with_speed(0.0).is_err());
    assert!(ok.clone().repeating_for(-1.0).is_err());
    assert!(ok.with_speed(2.0).is_ok());
}

#[test]
fn strict_constructor_rejects_shape_mismatch() {
    let err = Animations::new(
        KeyPath::Position,
        vec![KeyframeValue::Number(3.0)],
        1.0,
    )
    .unwrap_err();
    assert!(err.to_string().contains("position"));

    assert!(
        Animations::new(
            KeyPath::Bounds,
            vec![KeyframeValue::Size(SizeDef::new(10.0, 10.0))],
            1.0
        )
        .is_ok()
    );
}

#[test]
fn samples_evenly_spaced_keyframes() {
    let a = Animations::new(KeyPath::Opacity, nums(&[0.0, 1.0, 0.0]), 2.0).unwrap();
    approx(a.sample(0.0), 0.0);
    approx(a.sample(0.5), 0.5);
    approx(a.sample(1.0), 1.0);
    approx(a.sample(1.5), 0.5);
    // Wraps every duration when infinite.
    approx(a.sample(2.5), 0.5);
}

#[test]
fn speed_scales_time_and_autoreverse_ping_pongs() {
    let a = Animations::new(KeyPath::PositionX, nums(&[0.0, 100.0]), 1.0)
        .unwrap()
        .autoreversing(true)
        .with_speed(2.0)
        .unwrap();
    approx(a.sample(0.25), 50.0);
    approx(a.sample(0.5), 100.0);
    approx(a.sample(0.75), 50.0);
}

#[test]
fn finite_budget_ends_the_track() {
    let a = Animations::new(KeyPath::PositionY, nums(&[0.0, 10.0]), 1.0)
        .unwrap()
        .repeating_for(1.5)
        .unwrap();
    approx(a.sample(1.25), 2.5);
    assert!(a.sample(1.5).is_none());
    assert!(a.sample(10.0).is_none());
}

#[test]
fn disabled_or_empty_tracks_do_not_sample() {
    let mut a = Animations::new(KeyPath::Opacity, nums(&[1.0]), 1.0).unwrap();
    approx(a.sample(0.3), 1.0);
    a.enabled = false;
    assert!(a.sample(0.3).is_none());
    let empty = Animations {
        enabled: true,
        ..Animations::default()
    };
    assert!(empty.sample(0.0).is_none());
}

#[test]
fn point_values_interpolate_componentwise() {
    let a = Animations::new(
        KeyPath::Position,
        vec![
            KeyframeValue::Point(Vec2Def::new(0.0, 0.0)),
            KeyframeValue::Point(Vec2Def::new(10.0, 20.0)),
        ],
        1.0,
    )
    .unwrap();
    assert_eq!(
        a.sample(0.5),
        Some(KeyframeValue::Point(Vec2Def::new(5.0, 10.0)))
    );
}
