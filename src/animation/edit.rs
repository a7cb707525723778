//! Lenient editing boundary for keyframe tracks.
//!
//! Text typed into an inspector is coerced here instead of being rejected: blank or invalid
//! numbers fall back to safe defaults so a half-typed field never leaves a track unplayable.
//! Strict checking stays in [`Animations::validate`].

use crate::animation::keyframes::{Animations, KeyPath, KeyframeValue, ValueShape};
use crate::foundation::core::{FlagDef, SizeDef, Vec2Def};
use crate::foundation::error::{CaError, CaResult};
use crate::layers::model::Layer;

fn positive(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Duration field: blank, invalid or non-positive input means 1 second.
pub fn parse_duration(input: &str) -> f64 {
    positive(input).unwrap_or(1.0)
}

/// Speed field: blank, invalid or non-positive input means 1x.
pub fn parse_speed(input: &str) -> f64 {
    positive(input).unwrap_or(1.0)
}

/// Repeat field: blank, invalid or non-positive input means one pass of `duration`.
pub fn parse_repeat(input: &str, duration: Option<f64>) -> f64 {
    positive(input).unwrap_or_else(|| {
        duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(1.0)
    })
}

/// The value a new keyframe starts from: the layer's current value for `key_path`.
pub fn seed_value(key_path: KeyPath, layer: &Layer) -> KeyframeValue {
    match key_path {
        KeyPath::Position => KeyframeValue::Point(layer.position),
        KeyPath::PositionX => KeyframeValue::Number(layer.position.x),
        KeyPath::PositionY => KeyframeValue::Number(layer.position.y),
        KeyPath::RotationZ => KeyframeValue::Number(layer.effective_rotation()),
        KeyPath::RotationX | KeyPath::RotationY => KeyframeValue::Number(0.0),
        KeyPath::Opacity => KeyframeValue::Number(layer.effective_opacity()),
        KeyPath::Bounds => KeyframeValue::Size(layer.size),
    }
}

/// Toggle a track on or off. Enabling an empty track seeds one keyframe from the layer.
pub fn set_enabled(current: Option<&Animations>, layer: &Layer, enabled: bool) -> Animations {
    let mut anim = current.cloned().unwrap_or_default();
    anim.enabled = enabled;
    if enabled && anim.values.is_empty() {
        anim.values.push(seed_value(anim.key_path, layer));
    }
    anim
}

/// Switch a track to `key_path`, converting each keyframe to the new value shape.
///
/// Compatible values are kept (a point's `x` survives a switch to `position.x`); anything else is
/// replaced with the layer's current value. Opacity and bounds always restart from the layer.
pub fn retarget(anim: &Animations, key_path: KeyPath, layer: &Layer) -> Animations {
    let values = anim
        .values
        .iter()
        .map(|v| retarget_value(*v, key_path, layer))
        .collect();
    Animations {
        key_path,
        values,
        ..anim.clone()
    }
}

fn retarget_value(v: KeyframeValue, key_path: KeyPath, layer: &Layer) -> KeyframeValue {
    use KeyframeValue as V;
    match (key_path, v) {
        (KeyPath::Position, V::Point(p)) => V::Point(p),
        (KeyPath::Position, V::Size(_)) => V::Point(Vec2Def::default()),
        (KeyPath::Position, V::Number(_)) => V::Point(layer.position),
        (KeyPath::PositionX, V::Number(n)) | (KeyPath::PositionY, V::Number(n)) => V::Number(n),
        (KeyPath::PositionX, V::Point(p)) => V::Number(p.x),
        (KeyPath::PositionY, V::Point(p)) => V::Number(p.y),
        (KeyPath::PositionX, V::Size(_)) => V::Number(layer.position.x),
        (KeyPath::PositionY, V::Size(_)) => V::Number(layer.position.y),
        (KeyPath::RotationX | KeyPath::RotationY | KeyPath::RotationZ, V::Number(n)) => {
            V::Number(n)
        }
        (KeyPath::RotationX | KeyPath::RotationY | KeyPath::RotationZ, _) => {
            seed_value(key_path, layer)
        }
        (KeyPath::Opacity | KeyPath::Bounds, _) => seed_value(key_path, layer),
    }
}

/// Autoreverse toggle as stored on the wire.
pub fn set_autoreverses(anim: &mut Animations, on: bool) {
    anim.autoreverses = FlagDef(on);
}

/// Infinite toggle. Turning it off seeds the repeat budget with one duration when unset.
pub fn set_infinite(anim: &mut Animations, on: bool) {
    anim.infinite = FlagDef(on);
    if !on && anim.repeat_duration_seconds.is_none() {
        anim.repeat_duration_seconds = Some(anim.duration());
    }
}

// Half rounds toward positive infinity.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Parse one value per line.
///
/// `position` and `bounds` take `a, b` pairs; `opacity` takes percentages clamped to `0..=100`;
/// every other key path takes plain numbers. Numbers are rounded to integers. Blank lines are
/// skipped; the first malformed line fails the whole parse.
pub fn parse_bulk_values(key_path: KeyPath, text: &str) -> CaResult<Vec<KeyframeValue>> {
    let mut out = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match key_path.value_shape() {
            ValueShape::Point | ValueShape::Size => {
                let parts: Vec<&str> = line.split(',').map(str::trim).collect();
                let [a, b] = parts.as_slice() else {
                    return Err(CaError::validation(format!(
                        "invalid format for {}: expected two comma-separated numbers, got '{line}'",
                        key_path.as_str()
                    )));
                };
                let (Some(a), Some(b)) = (finite(a), finite(b)) else {
                    return Err(CaError::validation(format!("invalid numbers in line: {line}")));
                };
                let (a, b) = (round_half_up(a), round_half_up(b));
                out.push(if key_path == KeyPath::Bounds {
                    KeyframeValue::Size(SizeDef::new(a, b))
                } else {
                    KeyframeValue::Point(Vec2Def::new(a, b))
                });
            }
            ValueShape::Number => {
                let Some(n) = finite(line) else {
                    return Err(CaError::validation(format!("invalid number: {line}")));
                };
                let v = if key_path == KeyPath::Opacity {
                    round_half_up(n).clamp(0.0, 100.0) / 100.0
                } else {
                    round_half_up(n)
                };
                out.push(KeyframeValue::Number(v));
            }
        }
    }
    Ok(out)
}

fn finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Inverse of [`parse_bulk_values`]: one rounded value per line.
pub fn format_bulk_values(key_path: KeyPath, values: &[KeyframeValue]) -> String {
    values
        .iter()
        .map(|v| match *v {
            KeyframeValue::Number(n) if key_path == KeyPath::Opacity => {
                format!("{}", round_half_up(n * 100.0))
            }
            KeyframeValue::Number(n) => format!("{}", round_half_up(n)),
            KeyframeValue::Point(p) => {
                format!("{}, {}", round_half_up(p.x), round_half_up(p.y))
            }
            KeyframeValue::Size(s) => {
                format!("{}, {}", round_half_up(s.w), round_half_up(s.h))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "../../tests/unit/animation/edit.rs"]
mod tests;
