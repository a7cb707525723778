use serde::{Deserialize, Serialize};

use crate::foundation::core::{FlagDef, SizeDef, Vec2Def};
use crate::foundation::error::{CaError, CaResult};

/// Animatable property addressed by a keyframe track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyPath {
    /// Layer position as a point.
    #[default]
    #[serde(rename = "position")]
    Position,
    /// Horizontal position only.
    #[serde(rename = "position.x")]
    PositionX,
    /// Vertical position only.
    #[serde(rename = "position.y")]
    PositionY,
    /// Rotation around the x axis.
    #[serde(rename = "transform.rotation.x")]
    RotationX,
    /// Rotation around the y axis.
    #[serde(rename = "transform.rotation.y")]
    RotationY,
    /// In-plane rotation.
    #[serde(rename = "transform.rotation.z")]
    RotationZ,
    /// Layer opacity.
    #[serde(rename = "opacity")]
    Opacity,
    /// Layer bounds size.
    #[serde(rename = "bounds")]
    Bounds,
}

/// Shape of the values a [`KeyPath`] expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueShape {
    /// `{x, y}` values.
    Point,
    /// `{w, h}` values.
    Size,
    /// Plain numbers.
    Number,
}

impl KeyPath {
    /// All key paths, in editor menu order.
    pub const ALL: [KeyPath; 8] = [
        KeyPath::Position,
        KeyPath::PositionX,
        KeyPath::PositionY,
        KeyPath::RotationX,
        KeyPath::RotationY,
        KeyPath::RotationZ,
        KeyPath::Opacity,
        KeyPath::Bounds,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::PositionX => "position.x",
            Self::PositionY => "position.y",
            Self::RotationX => "transform.rotation.x",
            Self::RotationY => "transform.rotation.y",
            Self::RotationZ => "transform.rotation.z",
            Self::Opacity => "opacity",
            Self::Bounds => "bounds",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Value shape expected by this key path.
    pub fn value_shape(self) -> ValueShape {
        match self {
            Self::Position => ValueShape::Point,
            Self::Bounds => ValueShape::Size,
            Self::PositionX
            | Self::PositionY
            | Self::RotationX
            | Self::RotationY
            | Self::RotationZ
            | Self::Opacity => ValueShape::Number,
        }
    }
}

/// One keyframe value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    /// A point.
    Point(Vec2Def),
    /// A size.
    Size(SizeDef),
    /// A plain number.
    Number(f64),
}

impl KeyframeValue {
    /// Shape of this value.
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Point(_) => ValueShape::Point,
            Self::Size(_) => ValueShape::Size,
            Self::Number(_) => ValueShape::Number,
        }
    }

    /// The number, if this is a plain number.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Self::Point(p) => p.is_finite(),
            Self::Size(s) => s.is_finite(),
            Self::Number(v) => v.is_finite(),
        }
    }
}

impl<'de> Deserialize<'de> for KeyframeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Point { x: f64, y: f64 },
            Size { w: f64, h: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Number(v)),
            Repr::Point { x, y } => Ok(Self::Point(Vec2Def::new(x, y))),
            Repr::Size { w, h } => Ok(Self::Size(SizeDef::new(w, h))),
        }
    }
}

/// Interpolation contract for keyframe value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2Def {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2Def::new(f64::lerp(&a.x, &b.x, t), f64::lerp(&a.y, &b.y, t))
    }
}

impl Lerp for SizeDef {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        SizeDef::new(f64::lerp(&a.w, &b.w, t), f64::lerp(&a.h, &b.h, t))
    }
}

impl Lerp for KeyframeValue {
    // Mismatched shapes hold the first value.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Point(a), Self::Point(b)) => Self::Point(Vec2Def::lerp(a, b, t)),
            (Self::Size(a), Self::Size(b)) => Self::Size(SizeDef::lerp(a, b, t)),
            (Self::Number(a), Self::Number(b)) => Self::Number(f64::lerp(a, b, t)),
            _ => *a,
        }
    }
}

/// Keyframe track attached to a layer.
///
/// Keyframes are evenly spaced over `duration_seconds`. Optional fields stay optional on the wire
/// so documents round-trip unchanged; the accessors supply the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animations {
    /// Whether the track plays.
    #[serde(default)]
    pub enabled: bool,
    /// Animated property.
    #[serde(default)]
    pub key_path: KeyPath,
    /// Play forward then backward each cycle.
    #[serde(default)]
    pub autoreverses: FlagDef,
    /// Keyframe values, shaped per [`KeyPath::value_shape`].
    #[serde(default)]
    pub values: Vec<KeyframeValue>,
    /// One forward pass, in seconds (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Repeat forever. When off, `repeat_duration_seconds` bounds the active time.
    #[serde(default = "default_infinite")]
    pub infinite: FlagDef,
    /// Total active time when not infinite (default: one duration).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_duration_seconds: Option<f64>,
    /// Playback rate multiplier (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

fn default_infinite() -> FlagDef {
    FlagDef::ON
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            enabled: false,
            key_path: KeyPath::default(),
            autoreverses: FlagDef::OFF,
            values: Vec::new(),
            duration_seconds: None,
            infinite: default_infinite(),
            repeat_duration_seconds: None,
            speed: None,
        }
    }
}

impl Animations {
    /// Strict constructor for an enabled, infinitely repeating track.
    pub fn new(
        key_path: KeyPath,
        values: Vec<KeyframeValue>,
        duration_seconds: f64,
    ) -> CaResult<Self> {
        let anim = Self {
            enabled: true,
            key_path,
            values,
            duration_seconds: Some(duration_seconds),
            ..Self::default()
        };
        anim.validate()?;
        Ok(anim)
    }

    /// Toggle autoreverse.
    pub fn autoreversing(mut self, on: bool) -> Self {
        self.autoreverses = FlagDef(on);
        self
    }

    /// Set the playback rate (`> 0`).
    pub fn with_speed(mut self, speed: f64) -> CaResult<Self> {
        self.speed = Some(speed);
        self.validate()?;
        Ok(self)
    }

    /// Bound the active time to `seconds` (`> 0`) instead of repeating forever.
    pub fn repeating_for(mut self, seconds: f64) -> CaResult<Self> {
        self.infinite = FlagDef::OFF;
        self.repeat_duration_seconds = Some(seconds);
        self.validate()?;
        Ok(self)
    }

    /// Effective forward-pass duration.
    pub fn duration(&self) -> f64 {
        self.duration_seconds.unwrap_or(1.0)
    }

    /// Effective playback rate.
    pub fn speed(&self) -> f64 {
        self.speed.unwrap_or(1.0)
    }

    /// Whether the track repeats forever.
    pub fn is_infinite(&self) -> bool {
        self.infinite.is_on()
    }

    /// Total active time in animation-local seconds, `None` when infinite.
    pub fn active_seconds(&self) -> Option<f64> {
        if self.is_infinite() {
            None
        } else {
            Some(self.repeat_duration_seconds.unwrap_or_else(|| self.duration()))
        }
    }

    /// Validate numeric domains and the value shapes against the key path.
    pub fn validate(&self) -> CaResult<()> {
        for (name, v) in [
            ("durationSeconds", self.duration_seconds),
            ("speed", self.speed),
        ] {
            if let Some(v) = v
                && (!v.is_finite() || v <= 0.0)
            {
                return Err(CaError::validation(format!(
                    "animation {name} must be finite and > 0"
                )));
            }
        }
        if !self.is_infinite()
            && let Some(r) = self.repeat_duration_seconds
            && (!r.is_finite() || r <= 0.0)
        {
            return Err(CaError::validation(
                "animation repeatDurationSeconds must be finite and > 0",
            ));
        }

        let expected = self.key_path.value_shape();
        for (i, v) in self.values.iter().enumerate() {
            if v.shape() != expected {
                return Err(CaError::validation(format!(
                    "animation value {i} does not match key path '{}' (expected {expected:?})",
                    self.key_path.as_str()
                )));
            }
            if !v.is_finite() {
                return Err(CaError::validation(format!(
                    "animation value {i} must be finite"
                )));
            }
        }
        Ok(())
    }

    /// Sample the track `t` seconds after it started.
    ///
    /// Returns `None` when the track is disabled, has no values, or a finite repeat budget has
    /// been spent (the layer then shows its own value).
    pub fn sample(&self, t: f64) -> Option<KeyframeValue> {
        if !self.enabled || self.values.is_empty() {
            return None;
        }
        let dur = self.duration();
        let speed = self.speed();
        if !(dur.is_finite() && dur > 0.0 && speed.is_finite() && speed > 0.0) {
            return None;
        }

        let local = t.max(0.0) * speed;
        if let Some(active) = self.active_seconds()
            && local >= active
        {
            return None;
        }

        let reverses = self.autoreverses.is_on();
        let cycle = if reverses { 2.0 * dur } else { dur };
        let mut phase = local % cycle;
        if reverses && phase > dur {
            phase = cycle - phase;
        }
        let u = (phase / dur).clamp(0.0, 1.0);
        Some(sample_even(&self.values, u))
    }
}

fn sample_even(values: &[KeyframeValue], u: f64) -> KeyframeValue {
    let n = values.len();
    if n == 1 {
        return values[0];
    }
    let pos = u * (n - 1) as f64;
    let i = (pos.floor() as usize).min(n - 2);
    let frac = pos - i as f64;
    KeyframeValue::lerp(&values[i], &values[i + 1], frac)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
