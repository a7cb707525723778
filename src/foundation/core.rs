use serde::{Deserialize, Serialize};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// A 2D point/vector on the document wire (`{"x": .., "y": ..}` or `[x, y]`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2Def {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2Def {
    /// Build a point from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset both components.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Point> for Vec2Def {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl<'de> Deserialize<'de> for Vec2Def {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj {
                #[serde(default)]
                x: f64,
                #[serde(default)]
                y: f64,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => Ok(Self { x, y }),
            Repr::Obj { x, y } => Ok(Self { x, y }),
        }
    }
}

/// A 2D size on the document wire (`{"w": .., "h": ..}` or `[w, h]`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SizeDef {
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl SizeDef {
    /// Build a size from components.
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub(crate) fn is_finite(self) -> bool {
        self.w.is_finite() && self.h.is_finite()
    }
}

impl<'de> Deserialize<'de> for SizeDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj {
                #[serde(default)]
                w: f64,
                #[serde(default)]
                h: f64,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([w, h]) => Ok(Self { w, h }),
            Repr::Obj { w, h } => Ok(Self { w, h }),
        }
    }
}

/// A 0/1 flag as stored by CA documents. Booleans are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagDef(pub bool);

impl FlagDef {
    /// Flag set.
    pub const ON: Self = Self(true);
    /// Flag cleared.
    pub const OFF: Self = Self(false);

    /// Whether the flag is set.
    pub fn is_on(self) -> bool {
        self.0
    }
}

impl From<bool> for FlagDef {
    fn from(v: bool) -> Self {
        Self(v)
    }
}

impl Serialize for FlagDef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(u8::from(self.0))
    }
}

impl<'de> Deserialize<'de> for FlagDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bool(bool),
            Num(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bool(b) => Ok(Self(b)),
            Repr::Num(n) if n == 0.0 => Ok(Self(false)),
            Repr::Num(n) if n == 1.0 => Ok(Self(true)),
            Repr::Num(n) => Err(serde::de::Error::custom(format!(
                "flag must be 0 or 1, got {n}"
            ))),
        }
    }
}
