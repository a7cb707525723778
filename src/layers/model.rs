use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::keyframes::Animations;
use crate::assets::color::ColorDef;
use crate::foundation::core::{FlagDef, SizeDef, Vec2Def};
use crate::foundation::error::{CaError, CaResult};

/// A node of the document's display tree.
///
/// Optional properties stay optional on the wire so persisted documents round-trip unchanged;
/// the accessor methods apply Core Animation defaults. The `id` is fixed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    id: String,
    /// Display name; not required to be unique.
    #[serde(default)]
    pub name: String,
    /// Position of the anchor point in the parent's coordinate space.
    #[serde(default)]
    pub position: Vec2Def,
    /// Bounds size.
    #[serde(default)]
    pub size: SizeDef,
    /// Opacity in `0..1` (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// In-plane rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Rotation around the x axis in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<f64>,
    /// Rotation around the y axis in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<f64>,
    /// Background fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Background opacity in `0..1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f64>,
    /// Border color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Border width in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Corner radius in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Visibility (default visible).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Anchor point in unit coordinates (default `{0.5, 0.5}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_point: Option<Vec2Def>,
    /// Top-left origin for this layer and its sublayers when on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_flipped: Option<FlagDef>,
    /// Clip sublayers to bounds when on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masks_to_bounds: Option<FlagDef>,
    /// Keyframe track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<Animations>,
    /// Ordered sublayers. Order is z-order and document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Layer>>,
    /// Kind-specific properties, tagged by `type` on the wire.
    #[serde(flatten)]
    pub kind: LayerKind,
}

impl Layer {
    /// Default anchor point.
    pub const DEFAULT_ANCHOR: Vec2Def = Vec2Def::new(0.5, 0.5);

    /// Create a layer with every optional property unset.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: Vec2Def::default(),
            size: SizeDef::default(),
            opacity: None,
            rotation: None,
            rotation_x: None,
            rotation_y: None,
            background_color: None,
            background_opacity: None,
            border_color: None,
            border_width: None,
            corner_radius: None,
            visible: None,
            anchor_point: None,
            geometry_flipped: None,
            masks_to_bounds: None,
            animations: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Builder-style geometry setter.
    pub fn with_frame(mut self, position: Vec2Def, size: SizeDef) -> Self {
        self.position = position;
        self.size = size;
        self
    }

    /// Builder-style children setter.
    pub fn with_children(mut self, children: Vec<Layer>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    /// Stable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Effective opacity.
    pub fn effective_opacity(&self) -> f64 {
        self.opacity.unwrap_or(1.0)
    }

    /// Effective rotation in degrees.
    pub fn effective_rotation(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }

    /// Effective anchor point.
    pub fn effective_anchor(&self) -> Vec2Def {
        self.anchor_point.unwrap_or(Self::DEFAULT_ANCHOR)
    }

    /// Whether the layer is shown.
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    /// Whether the layer uses a top-left origin.
    pub fn is_geometry_flipped(&self) -> bool {
        self.geometry_flipped.is_some_and(FlagDef::is_on)
    }

    /// Whether sublayers are clipped.
    pub fn masks_to_bounds(&self) -> bool {
        self.masks_to_bounds.is_some_and(FlagDef::is_on)
    }

    /// Validate this node's own properties (children are not visited).
    pub fn validate(&self) -> CaResult<()> {
        if self.id.trim().is_empty() {
            return Err(CaError::validation("layer id must be non-empty"));
        }
        let at = |what: &str| format!("layer '{}' {what}", self.id);

        if !self.position.is_finite() || !self.size.is_finite() {
            return Err(CaError::validation(at("geometry must be finite")));
        }
        if self.size.w < 0.0 || self.size.h < 0.0 {
            return Err(CaError::validation(at("size must be >= 0")));
        }
        for (name, v) in [
            ("opacity", self.opacity),
            ("backgroundOpacity", self.background_opacity),
        ] {
            if let Some(v) = v
                && !(0.0..=1.0).contains(&v)
            {
                return Err(CaError::validation(at(&format!("{name} must be in [0, 1]"))));
            }
        }
        for (name, v) in [
            ("rotation", self.rotation),
            ("rotationX", self.rotation_x),
            ("rotationY", self.rotation_y),
        ] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(CaError::validation(at(&format!("{name} must be finite"))));
            }
        }
        for (name, v) in [
            ("borderWidth", self.border_width),
            ("cornerRadius", self.corner_radius),
        ] {
            if let Some(v) = v
                && (!v.is_finite() || v < 0.0)
            {
                return Err(CaError::validation(at(&format!(
                    "{name} must be finite and >= 0"
                ))));
            }
        }
        for (name, c) in [
            ("backgroundColor", &self.background_color),
            ("borderColor", &self.border_color),
        ] {
            if let Some(c) = c {
                ColorDef::parse(c)
                    .map_err(|e| CaError::validation(at(&format!("{name}: {e}"))))?;
            }
        }
        if let Some(a) = &self.animations {
            a.validate()
                .map_err(|e| CaError::validation(at(&e.to_string())))?;
        }
        self.kind
            .validate()
            .map_err(|e| CaError::validation(at(&e.to_string())))
    }
}

/// Kind-specific layer payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    /// Plain container/rect layer. `group` is accepted as an input alias.
    #[serde(alias = "group")]
    Basic,
    /// Image layer.
    Image(ImageProps),
    /// Text layer.
    Text(TextProps),
    /// Vector shape layer.
    Shape(ShapeProps),
    /// Frame-sequence video layer.
    Video(VideoProps),
    /// Gradient layer.
    Gradient(GradientProps),
    /// Particle emitter layer.
    Emitter(EmitterProps),
    /// Pure grouping/transform layer.
    Transform,
}

impl LayerKind {
    /// Wire discriminant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Image(_) => "image",
            Self::Text(_) => "text",
            Self::Shape(_) => "shape",
            Self::Video(_) => "video",
            Self::Gradient(_) => "gradient",
            Self::Emitter(_) => "emitter",
            Self::Transform => "transform",
        }
    }

    /// Base used to generate default display names.
    pub fn name_base(&self) -> &'static str {
        match self {
            Self::Basic => "Basic Layer",
            Self::Image(_) => "Image Layer",
            Self::Text(_) => "Text Layer",
            Self::Shape(_) => "Shape Layer",
            Self::Video(_) => "Video Layer",
            Self::Gradient(_) => "Gradient Layer",
            Self::Emitter(_) => "Emitter Layer",
            Self::Transform => "Transform Layer",
        }
    }

    /// Emitter payload, if this is an emitter.
    pub fn as_emitter(&self) -> Option<&EmitterProps> {
        match self {
            Self::Emitter(e) => Some(e),
            _ => None,
        }
    }

    fn validate(&self) -> CaResult<()> {
        match self {
            Self::Basic | Self::Transform | Self::Image(_) => Ok(()),
            Self::Text(t) => {
                if let Some(s) = t.font_size
                    && (!s.is_finite() || s <= 0.0)
                {
                    return Err(CaError::validation("fontSize must be finite and > 0"));
                }
                if let Some(c) = &t.color {
                    ColorDef::parse(c)?;
                }
                Ok(())
            }
            Self::Shape(s) => {
                for (name, v) in [("strokeWidth", s.stroke_width), ("radius", s.radius)] {
                    if let Some(v) = v
                        && (!v.is_finite() || v < 0.0)
                    {
                        return Err(CaError::validation(format!(
                            "{name} must be finite and >= 0"
                        )));
                    }
                }
                for c in [&s.fill, &s.stroke].into_iter().flatten() {
                    ColorDef::parse(c)?;
                }
                Ok(())
            }
            Self::Video(v) => {
                if v.frame_count == 0 {
                    return Err(CaError::validation("video frameCount must be > 0"));
                }
                for (name, x) in [("fps", v.fps), ("duration", v.duration)] {
                    if let Some(x) = x
                        && (!x.is_finite() || x <= 0.0)
                    {
                        return Err(CaError::validation(format!(
                            "video {name} must be finite and > 0"
                        )));
                    }
                }
                Ok(())
            }
            Self::Gradient(g) => {
                if !g.start_point.is_finite() || !g.end_point.is_finite() {
                    return Err(CaError::validation("gradient points must be finite"));
                }
                for stop in &g.colors {
                    ColorDef::parse(&stop.color)?;
                    if !(0.0..=1.0).contains(&stop.opacity) {
                        return Err(CaError::validation(
                            "gradient stop opacity must be in [0, 1]",
                        ));
                    }
                }
                Ok(())
            }
            Self::Emitter(e) => e.validate(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How an image fills the layer bounds.
pub enum ImageFit {
    /// Scale to cover, cropping overflow.
    Cover,
    /// Scale to fit inside.
    Contain,
    /// Stretch to the bounds.
    #[default]
    Fill,
    /// Natural size.
    None,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Image layer payload.
pub struct ImageProps {
    /// Opaque asset reference.
    #[serde(default)]
    pub src: String,
    /// Fit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<ImageFit>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal text alignment.
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justified,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text layer payload.
pub struct TextProps {
    /// Text content.
    #[serde(default)]
    pub text: String,
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    /// Wrap within the bounds width when on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<FlagDef>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Primitive shape outline.
pub enum ShapeKind {
    /// Rectangle.
    #[default]
    Rect,
    /// Circle/ellipse inscribed in the bounds.
    Circle,
    /// Rectangle with rounded corners.
    RoundedRect,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Shape layer payload.
pub struct ShapeProps {
    /// Outline kind.
    #[serde(default)]
    pub shape: ShapeKind,
    /// Fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Corner radius for rounded rectangles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Frame stepping mode for video layers.
pub enum CalculationMode {
    /// Interpolated.
    #[default]
    Linear,
    /// Hold each frame.
    Discrete,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Video layer payload (an image sequence).
pub struct VideoProps {
    /// Number of frames in the sequence.
    #[serde(default)]
    pub frame_count: u32,
    /// Frames per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Play backwards after each forward pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_reverses: Option<bool>,
    /// Frame asset name prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_prefix: Option<String>,
    /// Frame asset extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_extension: Option<String>,
    /// Frame stepping mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_mode: Option<CalculationMode>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Gradient geometry.
pub enum GradientType {
    /// Linear between start and end points.
    #[default]
    Axial,
    /// Radial from the start point.
    Radial,
    /// Angular around the start point.
    Conic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One gradient stop.
pub struct GradientColor {
    /// Stop color.
    pub color: String,
    /// Stop opacity in `0..1`.
    #[serde(default = "one")]
    pub opacity: f64,
}

fn one() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Gradient layer payload.
pub struct GradientProps {
    /// Gradient geometry.
    #[serde(default)]
    pub gradient_type: GradientType,
    /// Start point in unit coordinates.
    #[serde(default)]
    pub start_point: Vec2Def,
    /// End point in unit coordinates.
    #[serde(default = "default_gradient_end")]
    pub end_point: Vec2Def,
    /// Ordered stops.
    #[serde(default)]
    pub colors: Vec<GradientColor>,
}

fn default_gradient_end() -> Vec2Def {
    Vec2Def::new(1.0, 1.0)
}

impl Default for GradientProps {
    fn default() -> Self {
        Self {
            gradient_type: GradientType::Axial,
            start_point: Vec2Def::new(0.0, 0.0),
            end_point: default_gradient_end(),
            colors: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Emission geometry.
pub enum EmitterShape {
    /// A single point.
    #[default]
    Point,
    /// A horizontal line.
    Line,
    /// A rectangle.
    Rectangle,
    /// A box (declared, not sampled).
    Cuboid,
    /// A circle (declared, not sampled).
    Circle,
    /// A sphere (declared, not sampled).
    Sphere,
}

impl EmitterShape {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Cuboid => "cuboid",
            Self::Circle => "circle",
            Self::Sphere => "sphere",
        }
    }

    /// Whether the simulator has a sampling implementation for this shape.
    pub fn is_sampled(self) -> bool {
        matches!(self, Self::Point | Self::Line | Self::Rectangle)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Where on the emission shape particles appear.
pub enum EmitterMode {
    /// Anywhere inside.
    #[default]
    Volume,
    /// On the outline.
    Outline,
    /// On the surface.
    Surface,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Particle compositing.
pub enum RenderMode {
    /// Source-over in spawn order.
    #[serde(alias = "sourceOver")]
    Unordered,
    /// Additive ("lighter") blending.
    #[default]
    Additive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Emitter layer payload.
pub struct EmitterProps {
    /// Emission anchor in layer space.
    #[serde(default)]
    pub emitter_position: Vec2Def,
    /// Emission shape extent.
    #[serde(default)]
    pub emitter_size: SizeDef,
    /// Emission shape.
    #[serde(default)]
    pub emitter_shape: EmitterShape,
    /// Emission mode.
    #[serde(default)]
    pub emitter_mode: EmitterMode,
    /// Compositing mode.
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Spawn templates.
    #[serde(default)]
    pub emitter_cells: Vec<EmitterCellDef>,
    /// Layer-wide birth rate multiplier (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_rate: Option<f64>,
    /// Layer-wide lifetime multiplier (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<f64>,
}

impl Default for EmitterProps {
    fn default() -> Self {
        Self {
            emitter_position: Vec2Def::default(),
            emitter_size: SizeDef::default(),
            emitter_shape: EmitterShape::Point,
            emitter_mode: EmitterMode::Volume,
            render_mode: RenderMode::Additive,
            emitter_cells: Vec::new(),
            birth_rate: None,
            lifetime: None,
        }
    }
}

impl EmitterProps {
    fn validate(&self) -> CaResult<()> {
        if !self.emitter_position.is_finite() || !self.emitter_size.is_finite() {
            return Err(CaError::validation("emitter geometry must be finite"));
        }
        for (name, v) in [("birthRate", self.birth_rate), ("lifetime", self.lifetime)] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(CaError::validation(format!("emitter {name} must be finite")));
            }
        }
        for cell in &self.emitter_cells {
            cell.validate()?;
        }
        Ok(())
    }
}

/// Persisted spawn template of an emitter. Angles are in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitterCellDef {
    /// Cell id; also the key into the cell asset map.
    pub id: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional asset reference for the sprite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Particles per second.
    #[serde(default)]
    pub birth_rate: f64,
    /// Particle lifetime in seconds.
    #[serde(default)]
    pub lifetime: f64,
    /// Lifetime jitter.
    #[serde(default)]
    pub lifetime_range: f64,
    /// Emission direction in degrees.
    #[serde(default)]
    pub emission_longitude: f64,
    /// Emission cone half-angle in degrees.
    #[serde(default)]
    pub emission_range: f64,
    /// Out-of-plane emission angle in degrees.
    #[serde(default)]
    pub emission_latitude: f64,
    /// Initial speed.
    #[serde(default)]
    pub velocity: f64,
    /// Speed jitter.
    #[serde(default)]
    pub velocity_range: f64,
    /// Horizontal acceleration.
    #[serde(default)]
    pub x_acceleration: f64,
    /// Vertical acceleration.
    #[serde(default)]
    pub y_acceleration: f64,
    /// Particle color, used when no sprite is available.
    #[serde(default = "default_cell_color")]
    pub color: String,
    /// Initial scale.
    #[serde(default = "one")]
    pub scale: f64,
    /// Scale jitter.
    #[serde(default)]
    pub scale_range: f64,
    /// Scale change per second.
    #[serde(default)]
    pub scale_speed: f64,
    /// Initial alpha jitter.
    #[serde(default)]
    pub alpha_range: f64,
    /// Alpha change per second.
    #[serde(default)]
    pub alpha_speed: f64,
    /// Spin in degrees per second.
    #[serde(default)]
    pub spin: f64,
    /// Spin jitter in degrees per second.
    #[serde(default)]
    pub spin_range: f64,
}

/// Default particle color.
pub const DEFAULT_CELL_COLOR: &str = "rgba(255, 255, 255, 1)";

fn default_cell_color() -> String {
    DEFAULT_CELL_COLOR.to_owned()
}

impl EmitterCellDef {
    /// A cell with every parameter at its default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            src: None,
            birth_rate: 0.0,
            lifetime: 0.0,
            lifetime_range: 0.0,
            emission_longitude: 0.0,
            emission_range: 0.0,
            emission_latitude: 0.0,
            velocity: 0.0,
            velocity_range: 0.0,
            x_acceleration: 0.0,
            y_acceleration: 0.0,
            color: default_cell_color(),
            scale: 1.0,
            scale_range: 0.0,
            scale_speed: 0.0,
            alpha_range: 0.0,
            alpha_speed: 0.0,
            spin: 0.0,
            spin_range: 0.0,
        }
    }

    fn validate(&self) -> CaResult<()> {
        let fields = [
            ("birthRate", self.birth_rate),
            ("lifetime", self.lifetime),
            ("lifetimeRange", self.lifetime_range),
            ("emissionLongitude", self.emission_longitude),
            ("emissionRange", self.emission_range),
            ("emissionLatitude", self.emission_latitude),
            ("velocity", self.velocity),
            ("velocityRange", self.velocity_range),
            ("xAcceleration", self.x_acceleration),
            ("yAcceleration", self.y_acceleration),
            ("scale", self.scale),
            ("scaleRange", self.scale_range),
            ("scaleSpeed", self.scale_speed),
            ("alphaRange", self.alpha_range),
            ("alphaSpeed", self.alpha_speed),
            ("spin", self.spin),
            ("spinRange", self.spin_range),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(CaError::validation(format!(
                    "emitter cell '{}' {name} must be finite",
                    self.id
                )));
            }
        }
        if self.birth_rate < 0.0 {
            return Err(CaError::validation(format!(
                "emitter cell '{}' birthRate must be >= 0",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
