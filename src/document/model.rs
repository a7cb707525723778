use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::animation::keyframes::KeyPath;
use crate::foundation::core::FlagDef;
use crate::foundation::error::{CaError, CaResult};
use crate::layers::model::Layer;
use crate::layers::tree::{collect_ids, contains_id, count_layers, validate_tree};
use crate::states::model::{StateSet, is_base_state_name};

/// Canvas fill used when a document declares none.
pub const DEFAULT_BACKGROUND: &str = "#e5e7eb";

/// Project metadata shared by every root of a document.
///
/// Keys this type does not know about are kept in `extra` and written back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Project id.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Canvas width in points.
    #[serde(default)]
    pub width: f64,
    /// Canvas height in points.
    #[serde(default)]
    pub height: f64,
    /// Canvas background color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Top-left origin for the whole canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_flipped: Option<FlagDef>,
    /// Gyroscope parallax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro_enabled: Option<bool>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProjectMeta {
    /// Metadata for a new project of the given canvas size.
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            background: Some(DEFAULT_BACKGROUND.to_owned()),
            geometry_flipped: None,
            gyro_enabled: None,
            extra: BTreeMap::new(),
        }
    }

    /// Background color, falling back to [`DEFAULT_BACKGROUND`].
    pub fn background_or_default(&self) -> &str {
        self.background.as_deref().unwrap_or(DEFAULT_BACKGROUND)
    }

    fn validate(&self) -> CaResult<()> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if !v.is_finite() || v < 0.0 {
                return Err(CaError::validation(format!(
                    "project {name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Device tilt axis driving a parallax group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallaxAxis {
    /// Left/right tilt.
    #[default]
    X,
    /// Forward/back tilt.
    Y,
}

/// Gyroscope parallax binding: tilting along `axis` maps onto `key_path` of the layer named
/// `layer_name`, spanning `map_min_to..=map_max_to`.
///
/// Bindings address layers by name, so they survive id changes on import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallaxGroup {
    /// Tilt axis.
    #[serde(default)]
    pub axis: ParallaxAxis,
    /// Unused image slot, kept for the wallpaper format.
    #[serde(default)]
    pub image: Option<String>,
    /// Driven property.
    #[serde(default)]
    pub key_path: KeyPath,
    /// Display name of the driven layer.
    #[serde(default)]
    pub layer_name: String,
    /// Value at full tilt in the negative direction.
    #[serde(default)]
    pub map_min_to: f64,
    /// Value at full tilt in the positive direction.
    #[serde(default)]
    pub map_max_to: f64,
    /// Label.
    #[serde(default)]
    pub title: String,
    /// View the group belongs to.
    #[serde(default)]
    pub view: String,
}

impl ParallaxGroup {
    fn validate(&self) -> CaResult<()> {
        if !self.map_min_to.is_finite() || !self.map_max_to.is_finite() {
            return Err(CaError::validation(format!(
                "parallax group '{}' has a non-finite range",
                self.title
            )));
        }
        Ok(())
    }
}

/// One layer tree with its selection and states.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDoc {
    /// Root layers in z-order.
    #[serde(default)]
    pub layers: Vec<Arc<Layer>>,
    /// Selected layer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
    /// User states, overrides, and transitions.
    #[serde(flatten)]
    pub states: StateSet,
}

impl LayerDoc {
    /// A doc over `layers` with nothing selected and no states.
    pub fn new(layers: Vec<Arc<Layer>>) -> Self {
        Self {
            layers,
            ..Self::default()
        }
    }

    /// Check node data, id uniqueness, and state names.
    ///
    /// A selection pointing at a missing layer and overrides targeting missing layers are
    /// tolerated.
    pub fn validate(&self) -> CaResult<()> {
        validate_tree(&self.layers)?;
        if let Some(name) = self.states.states.iter().find(|s| is_base_state_name(s)) {
            return Err(CaError::validation(format!(
                "'{name}' is reserved for the base state"
            )));
        }
        Ok(())
    }

    /// Selected id if it still names a layer in this doc.
    pub fn live_selection(&self) -> Option<&str> {
        self.selected_id
            .as_deref()
            .filter(|id| contains_id(&self.layers, id))
    }

    /// Total node count.
    pub fn layer_count(&self) -> usize {
        count_layers(&self.layers)
    }
}

/// Persisted project: metadata, the floating tree, and an optional background tree.
///
/// On the wire the floating tree's fields sit at the top level next to `meta`
/// (`{meta, layers, selectedId, states, stateOverrides, stateTransitions}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Project metadata.
    pub meta: ProjectMeta,
    /// Floating (foreground) tree.
    #[serde(flatten)]
    pub floating: LayerDoc,
    /// Background tree, when the project has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_layers: Option<LayerDoc>,
    /// Gyroscope parallax bindings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wallpaper_parallax_groups: Vec<ParallaxGroup>,
}

impl ProjectDocument {
    /// Empty document.
    pub fn new(meta: ProjectMeta) -> Self {
        Self {
            meta,
            floating: LayerDoc::default(),
            background_layers: None,
            wallpaper_parallax_groups: Vec::new(),
        }
    }

    /// Parse a document from JSON text.
    #[tracing::instrument(skip(json), fields(bytes = json.len()))]
    pub fn from_json_str(json: &str) -> CaResult<Self> {
        let doc: Self = serde_json::from_str(json)
            .map_err(|e| CaError::serde(format!("parse project JSON: {e}")))?;
        tracing::debug!(
            layers = doc.floating.layer_count(),
            states = doc.floating.states.states.len(),
            "loaded project"
        );
        Ok(doc)
    }

    /// Parse a document from a JSON reader.
    #[tracing::instrument(skip(r))]
    pub fn from_reader<R: std::io::Read>(r: R) -> CaResult<Self> {
        let doc: Self = serde_json::from_reader(r)
            .map_err(|e| CaError::serde(format!("parse project JSON: {e}")))?;
        tracing::debug!(layers = doc.floating.layer_count(), "loaded project");
        Ok(doc)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> CaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate metadata and both trees. Layer ids must be unique across the two trees.
    pub fn validate(&self) -> CaResult<()> {
        self.meta.validate()?;
        self.floating.validate()?;
        if let Some(bg) = &self.background_layers {
            bg.validate()?;
            if let Some(id) = bg
                .layers
                .iter()
                .flat_map(|l| collect_ids(l))
                .find(|id| contains_id(&self.floating.layers, id))
            {
                return Err(CaError::duplicate_id(id));
            }
        }
        for group in &self.wallpaper_parallax_groups {
            group.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
