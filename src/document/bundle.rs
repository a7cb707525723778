//! Single-root bundle exchange format.
//!
//! A bundle wraps the whole scene in one `root` layer:
//! `{project: {name, width, height}, root, states?, stateOverrides?, stateTransitions?,
//! wallpaperParallaxGroups?}`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::model::{
    DEFAULT_BACKGROUND, LayerDoc, ParallaxGroup, ProjectDocument, ProjectMeta,
};
use crate::foundation::core::{SizeDef, Vec2Def};
use crate::foundation::error::CaResult;
use crate::foundation::ids::IdGen;
use crate::layers::model::{Layer, LayerKind};
use crate::layers::tree::ROOT_SENTINEL;
use crate::states::model::{StateOverride, StateSet, StateTransition, is_base_state_name};

/// Name given to bundles without one.
pub const IMPORTED_PROJECT_NAME: &str = "Imported Project";

/// States a fresh project starts with in the editor app.
pub const APP_DEFAULT_STATES: [&str; 3] = ["Locked", "Unlock", "Sleep"];

/// `project` header of a bundle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleProject {
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// Canvas width; `0` or absent means "use the root's width".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Canvas height; `0` or absent means "use the root's height".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Bundle document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Header.
    #[serde(default)]
    pub project: BundleProject,
    /// Scene root; `null` for an empty scene.
    #[serde(default)]
    pub root: Option<Layer>,
    /// User state names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    /// Overrides keyed by state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_overrides: Option<BTreeMap<String, Vec<StateOverride>>>,
    /// Transitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_transitions: Option<Vec<StateTransition>>,
    /// Gyroscope parallax bindings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wallpaper_parallax_groups: Vec<ParallaxGroup>,
}

impl Bundle {
    /// Parse a bundle from JSON text.
    pub fn from_json_str(json: &str) -> CaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Import knobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOpts {
    /// States used when the bundle declares no user state.
    pub fallback_states: Vec<String>,
}

impl ImportOpts {
    /// Options that seed [`APP_DEFAULT_STATES`] into bundles without states.
    pub fn with_app_defaults() -> Self {
        Self {
            fallback_states: APP_DEFAULT_STATES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

fn dimension(declared: Option<f64>, from_root: f64) -> f64 {
    let v = declared
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(from_root);
    v.round()
}

/// Turn a bundle into a project document with a fresh project id.
///
/// A container root (`basic`/`group` or `transform`) with children is replaced by its
/// children; any other root becomes the only layer, and a missing root gives an empty tree.
/// Base-state spellings in `states` are dropped.
#[tracing::instrument(skip_all, fields(name = %bundle.project.name))]
pub fn import_bundle(bundle: Bundle, opts: &ImportOpts, ids: &mut IdGen) -> CaResult<ProjectDocument> {
    let Bundle {
        project,
        root,
        states,
        state_overrides,
        state_transitions,
        wallpaper_parallax_groups,
    } = bundle;

    let name = if project.name.trim().is_empty() {
        IMPORTED_PROJECT_NAME.to_owned()
    } else {
        project.name
    };
    let mut meta = ProjectMeta::new(
        ids.next_id(),
        name,
        dimension(project.width, root.as_ref().map_or(0.0, |r| r.size.w)),
        dimension(project.height, root.as_ref().map_or(0.0, |r| r.size.h)),
    );
    meta.background = Some(
        root.as_ref()
            .and_then(|r| r.background_color.clone())
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_owned()),
    );

    let layers = match root {
        None => Vec::new(),
        Some(root) => root_layers(root, ids),
    };
    for group in &wallpaper_parallax_groups {
        if !any_named(&layers, &group.layer_name) {
            tracing::debug!(layer = %group.layer_name, "parallax group names no layer");
        }
    }

    let mut user_states: Vec<String> = states
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !is_base_state_name(s))
        .collect();
    if user_states.is_empty() {
        user_states = opts.fallback_states.clone();
    }

    let floating = LayerDoc {
        layers,
        selected_id: None,
        states: StateSet {
            states: user_states,
            state_overrides: state_overrides.unwrap_or_default(),
            state_transitions: state_transitions.unwrap_or_default(),
        },
    };
    tracing::debug!(layers = floating.layer_count(), "imported bundle");
    let doc = ProjectDocument {
        meta,
        floating,
        background_layers: None,
        wallpaper_parallax_groups,
    };
    doc.validate()?;
    Ok(doc)
}

fn any_named(layers: &[Arc<Layer>], name: &str) -> bool {
    layers
        .iter()
        .any(|l| l.name == name || any_named(&l.children, name))
}

fn root_layers(mut root: Layer, ids: &mut IdGen) -> Vec<Arc<Layer>> {
    let container = matches!(root.kind, LayerKind::Basic | LayerKind::Transform);
    if container && !root.children.is_empty() {
        return std::mem::take(&mut root.children);
    }
    if root.id() == ROOT_SENTINEL {
        root.set_id(ids.next_id());
    }
    vec![Arc::new(root)]
}

/// Wrap the floating tree of `doc` into a bundle.
///
/// The root is a `basic` layer sized to the canvas, centered on it, and filled with the
/// project background.
pub fn export_bundle(doc: &ProjectDocument) -> Bundle {
    let meta = &doc.meta;
    let mut root = Layer::new(ROOT_SENTINEL, meta.name.clone(), LayerKind::Basic).with_frame(
        Vec2Def::new(meta.width / 2.0, meta.height / 2.0),
        SizeDef::new(meta.width, meta.height),
    );
    root.background_color = Some(meta.background_or_default().to_owned());
    root.geometry_flipped = meta.geometry_flipped;
    root.children = doc.floating.layers.clone();

    let states = &doc.floating.states;
    Bundle {
        project: BundleProject {
            name: meta.name.clone(),
            width: Some(meta.width),
            height: Some(meta.height),
        },
        root: Some(root),
        states: Some(states.states.clone()),
        state_overrides: (!states.state_overrides.is_empty())
            .then(|| states.state_overrides.clone()),
        state_transitions: (!states.state_transitions.is_empty())
            .then(|| states.state_transitions.clone()),
        wallpaper_parallax_groups: doc.wallpaper_parallax_groups.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/bundle.rs"]
mod tests;
