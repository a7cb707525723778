//! Editor state over a project document.
//!
//! Every structural change goes through [`crate::layers::tree`]; the editor only decides which
//! root and state an edit applies to and records history snapshots. Snapshots are cheap because
//! untouched subtrees are shared between them.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::edit;
use crate::assets::store::CellAssetMap;
use crate::document::model::{LayerDoc, ParallaxGroup, ProjectDocument, ProjectMeta};
use crate::emitter::sim::{EmitterSim, RealizeOpts};
use crate::foundation::core::{SizeDef, Vec2Def};
use crate::foundation::error::{CaError, CaResult};
use crate::foundation::ids::IdGen;
use crate::layers::model::{
    EmitterCellDef, EmitterProps, GradientColor, GradientProps, ImageProps, Layer, LayerKind,
    ShapeKind, ShapeProps, TextProps, VideoProps,
};
use crate::layers::tree;
use crate::states::model::{BASE_STATE, OverrideValue, StateOverride, is_base_state_name};
use crate::states::project::apply_override;

/// Editor knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOpts {
    /// Undo depth; `0` disables history.
    pub history_limit: usize,
    /// Seed for layer ids; `None` seeds from the clock.
    pub id_seed: Option<u64>,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            history_limit: 100,
            id_seed: None,
        }
    }
}

/// Which of the two trees edits apply to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKey {
    /// Foreground tree.
    #[default]
    Floating,
    /// Background tree.
    Background,
}

#[derive(Clone, Debug)]
struct Snapshot {
    meta: ProjectMeta,
    floating: LayerDoc,
    background: LayerDoc,
    parallax: Vec<ParallaxGroup>,
}

/// Mutable editing session over one project.
#[derive(Clone, Debug)]
pub struct Editor {
    meta: ProjectMeta,
    floating: LayerDoc,
    background: LayerDoc,
    parallax: Vec<ParallaxGroup>,
    active_root: RootKey,
    active_state: String,
    ids: IdGen,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    history_limit: usize,
}

impl Editor {
    /// Empty session for a new project.
    pub fn new(meta: ProjectMeta, opts: &EditorOpts) -> Self {
        Self::from_document(ProjectDocument::new(meta), opts)
    }

    /// Session over a loaded document.
    pub fn from_document(doc: ProjectDocument, opts: &EditorOpts) -> Self {
        let ids = match opts.id_seed {
            Some(seed) => IdGen::new(seed),
            None => IdGen::from_entropy(),
        };
        Self {
            meta: doc.meta,
            floating: doc.floating,
            background: doc.background_layers.unwrap_or_default(),
            parallax: doc.wallpaper_parallax_groups,
            active_root: RootKey::Floating,
            active_state: BASE_STATE.to_owned(),
            ids,
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit: opts.history_limit,
        }
    }

    /// Current content as a persistable document.
    ///
    /// An empty background tree is omitted.
    pub fn to_document(&self) -> ProjectDocument {
        let background = (!self.background.layers.is_empty() || !self.background.states.is_empty())
            .then(|| self.background.clone());
        ProjectDocument {
            meta: self.meta.clone(),
            floating: self.floating.clone(),
            background_layers: background,
            wallpaper_parallax_groups: self.parallax.clone(),
        }
    }

    /// Project metadata.
    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    /// Edit metadata as one undoable step.
    pub fn update_meta<F: FnOnce(&mut ProjectMeta)>(&mut self, patch: F) {
        let before = self.snapshot();
        patch(&mut self.meta);
        if self.meta != before.meta {
            self.record(before);
        }
    }

    /// Tree that edits currently apply to.
    pub fn active_root(&self) -> RootKey {
        self.active_root
    }

    /// Switch the tree edits apply to. The active state falls back to the base state when the
    /// new tree does not define it.
    pub fn set_active_root(&mut self, root: RootKey) {
        self.active_root = root;
        self.reset_unknown_state();
    }

    fn reset_unknown_state(&mut self) {
        if !self.is_base_state() && !self.active_doc().states.has_state(&self.active_state) {
            self.active_state = BASE_STATE.to_owned();
        }
    }

    /// Gyroscope parallax bindings.
    pub fn parallax_groups(&self) -> &[ParallaxGroup] {
        &self.parallax
    }

    /// Replace the parallax bindings as one undoable step.
    pub fn set_parallax_groups(&mut self, groups: Vec<ParallaxGroup>) {
        if groups == self.parallax {
            return;
        }
        let before = self.snapshot();
        self.parallax = groups;
        self.record(before);
    }

    /// One of the two trees.
    pub fn doc(&self, root: RootKey) -> &LayerDoc {
        match root {
            RootKey::Floating => &self.floating,
            RootKey::Background => &self.background,
        }
    }

    /// The active tree.
    pub fn active_doc(&self) -> &LayerDoc {
        self.doc(self.active_root)
    }

    fn active_doc_mut(&mut self) -> &mut LayerDoc {
        match self.active_root {
            RootKey::Floating => &mut self.floating,
            RootKey::Background => &mut self.background,
        }
    }

    /// Root layers of the active tree (base data).
    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.active_doc().layers
    }

    /// Base-data layer by id in the active tree.
    pub fn layer(&self, id: &str) -> Option<&Arc<Layer>> {
        tree::find_by_id(self.layers(), id)
    }

    /// Selected id of the active tree.
    pub fn selected_id(&self) -> Option<&str> {
        self.active_doc().selected_id.as_deref()
    }

    /// Change the selection. Not recorded in history.
    pub fn select(&mut self, id: Option<&str>) {
        self.active_doc_mut().selected_id = id.map(str::to_owned);
    }

    /// Name of the state being edited.
    pub fn active_state(&self) -> &str {
        &self.active_state
    }

    /// Whether edits go to the base data.
    pub fn is_base_state(&self) -> bool {
        is_base_state_name(&self.active_state)
    }

    /// Switch to `state` (the base state or a user state of the active tree).
    pub fn set_active_state(&mut self, state: &str) -> CaResult<()> {
        if is_base_state_name(state) {
            self.active_state = BASE_STATE.to_owned();
            return Ok(());
        }
        if !self.active_doc().states.has_state(state) {
            return Err(CaError::validation(format!("unknown state '{state}'")));
        }
        self.active_state = state.to_owned();
        Ok(())
    }

    /// Active tree as displayed in the active state.
    pub fn resolved_layers(&self) -> Vec<Arc<Layer>> {
        let doc = self.active_doc();
        doc.states.resolve(&doc.layers, &self.active_state)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            meta: self.meta.clone(),
            floating: self.floating.clone(),
            background: self.background.clone(),
            parallax: self.parallax.clone(),
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.meta = snap.meta;
        self.floating = snap.floating;
        self.background = snap.background;
        self.parallax = snap.parallax;
        self.reset_unknown_state();
    }

    fn record(&mut self, before: Snapshot) {
        self.redo.clear();
        self.push_undo(before);
    }

    fn push_undo(&mut self, snap: Snapshot) {
        if self.history_limit == 0 {
            return;
        }
        while self.undo.len() >= self.history_limit {
            self.undo.pop_front();
        }
        self.undo.push_back(snap);
    }

    // Run `f` on the active tree; records history when it reports a change.
    fn edit_active<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut LayerDoc) -> (bool, T),
    {
        let before = self.snapshot();
        let (changed, out) = f(self.active_doc_mut());
        if changed {
            self.record(before);
        }
        out
    }

    /// Revert the last recorded edit.
    pub fn undo(&mut self) -> bool {
        let Some(snap) = self.undo.pop_back() else {
            return false;
        };
        let current = self.snapshot();
        self.redo.push(current);
        self.restore(snap);
        true
    }

    /// Re-apply the last undone edit.
    pub fn redo(&mut self) -> bool {
        let Some(snap) = self.redo.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.push_undo(current);
        self.restore(snap);
        true
    }

    /// Whether [`Editor::undo`] would do something.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`Editor::redo`] would do something.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    fn id_taken(&self, id: &str) -> bool {
        tree::contains_id(&self.floating.layers, id)
            || tree::contains_id(&self.background.layers, id)
    }

    // Ids are unique across both trees; a collision with a loaded document just draws again.
    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.id_taken(&id) {
                return id;
            }
        }
    }

    fn canvas_center(&self) -> Vec2Def {
        Vec2Def::new(self.meta.width / 2.0, self.meta.height / 2.0)
    }

    /// Insert a layer of `kind` with a generated name into the selected layer (or at the root)
    /// and select it. Returns the new id.
    pub fn add_layer(&mut self, kind: LayerKind, size: SizeDef) -> String {
        let layer = self.build_layer(kind, size);
        self.insert_layer(layer)
    }

    fn build_layer(&mut self, kind: LayerKind, size: SizeDef) -> Layer {
        let id = self.fresh_id();
        let name = tree::next_layer_name(self.layers(), kind.name_base());
        Layer::new(id, name, kind).with_frame(self.canvas_center(), size)
    }

    fn insert_layer(&mut self, layer: Layer) -> String {
        let id = layer.id().to_owned();
        self.edit_active(|doc| {
            doc.layers = tree::insert_into_selected(&doc.layers, doc.selected_id.as_deref(), layer);
            doc.selected_id = Some(id.clone());
            (true, ())
        });
        id
    }

    /// Add a plain rectangle layer.
    pub fn add_basic_layer(&mut self) -> String {
        self.add_layer(LayerKind::Basic, SizeDef::new(120.0, 120.0))
    }

    /// Add a text layer showing `text`.
    pub fn add_text_layer(&mut self, text: impl Into<String>) -> String {
        let props = TextProps {
            text: text.into(),
            font_size: Some(16.0),
            color: Some("#111827".to_owned()),
            ..TextProps::default()
        };
        self.add_layer(LayerKind::Text(props), SizeDef::new(200.0, 40.0))
    }

    /// Add a vector shape layer.
    pub fn add_shape_layer(&mut self, shape: ShapeKind) -> String {
        let props = ShapeProps {
            shape,
            fill: Some("#3b82f6".to_owned()),
            radius: matches!(shape, ShapeKind::RoundedRect).then_some(12.0),
            ..ShapeProps::default()
        };
        self.add_layer(LayerKind::Shape(props), SizeDef::new(120.0, 120.0))
    }

    /// Add an image layer at the image's natural size.
    pub fn add_image_layer(&mut self, src: impl Into<String>, size: SizeDef) -> String {
        let props = ImageProps {
            src: src.into(),
            fit: None,
        };
        self.add_layer(LayerKind::Image(props), size)
    }

    /// Add a frame-sequence video layer.
    pub fn add_video_layer(&mut self, props: VideoProps, size: SizeDef) -> CaResult<String> {
        let layer = self.build_layer(LayerKind::Video(props), size);
        layer.validate()?;
        Ok(self.insert_layer(layer))
    }

    /// Add a two-stop gradient layer.
    pub fn add_gradient_layer(&mut self) -> String {
        let stop = |color: &str| GradientColor {
            color: color.to_owned(),
            opacity: 1.0,
        };
        let props = GradientProps {
            colors: vec![stop("#3b82f6"), stop("#9333ea")],
            ..GradientProps::default()
        };
        self.add_layer(LayerKind::Gradient(props), SizeDef::new(200.0, 200.0))
    }

    /// Add an emitter layer with one cell.
    pub fn add_emitter_layer(&mut self) -> String {
        let size = SizeDef::new(100.0, 100.0);
        let mut cell = EmitterCellDef::new(self.fresh_id());
        cell.birth_rate = 10.0;
        cell.lifetime = 5.0;
        cell.velocity = 100.0;
        cell.emission_range = 360.0;
        let props = EmitterProps {
            emitter_position: Vec2Def::new(size.w / 2.0, size.h / 2.0),
            emitter_cells: vec![cell],
            ..EmitterProps::default()
        };
        self.add_layer(LayerKind::Emitter(props), size)
    }

    /// Add a transform (grouping) layer.
    pub fn add_transform_layer(&mut self) -> String {
        self.add_layer(LayerKind::Transform, SizeDef::new(100.0, 100.0))
    }

    /// Deep copy `id` with fresh ids right after the original, and select the copy.
    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        let source = Arc::clone(self.layer(id)?);
        // Every id of the copy is checked, not just the root's.
        let mut copy = tree::clone_layer_deep(&source, &mut self.ids);
        while tree::collect_ids(&copy).iter().any(|c| self.id_taken(c)) {
            copy = tree::clone_layer_deep(&source, &mut self.ids);
        }
        let copy_id = copy.id().to_owned();
        let target = id.to_owned();
        let inserted = self.edit_active(|doc| {
            let (ok, layers) = tree::insert_after_in_tree(&doc.layers, &target, Arc::new(copy));
            if ok {
                doc.layers = layers;
                doc.selected_id = Some(copy_id.clone());
            }
            (ok, ok)
        });
        inserted.then_some(copy_id)
    }

    /// Delete `id` and its subtree. Overrides and transitions naming them are kept, so undo
    /// restores a layer with its state bindings intact.
    pub fn delete(&mut self, id: &str) -> bool {
        self.edit_active(|doc| {
            let (removed, layers) = tree::remove_from_tree(&doc.layers, id);
            let Some(removed) = removed else {
                return (false, false);
            };
            doc.layers = layers;
            clear_selection_inside(doc, &removed);
            (true, true)
        })
    }

    /// Delete `id` and its subtree and drop every override and transition element that
    /// targets a removed layer.
    pub fn delete_layer_cascade(&mut self, id: &str) -> bool {
        self.edit_active(|doc| {
            let (removed, layers) = tree::remove_from_tree(&doc.layers, id);
            let Some(removed) = removed else {
                return (false, false);
            };
            doc.layers = layers;
            let gone: HashSet<String> = tree::collect_ids(&removed).into_iter().collect();
            doc.states.prune_targets(&gone);
            clear_selection_inside(doc, &removed);
            (true, true)
        })
    }

    /// Move `id` before `target` among `target`'s siblings.
    pub fn move_before(&mut self, id: &str, target: &str) -> bool {
        self.edit_active(|doc| {
            let (ok, layers) = tree::move_before(&doc.layers, id, target);
            if ok {
                doc.layers = layers;
            }
            (ok, ok)
        })
    }

    /// Make `id` the last child of `parent`, or a root when `parent` is `None`.
    pub fn reparent(&mut self, id: &str, parent: Option<&str>) -> bool {
        self.edit_active(|doc| {
            let (ok, layers) = tree::reparent(&doc.layers, id, parent);
            if ok {
                doc.layers = layers;
            }
            (ok, ok)
        })
    }

    /// Patch the base data of `id`. The patched layer must still validate.
    pub fn update_layer<F: FnOnce(&mut Layer)>(&mut self, id: &str, patch: F) -> CaResult<bool> {
        let Some(current) = self.layer(id) else {
            return Ok(false);
        };
        let mut next = (**current).clone();
        patch(&mut next);
        next.validate()?;
        if next == **current {
            return Ok(true);
        }
        self.edit_active(|doc| {
            doc.layers = tree::update_in_tree(&doc.layers, id, move |layer| *layer = next);
            (true, ())
        });
        Ok(true)
    }

    /// Write one property of `id` in the active state.
    ///
    /// In the base state this edits the layer itself; in a user state it inserts or replaces
    /// the override. Returns `false` when the layer is missing or the key path does not fit it.
    pub fn set_state_value(
        &mut self,
        id: &str,
        key_path: &str,
        value: impl Into<OverrideValue>,
    ) -> CaResult<bool> {
        let Some(current) = self.layer(id) else {
            return Ok(false);
        };
        let ov = StateOverride::new(id, key_path, value);
        if self.is_base_state() {
            let Some(patched) = apply_override(current, &ov) else {
                return Ok(false);
            };
            return self.update_layer(id, move |layer| *layer = patched);
        }
        if apply_override(current, &ov).is_none() {
            return Ok(false);
        }
        let state = self.active_state.clone();
        self.edit_active(|doc| match doc.states.set_override(&state, ov) {
            Ok(()) => (true, Ok(true)),
            Err(e) => (false, Err(e)),
        })
    }

    /// Turn the keyframe track of `id` on or off.
    ///
    /// Tracks live on base data only, and video layers animate through their frames instead.
    pub fn set_animation_enabled(&mut self, id: &str, enabled: bool) -> CaResult<bool> {
        let Some(current) = self.layer(id) else {
            return Ok(false);
        };
        if matches!(current.kind, LayerKind::Video(_)) {
            return Err(CaError::validation("video layers cannot carry keyframe animations"));
        }
        if !self.is_base_state() {
            return Err(CaError::validation(format!(
                "animations can only be edited in the base state, not '{}'",
                self.active_state
            )));
        }
        self.update_layer(id, move |layer| {
            let anim = edit::set_enabled(layer.animations.as_ref(), layer, enabled);
            layer.animations = Some(anim);
        })
    }

    /// Add a user state to the active tree.
    pub fn add_state(&mut self, name: &str) -> CaResult<()> {
        self.edit_active(|doc| match doc.states.add_state(name) {
            Ok(()) => (true, Ok(())),
            Err(e) => (false, Err(e)),
        })
    }

    /// Rename a user state; the active state follows the rename.
    pub fn rename_state(&mut self, from: &str, to: &str) -> CaResult<()> {
        self.edit_active(|doc| match doc.states.rename_state(from, to) {
            Ok(()) => (from != to, Ok(())),
            Err(e) => (false, Err(e)),
        })?;
        if self.active_state == from {
            self.active_state = to.to_owned();
        }
        Ok(())
    }

    /// Remove a user state; editing falls back to the base state if it was active.
    pub fn remove_state(&mut self, name: &str) -> bool {
        let removed = self.edit_active(|doc| {
            let removed = doc.states.remove_state(name);
            (removed, removed)
        });
        if removed && self.active_state == name {
            self.active_state = BASE_STATE.to_owned();
        }
        removed
    }

    /// Simulator for emitter `id` as it appears in the active state.
    ///
    /// `Ok(None)` when no layer has that id.
    pub fn realize_emitter(
        &self,
        id: &str,
        assets: &CellAssetMap,
        opts: &RealizeOpts,
    ) -> CaResult<Option<EmitterSim>> {
        let resolved = self.resolved_layers();
        let Some(layer) = tree::find_by_id(&resolved, id) else {
            return Ok(None);
        };
        EmitterSim::realize(layer, assets, opts).map(Some)
    }
}

fn clear_selection_inside(doc: &mut LayerDoc, removed: &Layer) {
    if let Some(sel) = doc.selected_id.as_deref()
        && (sel == removed.id() || tree::contains_id(&removed.children, sel))
    {
        doc.selected_id = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/editor.rs"]
mod tests;
