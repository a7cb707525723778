#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! caforge is a Core Animation style document core.
//!
//! A project is a tree of typed [`layers::model::Layer`]s plus named states whose overrides
//! project onto that tree ([`states`]). Layers can carry keyframe tracks ([`animation`]) and
//! emitter layers can be realized into a deterministic particle simulator ([`emitter`]).
//! [`document`] ties these together into persisted projects and an undoable editing session.
//!
//! Tree operations are persistent: every mutation returns a new root list and untouched
//! subtrees stay shared (`Arc::ptr_eq` detects what changed).

mod assets;
mod foundation;

pub mod animation;
pub mod document;
pub mod emitter;
pub mod layers;
pub mod states;

pub use assets::color::ColorDef;
pub use assets::store::{CellAsset, CellAssetMap, Sprite, resolve_sprite};
pub use foundation::core::{Affine, FlagDef, Point, Rect, SizeDef, Vec2, Vec2Def};
pub use foundation::error::{CaError, CaResult};
pub use foundation::ids::IdGen;
pub use foundation::rng::{RandomSource, Rng64};

pub use document::editor::{Editor, EditorOpts, RootKey};
pub use document::model::{LayerDoc, ParallaxGroup, ProjectDocument, ProjectMeta};
pub use emitter::sim::{EmitterSim, RealizeOpts, ShapePolicy};
pub use layers::model::{Layer, LayerKind};
pub use states::model::{BASE_STATE, StateSet};
