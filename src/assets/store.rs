use std::collections::BTreeMap;
use std::sync::Arc;

/// One resolved image entry supplied by the rendering collaborator for an emitter cell.
///
/// The core never decodes `data_url`; it is carried through to the drawing surface as an opaque
/// handle. Pixel dimensions, when the collaborator knows them, drive particle sizing.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellAsset {
    /// Opaque drawable handle (typically a data URL).
    #[serde(rename = "dataURL", default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    /// Natural width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Natural height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Lookup from emitter cell id to its resolved image.
pub type CellAssetMap = BTreeMap<String, CellAsset>;

/// Drawable sprite attached to an emitter cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Opaque handle handed back to the drawing surface.
    pub handle: String,
    /// Natural width in pixels, if known.
    pub width: Option<f64>,
    /// Natural height in pixels, if known.
    pub height: Option<f64>,
}

impl Sprite {
    /// Width over height; unknown or zero dimensions count as 1.
    pub fn aspect_ratio(&self) -> f64 {
        let w = positive_or_one(self.width);
        let h = positive_or_one(self.height);
        w / h
    }

    /// Base particle size for this sprite: its width, never below 12, 16 when unknown.
    pub fn base_size(&self) -> f64 {
        match self.width {
            Some(w) if w.is_finite() && w > 0.0 => w.max(12.0),
            _ => 16.0,
        }
    }
}

fn positive_or_one(v: Option<f64>) -> f64 {
    match v {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 1.0,
    }
}

/// Resolve the sprite for `cell_id`, if the map carries a drawable for it.
pub fn resolve_sprite(assets: &CellAssetMap, cell_id: &str) -> Option<Arc<Sprite>> {
    let entry = assets.get(cell_id)?;
    let handle = entry.data_url.as_ref().filter(|s| !s.is_empty())?;
    Some(Arc::new(Sprite {
        handle: handle.clone(),
        width: entry.width,
        height: entry.height,
    }))
}
