//! Projection of a state's overrides onto the base tree.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::layers::model::Layer;
use crate::states::model::{OverrideValue, StateOverride, StateSet};

/// Map CA key paths onto the document's property paths.
pub fn canonical_key_path(key_path: &str) -> &str {
    match key_path {
        "transform.rotation.z" | "transform.rotation" => "rotation",
        "transform.rotation.x" => "rotationX",
        "transform.rotation.y" => "rotationY",
        "bounds.size.width" => "size.w",
        "bounds.size.height" => "size.h",
        other => other,
    }
}

impl StateSet {
    /// Display tree for `state`.
    ///
    /// Base data is never mutated. Layers without an applicable override keep their `Arc`, and
    /// overrides that cannot be applied are skipped.
    pub fn resolve(&self, layers: &[Arc<Layer>], state: &str) -> Vec<Arc<Layer>> {
        let overrides = self.overrides_for(state);
        if overrides.is_empty() {
            return layers.to_vec();
        }
        let mut by_target: HashMap<&str, Vec<&StateOverride>> = HashMap::new();
        for ov in overrides {
            by_target.entry(ov.target_id.as_str()).or_default().push(ov);
        }
        resolve_rec(layers, &by_target).unwrap_or_else(|| layers.to_vec())
    }
}

fn resolve_rec(
    layers: &[Arc<Layer>],
    by_target: &HashMap<&str, Vec<&StateOverride>>,
) -> Option<Vec<Arc<Layer>>> {
    let mut out: Option<Vec<Arc<Layer>>> = None;
    for (i, layer) in layers.iter().enumerate() {
        let children = resolve_rec(&layer.children, by_target);
        let own = by_target.get(layer.id());
        if children.is_none() && own.is_none() {
            continue;
        }

        let mut next = (**layer).clone();
        if let Some(ovs) = own {
            for ov in ovs {
                if let Some(patched) = apply_override(&next, ov) {
                    next = patched;
                }
            }
        }
        if let Some(children) = children {
            next.children = children;
        }
        out.get_or_insert_with(|| layers.to_vec())[i] = Arc::new(next);
    }
    out
}

/// `layer` with one override applied, or `None` when it does not fit the layer.
pub fn apply_override(layer: &Layer, ov: &StateOverride) -> Option<Layer> {
    let path = canonical_key_path(&ov.key_path);
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) || matches!(segments[0], "id" | "children") {
        tracing::debug!(target_id = %ov.target_id, key_path = %ov.key_path, "override key path not writable");
        return None;
    }

    let mut shell = layer.clone();
    shell.children = Vec::new();
    let mut value = match serde_json::to_value(&shell) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(target_id = %ov.target_id, error = %err, "layer not serializable for override");
            return None;
        }
    };

    let slot = slot_mut(&mut value, &segments)?;
    let written = coerce(&ov.value, slot)?;
    *slot = written.clone();

    match serde_json::from_value::<Layer>(value) {
        // Unknown keys are dropped on deserialize, so the path must read back what was written.
        Ok(patched) if !reads_back(&patched, path, &written) => {
            tracing::debug!(
                target_id = %ov.target_id,
                key_path = %ov.key_path,
                "override is inert: no such property on the layer"
            );
            None
        }
        Ok(mut patched) => {
            patched.children = layer.children.clone();
            Some(patched)
        }
        Err(err) => {
            tracing::debug!(
                target_id = %ov.target_id,
                key_path = %ov.key_path,
                error = %err,
                "override is inert: value does not fit the property"
            );
            None
        }
    }
}

// Intermediate objects are created for unset optional groups such as `anchorPoint.x`.
fn slot_mut<'a>(root: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    let mut cur = root;
    for seg in segments {
        if cur.is_null() {
            *cur = Value::Object(Map::new());
        }
        cur = cur.as_object_mut()?.entry((*seg).to_owned()).or_insert(Value::Null);
    }
    Some(cur)
}

// Numeric strings become numbers unless the property currently holds a string.
fn coerce(v: &OverrideValue, current: &Value) -> Option<Value> {
    match v {
        OverrideValue::Number(n) => number(*n),
        OverrideValue::Text(s) if !current.is_string() => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => number(n),
            _ => Some(Value::String(s.clone())),
        },
        OverrideValue::Text(s) => Some(Value::String(s.clone())),
    }
}

fn reads_back(layer: &Layer, path: &str, written: &Value) -> bool {
    let Some(read) = read_property(layer, path) else {
        return false;
    };
    match (read.as_f64(), written.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => read == *written,
    }
}

// Integral values are written as JSON integers so integer properties accept them.
fn number(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

/// Current value at `key_path` of `layer` as JSON, if set.
pub fn read_property(layer: &Layer, key_path: &str) -> Option<Value> {
    let path = canonical_key_path(key_path);
    let mut shell = layer.clone();
    shell.children = Vec::new();
    let mut cur = serde_json::to_value(&shell).ok()?;
    for seg in path.split('.') {
        cur = cur.as_object_mut()?.remove(seg)?;
    }
    Some(cur)
}

#[cfg(test)]
#[path = "../../tests/unit/states/project.rs"]
mod tests;
