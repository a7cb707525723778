//! Structural operations over `&[Arc<Layer>]` forests.
//!
//! Every operation is a pure function returning a new vector. Only the nodes on the path from a
//! root to the touched node are rebuilt, so untouched subtrees stay `Arc::ptr_eq` with the input.
//! Traversal is pre-order depth-first everywhere and the first match wins. A missing target is a
//! no-op that hands back a tree sharing every node with the input.

use std::collections::HashSet;
use std::sync::Arc;

use crate::foundation::error::{CaError, CaResult};
use crate::foundation::ids::IdGen;
use crate::layers::model::Layer;

/// Selection value that means "the top level of the tree".
pub const ROOT_SENTINEL: &str = "__root__";

/// First layer with `id`, in pre-order.
pub fn find_by_id<'a>(layers: &'a [Arc<Layer>], id: &str) -> Option<&'a Arc<Layer>> {
    for layer in layers {
        if layer.id() == id {
            return Some(layer);
        }
        if let Some(found) = find_by_id(&layer.children, id) {
            return Some(found);
        }
    }
    None
}

/// Whether any layer in the tree has `id`.
pub fn contains_id(layers: &[Arc<Layer>], id: &str) -> bool {
    find_by_id(layers, id).is_some()
}

/// Id of the parent of `id`, or `None` when `id` is a root or absent.
pub fn parent_of<'a>(layers: &'a [Arc<Layer>], id: &str) -> Option<&'a str> {
    for layer in layers {
        if layer.children.iter().any(|c| c.id() == id) {
            return Some(layer.id());
        }
        if let Some(p) = parent_of(&layer.children, id) {
            return Some(p);
        }
    }
    None
}

/// Every id of `layer`'s subtree, itself first, in pre-order.
pub fn collect_ids(layer: &Layer) -> Vec<String> {
    let mut out = Vec::new();
    collect_into(layer, &mut out);
    out
}

fn collect_into(layer: &Layer, out: &mut Vec<String>) {
    out.push(layer.id().to_owned());
    for c in &layer.children {
        collect_into(c, out);
    }
}

/// Append `node` as the last child of `selected`.
///
/// `None`, [`ROOT_SENTINEL`], or an id not present in the tree append `node` as the last root.
pub fn insert_into_selected(
    layers: &[Arc<Layer>],
    selected: Option<&str>,
    node: Layer,
) -> Vec<Arc<Layer>> {
    let target = selected.filter(|s| *s != ROOT_SENTINEL);
    if let Some(target) = target
        && contains_id(layers, target)
    {
        return update_in_tree(layers, target, move |parent| {
            parent.children.push(Arc::new(node));
        });
    }
    let mut out = layers.to_vec();
    out.push(Arc::new(node));
    out
}

/// Deep copy of `layer` with a fresh id on every node.
///
/// The copy's root is renamed `"<name> copy"` and offset by `(10, 10)`; descendants keep their
/// names and positions. The copy shares no allocation with the source.
pub fn clone_layer_deep(layer: &Layer, ids: &mut IdGen) -> Layer {
    let mut copy = clone_fresh(layer, ids);
    copy.name = format!("{} copy", layer.name);
    copy.position = layer.position.offset(10.0, 10.0);
    copy
}

fn clone_fresh(layer: &Layer, ids: &mut IdGen) -> Layer {
    let mut copy = layer.clone();
    copy.set_id(ids.next_id());
    copy.children = layer
        .children
        .iter()
        .map(|c| Arc::new(clone_fresh(c, ids)))
        .collect();
    copy
}

/// Apply `patch` to the first layer with `id`.
///
/// Only the path from the root to the match is rebuilt. The layer's id cannot change through the
/// patch: whatever the closure does, the result keeps the original id.
pub fn update_in_tree<F>(layers: &[Arc<Layer>], id: &str, patch: F) -> Vec<Arc<Layer>>
where
    F: FnOnce(&mut Layer),
{
    let mut patch = Some(patch);
    match update_rec(layers, id, &mut patch) {
        Some(updated) => updated,
        None => layers.to_vec(),
    }
}

// Returns `None` when nothing under `layers` matched, so callers can keep their own `Arc`.
fn update_rec<F>(layers: &[Arc<Layer>], id: &str, patch: &mut Option<F>) -> Option<Vec<Arc<Layer>>>
where
    F: FnOnce(&mut Layer),
{
    for (i, layer) in layers.iter().enumerate() {
        let replaced = if layer.id() == id {
            let f = patch.take()?;
            let mut next = (**layer).clone();
            f(&mut next);
            next.set_id(layer.id().to_owned());
            Some(next)
        } else {
            update_rec(&layer.children, id, patch).map(|children| {
                let mut next = (**layer).clone();
                next.children = children;
                next
            })
        };
        if let Some(next) = replaced {
            let mut out = layers.to_vec();
            out[i] = Arc::new(next);
            return Some(out);
        }
    }
    None
}

/// Remove the first layer with `id`, returning it and the remaining tree.
pub fn remove_from_tree(layers: &[Arc<Layer>], id: &str) -> (Option<Arc<Layer>>, Vec<Arc<Layer>>) {
    match remove_rec(layers, id) {
        Some((removed, out)) => (Some(removed), out),
        None => (None, layers.to_vec()),
    }
}

fn remove_rec(layers: &[Arc<Layer>], id: &str) -> Option<(Arc<Layer>, Vec<Arc<Layer>>)> {
    for (i, layer) in layers.iter().enumerate() {
        if layer.id() == id {
            let mut out = layers.to_vec();
            let removed = out.remove(i);
            return Some((removed, out));
        }
        if let Some((removed, children)) = remove_rec(&layer.children, id) {
            let mut next = (**layer).clone();
            next.children = children;
            let mut out = layers.to_vec();
            out[i] = Arc::new(next);
            return Some((removed, out));
        }
    }
    None
}

/// Delete the first layer with `id` together with its subtree.
pub fn delete_in_tree(layers: &[Arc<Layer>], id: &str) -> Vec<Arc<Layer>> {
    remove_from_tree(layers, id).1
}

/// Insert `node` as the sibling immediately before `target`.
///
/// Returns `false` and an unchanged tree when `target` is absent.
pub fn insert_before_in_tree(
    layers: &[Arc<Layer>],
    target: &str,
    node: Arc<Layer>,
) -> (bool, Vec<Arc<Layer>>) {
    insert_sibling(layers, target, node, 0)
}

/// Insert `node` as the sibling immediately after `target`.
pub fn insert_after_in_tree(
    layers: &[Arc<Layer>],
    target: &str,
    node: Arc<Layer>,
) -> (bool, Vec<Arc<Layer>>) {
    insert_sibling(layers, target, node, 1)
}

fn insert_sibling(
    layers: &[Arc<Layer>],
    target: &str,
    node: Arc<Layer>,
    offset: usize,
) -> (bool, Vec<Arc<Layer>>) {
    let mut node = Some(node);
    match insert_sibling_rec(layers, target, &mut node, offset) {
        Some(out) => (true, out),
        None => (false, layers.to_vec()),
    }
}

fn insert_sibling_rec(
    layers: &[Arc<Layer>],
    target: &str,
    node: &mut Option<Arc<Layer>>,
    offset: usize,
) -> Option<Vec<Arc<Layer>>> {
    for (i, layer) in layers.iter().enumerate() {
        if layer.id() == target {
            let mut out = layers.to_vec();
            out.insert(i + offset, node.take()?);
            return Some(out);
        }
        if let Some(children) = insert_sibling_rec(&layer.children, target, node, offset) {
            let mut next = (**layer).clone();
            next.children = children;
            let mut out = layers.to_vec();
            out[i] = Arc::new(next);
            return Some(out);
        }
    }
    None
}

/// Smallest positive `n` such that no layer is named `"<base> <n>"`.
pub fn next_layer_name(layers: &[Arc<Layer>], base: &str) -> String {
    let mut used = HashSet::new();
    collect_names(layers, &mut used);
    let mut n = 1usize;
    loop {
        let candidate = format!("{base} {n}");
        if !used.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

fn collect_names<'a>(layers: &'a [Arc<Layer>], out: &mut HashSet<&'a str>) {
    for layer in layers {
        out.insert(layer.name.as_str());
        collect_names(&layer.children, out);
    }
}

// `id` itself or one of its descendants.
fn is_within(layers: &[Arc<Layer>], id: &str, candidate: &str) -> bool {
    find_by_id(layers, id).is_some_and(|node| {
        node.id() == candidate || contains_id(&node.children, candidate)
    })
}

/// Move `id` so it becomes the sibling immediately before `target`.
///
/// Refuses (returns `false`, tree unchanged) when either node is absent, when they are the same
/// node, or when `target` lies inside the subtree being moved.
pub fn move_before(layers: &[Arc<Layer>], id: &str, target: &str) -> (bool, Vec<Arc<Layer>>) {
    if !contains_id(layers, target) || is_within(layers, id, target) {
        return (false, layers.to_vec());
    }
    let (removed, rest) = remove_from_tree(layers, id);
    let Some(node) = removed else {
        return (false, layers.to_vec());
    };
    let (ok, out) = insert_before_in_tree(&rest, target, node);
    if ok { (true, out) } else { (false, layers.to_vec()) }
}

/// Move `id` to be the last child of `parent`, or the last root when `parent` is `None`
/// or [`ROOT_SENTINEL`].
///
/// Refuses when `id` is absent, `parent` is absent, or `parent` lies inside the moved subtree.
pub fn reparent(layers: &[Arc<Layer>], id: &str, parent: Option<&str>) -> (bool, Vec<Arc<Layer>>) {
    let parent = parent.filter(|p| *p != ROOT_SENTINEL);
    if let Some(p) = parent
        && (!contains_id(layers, p) || is_within(layers, id, p))
    {
        return (false, layers.to_vec());
    }
    let (removed, rest) = remove_from_tree(layers, id);
    let Some(node) = removed else {
        return (false, layers.to_vec());
    };
    let out = match parent {
        Some(p) => update_in_tree(&rest, p, |layer| layer.children.push(node)),
        None => {
            let mut out = rest;
            out.push(node);
            out
        }
    };
    (true, out)
}

/// Validate every node and reject duplicate ids.
pub fn validate_tree(layers: &[Arc<Layer>]) -> CaResult<()> {
    let mut seen = HashSet::new();
    validate_rec(layers, &mut seen)
}

fn validate_rec<'a>(layers: &'a [Arc<Layer>], seen: &mut HashSet<&'a str>) -> CaResult<()> {
    for layer in layers {
        if !seen.insert(layer.id()) {
            return Err(CaError::duplicate_id(layer.id()));
        }
        layer.validate()?;
        validate_rec(&layer.children, seen)?;
    }
    Ok(())
}

/// Number of layers in the tree.
pub fn count_layers(layers: &[Arc<Layer>]) -> usize {
    layers.iter().map(|l| 1 + count_layers(&l.children)).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/layers/tree.rs"]
mod tests;
