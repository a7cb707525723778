use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use crate::layers::model::Layer;
use crate::layers::tree::find_by_id;
use crate::states::model::{StateSet, TransitionAnimation};
use crate::states::project::{canonical_key_path, read_property};

/// How one property change is presented when switching states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionPlan<'a> {
    /// Animate with the matching transition element's parameters.
    Animated(&'a TransitionAnimation),
    /// No matching element: apply immediately.
    Instant,
}

/// One property whose displayed value differs between two states.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedChange<'a> {
    /// Layer id.
    pub target_id: String,
    /// Key path as written in the overrides.
    pub key_path: String,
    /// Displayed value in the source state (`None` when unset).
    pub from: Option<Value>,
    /// Displayed value in the destination state (`None` when unset).
    pub to: Option<Value>,
    /// Presentation.
    pub plan: TransitionPlan<'a>,
}

impl StateSet {
    /// Every property change involved in switching from `from` to `to`.
    ///
    /// Candidate properties are those overridden in either state. Dangling targets and
    /// properties that display the same value in both states are skipped. Transitions are matched
    /// on the exact `(from, to)` pair only.
    pub fn plan_state_change<'a>(
        &'a self,
        layers: &[Arc<Layer>],
        from: &str,
        to: &str,
    ) -> Vec<PlannedChange<'a>> {
        let candidates: BTreeSet<(&str, &str)> = self
            .overrides_for(from)
            .iter()
            .chain(self.overrides_for(to))
            .map(|o| (o.target_id.as_str(), o.key_path.as_str()))
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let from_tree = self.resolve(layers, from);
        let to_tree = self.resolve(layers, to);
        let transition = self.transition(from, to);

        let mut out = Vec::new();
        for (target, key_path) in candidates {
            let (Some(a), Some(b)) = (find_by_id(&from_tree, target), find_by_id(&to_tree, target))
            else {
                continue;
            };
            let before = read_property(a, key_path);
            let after = read_property(b, key_path);
            if before == after {
                continue;
            }

            let wanted = canonical_key_path(key_path);
            let plan = transition
                .and_then(|t| {
                    t.elements.iter().find(|e| {
                        e.target_id == target && canonical_key_path(&e.key_path) == wanted
                    })
                })
                .and_then(|e| e.animation.as_ref())
                .map_or(TransitionPlan::Instant, TransitionPlan::Animated);

            out.push(PlannedChange {
                target_id: target.to_owned(),
                key_path: key_path.to_owned(),
                from: before,
                to: after,
                plan,
            });
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/states/transition.rs"]
mod tests;
