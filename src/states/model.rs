use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CaError, CaResult};
use crate::layers::model::Layer;
use crate::layers::tree::contains_id;

/// Name of the implicit state that shows the base tree. Never stored in [`StateSet::states`].
pub const BASE_STATE: &str = "Base State";

/// Whether `name` spells the base state (`base`, `Base State`, `basestate`, any case).
pub fn is_base_state_name(name: &str) -> bool {
    let lower = name.trim().to_ascii_lowercase();
    match lower.strip_prefix("base") {
        Some(rest) => {
            let rest = rest.trim_start();
            rest.is_empty() || rest == "state"
        }
        None => false,
    }
}

/// Override payload: JSON number or string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// Numeric value.
    Number(f64),
    /// Text value (colors, names, numeric strings).
    Text(String),
}

impl From<f64> for OverrideValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for OverrideValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Replace one property of one layer while a state is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOverride {
    /// Id of the layer being overridden.
    pub target_id: String,
    /// Dotted property path (`position.x`, `opacity`, `transform.rotation.z`, ...).
    pub key_path: String,
    /// Replacement value.
    pub value: OverrideValue,
}

impl StateOverride {
    /// Build an override.
    pub fn new(
        target_id: impl Into<String>,
        key_path: impl Into<String>,
        value: impl Into<OverrideValue>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            key_path: key_path.into(),
            value: value.into(),
        }
    }
}

/// Animation parameters of a transition element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAnimation {
    /// Animation class, typically `CASpringAnimation`.
    #[serde(rename = "type", default = "default_animation_type")]
    pub kind: String,
    /// Spring damping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    /// Spring mass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    /// Spring stiffness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    /// Initial velocity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Fill mode name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_mode: Option<String>,
    /// Animated key path, when it differs from the element's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
}

fn default_animation_type() -> String {
    "CASpringAnimation".to_owned()
}

impl Default for TransitionAnimation {
    fn default() -> Self {
        Self {
            kind: default_animation_type(),
            damping: None,
            mass: None,
            stiffness: None,
            velocity: None,
            duration: None,
            fill_mode: None,
            key_path: None,
        }
    }
}

/// One animated property of a transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionElement {
    /// Id of the animated layer.
    pub target_id: String,
    /// Animated property path.
    pub key_path: String,
    /// Animation parameters; absent means the change applies instantly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<TransitionAnimation>,
}

/// Directed transition between two states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    /// Source state name.
    pub from_state: String,
    /// Destination state name.
    pub to_state: String,
    /// Animated properties.
    #[serde(default)]
    pub elements: Vec<TransitionElement>,
}

/// User states with their overrides and transitions.
///
/// The base state is implicit: it has no overrides and is never listed in `states`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSet {
    /// Ordered user state names.
    #[serde(default)]
    pub states: Vec<String>,
    /// Overrides keyed by state name.
    #[serde(default)]
    pub state_overrides: BTreeMap<String, Vec<StateOverride>>,
    /// Directed transitions.
    #[serde(default)]
    pub state_transitions: Vec<StateTransition>,
}

impl StateSet {
    /// User state names.
    pub fn user_states(&self) -> &[String] {
        &self.states
    }

    /// Whether `name` is the base state or a listed user state.
    pub fn has_state(&self, name: &str) -> bool {
        is_base_state_name(name) || self.states.iter().any(|s| s == name)
    }

    fn check_user_name(&self, name: &str) -> CaResult<()> {
        if name.trim().is_empty() {
            return Err(CaError::validation("state name must be non-empty"));
        }
        if is_base_state_name(name) {
            return Err(CaError::validation(format!(
                "'{name}' is reserved for the base state"
            )));
        }
        if self.states.iter().any(|s| s == name) {
            return Err(CaError::validation(format!("state '{name}' already exists")));
        }
        Ok(())
    }

    /// Append a user state.
    pub fn add_state(&mut self, name: impl Into<String>) -> CaResult<()> {
        let name = name.into();
        self.check_user_name(&name)?;
        self.states.push(name);
        Ok(())
    }

    /// Rename a user state, carrying its overrides and transition endpoints along.
    pub fn rename_state(&mut self, from: &str, to: impl Into<String>) -> CaResult<()> {
        let to = to.into();
        let Some(idx) = self.states.iter().position(|s| s == from) else {
            return Err(CaError::validation(format!("unknown state '{from}'")));
        };
        if from == to {
            return Ok(());
        }
        self.check_user_name(&to)?;
        self.states[idx] = to.clone();
        if let Some(ovs) = self.state_overrides.remove(from) {
            self.state_overrides.insert(to.clone(), ovs);
        }
        for t in &mut self.state_transitions {
            if t.from_state == from {
                t.from_state = to.clone();
            }
            if t.to_state == from {
                t.to_state = to.clone();
            }
        }
        Ok(())
    }

    /// Remove a user state with its overrides and every transition touching it.
    pub fn remove_state(&mut self, name: &str) -> bool {
        let before = self.states.len();
        self.states.retain(|s| s != name);
        if self.states.len() == before {
            return false;
        }
        self.state_overrides.remove(name);
        self.state_transitions
            .retain(|t| t.from_state != name && t.to_state != name);
        true
    }

    /// Overrides of `state`; empty for the base state or unknown states.
    pub fn overrides_for(&self, state: &str) -> &[StateOverride] {
        if is_base_state_name(state) {
            return &[];
        }
        self.state_overrides
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Insert or replace the override for `(target_id, key_path)` in `state`.
    pub fn set_override(&mut self, state: &str, ov: StateOverride) -> CaResult<()> {
        if is_base_state_name(state) {
            return Err(CaError::validation(
                "the base state has no overrides; edit the layer instead",
            ));
        }
        let list = self.state_overrides.entry(state.to_owned()).or_default();
        match list
            .iter_mut()
            .find(|o| o.target_id == ov.target_id && o.key_path == ov.key_path)
        {
            Some(existing) => existing.value = ov.value,
            None => list.push(ov),
        }
        Ok(())
    }

    /// Remove the override for `(target_id, key_path)` in `state`.
    pub fn remove_override(&mut self, state: &str, target_id: &str, key_path: &str) -> bool {
        let Some(list) = self.state_overrides.get_mut(state) else {
            return false;
        };
        let before = list.len();
        list.retain(|o| !(o.target_id == target_id && o.key_path == key_path));
        list.len() != before
    }

    /// Transition declared for exactly `from -> to`.
    pub fn transition(&self, from: &str, to: &str) -> Option<&StateTransition> {
        self.state_transitions
            .iter()
            .find(|t| t.from_state == from && t.to_state == to)
    }

    /// Insert or replace a transition element, creating the transition when needed.
    pub fn set_transition_element(&mut self, from: &str, to: &str, element: TransitionElement) {
        let idx = match self
            .state_transitions
            .iter()
            .position(|t| t.from_state == from && t.to_state == to)
        {
            Some(i) => i,
            None => {
                self.state_transitions.push(StateTransition {
                    from_state: from.to_owned(),
                    to_state: to.to_owned(),
                    elements: Vec::new(),
                });
                self.state_transitions.len() - 1
            }
        };
        let elements = &mut self.state_transitions[idx].elements;
        match elements
            .iter_mut()
            .find(|e| e.target_id == element.target_id && e.key_path == element.key_path)
        {
            Some(existing) => *existing = element,
            None => elements.push(element),
        }
    }

    /// Target ids referenced by overrides or transitions that are missing from `layers`.
    pub fn dangling_targets(&self, layers: &[Arc<Layer>]) -> BTreeSet<String> {
        self.referenced_targets()
            .filter(|id| !contains_id(layers, id))
            .map(str::to_owned)
            .collect()
    }

    fn referenced_targets(&self) -> impl Iterator<Item = &str> {
        let from_overrides = self
            .state_overrides
            .values()
            .flatten()
            .map(|o| o.target_id.as_str());
        let from_transitions = self
            .state_transitions
            .iter()
            .flat_map(|t| &t.elements)
            .map(|e| e.target_id.as_str());
        from_overrides.chain(from_transitions)
    }

    /// Drop every override and transition element targeting one of `ids`.
    pub fn prune_targets(&mut self, ids: &HashSet<String>) {
        for list in self.state_overrides.values_mut() {
            list.retain(|o| !ids.contains(&o.target_id));
        }
        for t in &mut self.state_transitions {
            t.elements.retain(|e| !ids.contains(&e.target_id));
        }
    }

    /// Whether no user state, override, or transition is stored.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.state_overrides.values().all(Vec::is_empty)
            && self.state_transitions.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/states/model.rs"]
mod tests;
