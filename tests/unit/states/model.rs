use super::*;
use crate::layers::model::LayerKind;
use serde_json::json;

fn with_states(names: &[&str]) -> StateSet {
    let mut s = StateSet::default();
    for n in names {
        s.add_state(*n).unwrap();
    }
    s
}

#[test]
fn base_state_names_are_recognised() {
    for name in ["Base State", "base", "BASE", "base   state", "BaseState", " Base "] {
        assert!(is_base_state_name(name), "{name}");
    }
    for name in ["Based", "Locked", "baseball", "state base"] {
        assert!(!is_base_state_name(name), "{name}");
    }
}

#[test]
fn add_state_rejects_reserved_and_duplicates() {
    let mut s = with_states(&["Locked"]);
    assert!(s.add_state("Base State").is_err());
    assert!(s.add_state("Locked").is_err());
    assert!(s.add_state("  ").is_err());
    s.add_state("Unlock").unwrap();
    assert_eq!(s.user_states(), ["Locked", "Unlock"]);
    assert!(s.has_state("Base State"));
    assert!(!s.has_state("Sleep"));
}

#[test]
fn overrides_upsert_by_target_and_key_path() {
    let mut s = with_states(&["Locked"]);
    s.set_override("Locked", StateOverride::new("a", "opacity", 0.5))
        .unwrap();
    s.set_override("Locked", StateOverride::new("a", "opacity", 0.2))
        .unwrap();
    s.set_override("Locked", StateOverride::new("a", "position.x", 5.0))
        .unwrap();
    let list = s.overrides_for("Locked");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].value, OverrideValue::Number(0.2));

    assert!(s.set_override("base", StateOverride::new("a", "opacity", 1.0)).is_err());
    assert!(s.overrides_for(BASE_STATE).is_empty());

    assert!(s.remove_override("Locked", "a", "opacity"));
    assert!(!s.remove_override("Locked", "a", "opacity"));
    assert!(!s.remove_override("Nope", "a", "opacity"));
}

#[test]
fn rename_moves_overrides_and_transition_endpoints() {
    let mut s = with_states(&["Locked", "Unlock"]);
    s.set_override("Locked", StateOverride::new("a", "opacity", 0.0))
        .unwrap();
    s.set_transition_element(
        "Locked",
        "Unlock",
        TransitionElement {
            target_id: "a".into(),
            key_path: "opacity".into(),
            animation: None,
        },
    );
    s.rename_state("Locked", "Closed").unwrap();

    assert_eq!(s.user_states(), ["Closed", "Unlock"]);
    assert_eq!(s.overrides_for("Closed").len(), 1);
    assert!(s.overrides_for("Locked").is_empty());
    assert!(s.transition("Closed", "Unlock").is_some());
    assert!(s.rename_state("Closed", "Unlock").is_err());
    assert!(s.rename_state("Missing", "X").is_err());
}

#[test]
fn remove_state_drops_its_data() {
    let mut s = with_states(&["Locked", "Unlock"]);
    s.set_override("Locked", StateOverride::new("a", "opacity", 0.0))
        .unwrap();
    let el = TransitionElement {
        target_id: "a".into(),
        key_path: "opacity".into(),
        animation: None,
    };
    s.set_transition_element("Unlock", "Locked", el.clone());
    s.set_transition_element("Unlock", "Locked", el);
    assert_eq!(s.state_transitions[0].elements.len(), 1);

    assert!(s.remove_state("Locked"));
    assert!(!s.remove_state("Locked"));
    assert!(s.state_overrides.is_empty());
    assert!(s.state_transitions.is_empty());
}

#[test]
fn dangling_targets_and_pruning() {
    let tree = vec![Arc::new(Layer::new("a", "A", LayerKind::Basic))];
    let mut s = with_states(&["Locked"]);
    s.set_override("Locked", StateOverride::new("a", "opacity", 0.0))
        .unwrap();
    s.set_override("Locked", StateOverride::new("gone", "opacity", 0.0))
        .unwrap();
    let dangling = s.dangling_targets(&tree);
    assert_eq!(dangling.into_iter().collect::<Vec<_>>(), ["gone"]);

    s.prune_targets(&HashSet::from(["gone".to_owned()]));
    assert!(s.dangling_targets(&tree).is_empty());
    assert_eq!(s.overrides_for("Locked").len(), 1);
}

#[test]
fn wire_shape_is_camel_case_and_lenient() {
    let s: StateSet = serde_json::from_value(json!({
        "stateOverrides": {"Locked": [{"targetId": "a", "keyPath": "opacity", "value": "0.5"}]},
        "stateTransitions": [{
            "fromState": "Locked", "toState": "Unlock",
            "elements": [{"targetId": "a", "keyPath": "opacity",
                          "animation": {"type": "CASpringAnimation", "damping": 50, "fillMode": "backwards"}}]
        }]
    }))
    .unwrap();
    assert!(s.states.is_empty());
    assert_eq!(
        s.overrides_for("Locked")[0].value,
        OverrideValue::Text("0.5".into())
    );
    let anim = s.state_transitions[0].elements[0].animation.as_ref().unwrap();
    assert_eq!(anim.damping, Some(50.0));
    assert_eq!(anim.fill_mode.as_deref(), Some("backwards"));

    let back = serde_json::to_value(&s).unwrap();
    assert_eq!(back["stateTransitions"][0]["elements"][0]["animation"]["type"], json!("CASpringAnimation"));
    assert!(StateSet::default().is_empty());
}
