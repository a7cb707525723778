use super::*;
use crate::layers::model::LayerKind;
use crate::states::model::{StateOverride, TransitionElement};
use serde_json::json;

fn tree() -> Vec<Arc<Layer>> {
    vec![
        Arc::new(Layer::new("a", "A", LayerKind::Basic)),
        Arc::new(Layer::new("b", "B", LayerKind::Basic)),
    ]
}

fn states() -> StateSet {
    let mut s = StateSet::default();
    s.add_state("Locked").unwrap();
    s.add_state("Unlock").unwrap();
    s.set_override("Locked", StateOverride::new("a", "opacity", 0.0))
        .unwrap();
    s.set_override("Unlock", StateOverride::new("a", "opacity", 1.0))
        .unwrap();
    s.set_override("Locked", StateOverride::new("b", "position.x", 10.0))
        .unwrap();
    s.set_override("Unlock", StateOverride::new("b", "position.x", 10.0))
        .unwrap();
    s.set_override("Unlock", StateOverride::new("ghost", "opacity", 0.3))
        .unwrap();
    s
}

#[test]
fn unmatched_pair_plans_instant_changes() {
    let t = tree();
    let s = states();
    let plan = s.plan_state_change(&t, "Locked", "Unlock");
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].target_id, "a");
    assert_eq!(plan[0].from, Some(json!(0.0)));
    assert_eq!(plan[0].to, Some(json!(1.0)));
    assert_eq!(plan[0].plan, TransitionPlan::Instant);
}

#[test]
fn matching_element_animates() {
    let t = tree();
    let mut s = states();
    let anim = TransitionAnimation {
        damping: Some(50.0),
        ..TransitionAnimation::default()
    };
    s.set_transition_element(
        "Locked",
        "Unlock",
        TransitionElement {
            target_id: "a".into(),
            key_path: "opacity".into(),
            animation: Some(anim.clone()),
        },
    );
    let plan = s.plan_state_change(&t, "Locked", "Unlock");
    assert_eq!(plan[0].plan, TransitionPlan::Animated(&anim));

    // The reverse direction has no declared transition.
    let back = s.plan_state_change(&t, "Unlock", "Locked");
    assert_eq!(back[0].plan, TransitionPlan::Instant);
}

#[test]
fn base_state_participates_as_the_unoverridden_view() {
    let t = tree();
    let s = states();
    let plan = s.plan_state_change(&t, "Base State", "Locked");
    let targets: Vec<&str> = plan.iter().map(|c| c.target_id.as_str()).collect();
    assert_eq!(targets, ["a", "b"]);
    assert_eq!(plan[0].from, None);
    assert_eq!(plan[1].from, Some(json!(0.0)));
    assert!(s.plan_state_change(&t, "Base State", "Base State").is_empty());
}
