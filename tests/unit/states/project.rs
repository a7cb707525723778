use super::*;
use crate::foundation::core::{SizeDef, Vec2Def};
use crate::layers::model::LayerKind;
use crate::layers::tree::find_by_id;
use serde_json::json;

fn tree() -> Vec<Arc<Layer>> {
    let child = Layer::new("c", "Child", LayerKind::Basic)
        .with_frame(Vec2Def::new(5.0, 5.0), SizeDef::new(10.0, 10.0));
    vec![
        Arc::new(
            Layer::new("p", "Parent", LayerKind::Basic)
                .with_frame(Vec2Def::new(50.0, 50.0), SizeDef::new(100.0, 100.0))
                .with_children(vec![child]),
        ),
        Arc::new(Layer::new("q", "Other", LayerKind::Basic)),
    ]
}

fn state_with(ovs: Vec<StateOverride>) -> StateSet {
    let mut s = StateSet::default();
    s.add_state("Locked").unwrap();
    for ov in ovs {
        s.set_override("Locked", ov).unwrap();
    }
    s
}

#[test]
fn base_state_resolves_to_the_same_nodes() {
    let t = tree();
    let s = state_with(vec![StateOverride::new("c", "opacity", 0.5)]);
    let base = s.resolve(&t, "Base State");
    for (a, b) in t.iter().zip(&base) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn overrides_replace_dotted_properties() {
    let t = tree();
    let s = state_with(vec![
        StateOverride::new("c", "position.x", 42.0),
        StateOverride::new("c", "opacity", "0.25"),
        StateOverride::new("p", "backgroundColor", "#ff0000"),
    ]);
    let r = s.resolve(&t, "Locked");

    let c = find_by_id(&r, "c").unwrap();
    assert_eq!(c.position, Vec2Def::new(42.0, 5.0));
    assert_eq!(c.opacity, Some(0.25));
    assert_eq!(find_by_id(&r, "p").unwrap().background_color.as_deref(), Some("#ff0000"));

    // Base data untouched, unrelated roots shared.
    assert_eq!(find_by_id(&t, "c").unwrap().position, Vec2Def::new(5.0, 5.0));
    assert!(Arc::ptr_eq(&t[1], &r[1]));
}

#[test]
fn ca_key_paths_are_aliased() {
    let t = tree();
    let s = state_with(vec![
        StateOverride::new("p", "transform.rotation.z", 90.0),
        StateOverride::new("p", "transform.rotation.x", 10.0),
        StateOverride::new("p", "bounds.size.width", 300.0),
    ]);
    let r = s.resolve(&t, "Locked");
    let p = find_by_id(&r, "p").unwrap();
    assert_eq!(p.rotation, Some(90.0));
    assert_eq!(p.rotation_x, Some(10.0));
    assert_eq!(p.size, SizeDef::new(300.0, 100.0));
    assert_eq!(p.children.len(), 1);
}

#[test]
fn unfit_or_dangling_overrides_are_inert() {
    let t = tree();
    let s = state_with(vec![
        StateOverride::new("gone", "opacity", 0.5),
        StateOverride::new("c", "opacity", "not a number"),
        StateOverride::new("c", "id", "renamed"),
    ]);
    let r = s.resolve(&t, "Locked");
    assert_eq!(r, t);
    assert!(find_by_id(&r, "c").is_some());
}

#[test]
fn unset_groups_are_created_on_demand() {
    let layer = Layer::new("a", "A", LayerKind::Basic);
    let patched = apply_override(&layer, &StateOverride::new("a", "anchorPoint.x", 0.0)).unwrap();
    assert_eq!(patched.anchor_point, Some(Vec2Def::new(0.0, 0.0)));
}

#[test]
fn integer_properties_accept_whole_numbers() {
    let layer: Layer = serde_json::from_value(json!({
        "id": "v", "type": "video", "frameCount": 10
    }))
    .unwrap();
    let patched = apply_override(&layer, &StateOverride::new("v", "frameCount", 24.0)).unwrap();
    assert_eq!(read_property(&patched, "frameCount"), Some(json!(24)));
}

#[test]
fn read_property_follows_aliases() {
    let mut layer = Layer::new("a", "A", LayerKind::Basic);
    layer.rotation = Some(30.0);
    assert_eq!(read_property(&layer, "transform.rotation.z"), Some(json!(30.0)));
    assert_eq!(read_property(&layer, "position.y"), Some(json!(0.0)));
    assert_eq!(read_property(&layer, "opacity"), None);
}

#[test]
fn unknown_key_paths_do_not_fit() {
    let layer = Layer::new("a", "A", LayerKind::Basic)
        .with_frame(Vec2Def::new(1.0, 2.0), SizeDef::new(3.0, 4.0));
    for path in ["opactiy", "size.x", "fontSize"] {
        assert!(
            apply_override(&layer, &StateOverride::new("a", path, 0.5)).is_none(),
            "{path}"
        );
    }
    let patched = apply_override(&layer, &StateOverride::new("a", "size.h", 8.0)).unwrap();
    assert_eq!(patched.size, SizeDef::new(3.0, 8.0));
}
