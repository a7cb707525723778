use super::*;
use serde_json::json;

use crate::animation::keyframes::KeyPath;
use crate::document::model::ParallaxAxis;
use crate::foundation::error::CaError;

fn bundle(v: serde_json::Value) -> Bundle {
    serde_json::from_value(v).unwrap()
}

#[test]
fn group_root_is_flattened_to_its_children() {
    let b = bundle(json!({
        "project": {"name": "Night", "width": 390.4, "height": 0},
        "root": {
            "id": "root", "name": "Root", "type": "group",
            "size": {"w": 100, "h": 844.6},
            "backgroundColor": "#101010",
            "children": [
                {"id": "a", "name": "A", "type": "basic"},
                {"id": "b", "name": "B", "type": "text", "text": "hi"}
            ]
        },
        "states": ["Base State", "Locked", "base"],
        "stateOverrides": {"Locked": [{"targetId": "a", "keyPath": "opacity", "value": 0}]}
    }));
    let mut ids = IdGen::new(1);
    let doc = import_bundle(b, &ImportOpts::with_app_defaults(), &mut ids).unwrap();

    let names: Vec<&str> = doc.floating.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    assert_eq!(doc.meta.name, "Night");
    assert_eq!(doc.meta.width, 390.0);
    // Zero height falls back to the root's.
    assert_eq!(doc.meta.height, 845.0);
    assert_eq!(doc.meta.background.as_deref(), Some("#101010"));
    assert_eq!(doc.floating.states.states, ["Locked"]);
    assert_eq!(doc.floating.states.overrides_for("Locked").len(), 1);
    assert!(!doc.meta.id.is_empty());
}

#[test]
fn childless_root_becomes_the_only_layer() {
    let b = bundle(json!({
        "project": {"name": ""},
        "root": {"id": "solo", "name": "Solo", "type": "image", "src": "a.png", "size": {"w": 40, "h": 30}}
    }));
    let doc = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(2)).unwrap();
    assert_eq!(doc.floating.layers.len(), 1);
    assert_eq!(doc.floating.layers[0].id(), "solo");
    assert_eq!(doc.meta.name, IMPORTED_PROJECT_NAME);
    assert_eq!((doc.meta.width, doc.meta.height), (40.0, 30.0));
    assert_eq!(doc.meta.background_or_default(), DEFAULT_BACKGROUND);
    assert!(doc.floating.states.states.is_empty());
}

#[test]
fn fallback_states_fill_an_empty_state_list() {
    let b = bundle(json!({
        "project": {"name": "x", "width": 10, "height": 10},
        "root": {"id": "r", "type": "basic", "children": [{"id": "a", "type": "basic"}]},
        "states": ["Base State"]
    }));
    let doc = import_bundle(b, &ImportOpts::with_app_defaults(), &mut IdGen::new(3)).unwrap();
    assert_eq!(doc.floating.states.states, APP_DEFAULT_STATES);
}

#[test]
fn duplicate_ids_fail_the_import() {
    let b = bundle(json!({
        "project": {"name": "x"},
        "root": {"id": "r", "type": "basic", "children": [
            {"id": "a", "type": "basic"},
            {"id": "a", "type": "basic"}
        ]}
    }));
    let err = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(4)).unwrap_err();
    assert!(matches!(err, CaError::DuplicateId(_)));
}

#[test]
fn export_wraps_layers_in_a_canvas_sized_root() {
    let mut doc = ProjectDocument::new(ProjectMeta::new("p", "Clock", 390.0, 844.0));
    doc.floating.layers = vec![Arc::new(Layer::new("a", "A", LayerKind::Basic))];
    doc.floating.states.add_state("Locked").unwrap();

    let b = export_bundle(&doc);
    let root = b.root.as_ref().unwrap();
    assert_eq!(root.kind, LayerKind::Basic);
    assert_eq!(root.size, SizeDef::new(390.0, 844.0));
    assert_eq!(root.position, Vec2Def::new(195.0, 422.0));
    assert_eq!(root.background_color.as_deref(), Some(DEFAULT_BACKGROUND));
    assert!(Arc::ptr_eq(&root.children[0], &doc.floating.layers[0]));
    assert!(b.state_overrides.is_none());

    let back = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(5)).unwrap();
    assert_eq!(back.floating.layers, doc.floating.layers);
    assert_eq!(back.floating.states.states, ["Locked"]);
    assert_eq!((back.meta.width, back.meta.height), (390.0, 844.0));
}

#[test]
fn exporting_an_empty_tree_never_leaks_the_root_sentinel() {
    let doc = ProjectDocument::new(ProjectMeta::new("p", "Empty", 10.0, 10.0));
    let b = export_bundle(&doc);
    let back = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(6)).unwrap();
    assert_eq!(back.floating.layers.len(), 1);
    assert_ne!(back.floating.layers[0].id(), ROOT_SENTINEL);
}

#[test]
fn null_root_imports_an_empty_tree() {
    let b = Bundle::from_json_str(
        r#"{"project":{"name":"Blank","width":0,"height":0},"root":null}"#,
    )
    .unwrap();
    let doc = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(7)).unwrap();
    assert!(doc.floating.layers.is_empty());
    assert_eq!((doc.meta.width, doc.meta.height), (0.0, 0.0));
    assert_eq!(doc.meta.background_or_default(), DEFAULT_BACKGROUND);

    let missing = Bundle::from_json_str(r#"{"project":{"name":"x"}}"#).unwrap();
    assert!(missing.root.is_none());
}

#[test]
fn non_container_root_keeps_its_children() {
    let b = bundle(json!({
        "project": {"name": "x", "width": 10, "height": 10},
        "root": {"id": "t", "type": "text", "text": "hello", "children": [
            {"id": "c", "type": "basic"}
        ]}
    }));
    let doc = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(8)).unwrap();
    assert_eq!(doc.floating.layers.len(), 1);
    let t = &doc.floating.layers[0];
    assert_eq!(t.id(), "t");
    assert_eq!(t.children[0].id(), "c");
}

#[test]
fn transform_root_is_flattened() {
    let b = bundle(json!({
        "project": {"name": "x", "width": 10, "height": 10},
        "root": {"id": "r", "type": "transform", "children": [
            {"id": "a", "type": "basic"}
        ]}
    }));
    let doc = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(9)).unwrap();
    assert_eq!(doc.floating.layers[0].id(), "a");
}

#[test]
fn parallax_groups_survive_import_and_export() {
    let b = bundle(json!({
        "project": {"name": "Tilt", "width": 100, "height": 100},
        "root": {"id": "r", "type": "group", "children": [
            {"id": "a", "name": "Sky", "type": "basic"}
        ]},
        "wallpaperParallaxGroups": [{
            "axis": "y", "image": null, "keyPath": "position.y", "layerName": "Sky",
            "mapMinTo": -20, "mapMaxTo": 20, "title": "Sky drift", "view": "Floating"
        }]
    }));
    let doc = import_bundle(b, &ImportOpts::default(), &mut IdGen::new(10)).unwrap();
    let group = &doc.wallpaper_parallax_groups[0];
    assert_eq!(group.axis, ParallaxAxis::Y);
    assert_eq!(group.key_path, KeyPath::PositionY);
    assert_eq!((group.map_min_to, group.map_max_to), (-20.0, 20.0));
    assert_eq!(group.layer_name, "Sky");

    let out = serde_json::to_value(export_bundle(&doc)).unwrap();
    assert_eq!(out["wallpaperParallaxGroups"][0]["layerName"], "Sky");
    assert_eq!(out["wallpaperParallaxGroups"][0]["axis"], "y");

    let plain = export_bundle(&ProjectDocument::new(ProjectMeta::new("p", "n", 1.0, 1.0)));
    let plain = serde_json::to_value(plain).unwrap();
    assert!(plain.get("wallpaperParallaxGroups").is_none());
}
