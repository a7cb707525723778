use super::*;
use serde_json::json;

use crate::layers::model::LayerKind;

fn sample() -> serde_json::Value {
    json!({
        "meta": {
            "id": "p1",
            "name": "Clock",
            "width": 390,
            "height": 844,
            "background": "#000000",
            "wallpaperKind": "lock"
        },
        "layers": [
            {"id": "a", "name": "A", "type": "basic", "position": {"x": 10, "y": 20}, "size": {"w": 5, "h": 5}},
            {"id": "b", "name": "B", "type": "text", "text": "12:00", "children": [
                {"id": "c", "name": "C", "type": "group"}
            ]}
        ],
        "selectedId": "b",
        "states": ["Locked"],
        "stateOverrides": {"Locked": [{"targetId": "a", "keyPath": "opacity", "value": 0.5}]},
        "stateTransitions": []
    })
}

#[test]
fn loads_top_level_tree_and_states() {
    let doc = ProjectDocument::from_json_str(&sample().to_string()).unwrap();
    assert_eq!(doc.meta.name, "Clock");
    assert_eq!(doc.meta.width, 390.0);
    assert_eq!(doc.floating.layers.len(), 2);
    assert_eq!(doc.floating.layer_count(), 3);
    assert_eq!(doc.floating.live_selection(), Some("b"));
    assert_eq!(doc.floating.states.overrides_for("Locked").len(), 1);
    assert!(doc.background_layers.is_none());
    doc.validate().unwrap();
}

#[test]
fn unknown_meta_keys_survive_a_round_trip() {
    let doc = ProjectDocument::from_json_str(&sample().to_string()).unwrap();
    assert_eq!(doc.meta.extra.get("wallpaperKind"), Some(&json!("lock")));

    let text = doc.to_json_pretty().unwrap();
    let back = ProjectDocument::from_json_str(&text).unwrap();
    assert_eq!(back, doc);
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["meta"]["wallpaperKind"], json!("lock"));
    assert_eq!(v["layers"][1]["children"][0]["type"], json!("basic"));
}

#[test]
fn missing_collections_default_to_empty() {
    let doc = ProjectDocument::from_json_str(r#"{"meta": {"id": "p", "name": "n"}}"#).unwrap();
    assert!(doc.floating.layers.is_empty());
    assert!(doc.floating.states.is_empty());
    assert_eq!(doc.meta.background_or_default(), DEFAULT_BACKGROUND);
    doc.validate().unwrap();
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ProjectDocument::from_json_str("{\"meta\": 3}").unwrap_err();
    assert!(matches!(err, CaError::Serde(_)));
}

#[test]
fn validate_rejects_duplicates_and_base_state_names() {
    let mut doc = ProjectDocument::new(ProjectMeta::new("p", "n", 100.0, 100.0));
    doc.floating.layers = vec![
        Arc::new(Layer::new("x", "X", LayerKind::Basic)),
        Arc::new(Layer::new("x", "Y", LayerKind::Basic)),
    ];
    assert!(matches!(doc.validate(), Err(CaError::DuplicateId(id)) if id == "x"));

    doc.floating.layers.pop();
    doc.floating.states.states.push("Base State".to_owned());
    assert!(matches!(doc.validate(), Err(CaError::Validation(_))));
}

#[test]
fn stale_selection_is_not_live() {
    let mut doc = LayerDoc::new(vec![Arc::new(Layer::new("x", "X", LayerKind::Basic))]);
    doc.selected_id = Some("gone".to_owned());
    assert_eq!(doc.live_selection(), None);
    doc.validate().unwrap();
}

#[test]
fn negative_canvas_is_invalid() {
    let doc = ProjectDocument::new(ProjectMeta::new("p", "n", -1.0, 10.0));
    assert!(doc.validate().is_err());
}

#[test]
fn ids_shared_between_roots_fail_validation() {
    let mut v = sample();
    v["backgroundLayers"] = json!({"layers": [{"id": "c", "name": "Dup", "type": "basic"}]});
    let doc: ProjectDocument = serde_json::from_value(v).unwrap();
    assert!(matches!(doc.validate(), Err(CaError::DuplicateId(id)) if id == "c"));
}
