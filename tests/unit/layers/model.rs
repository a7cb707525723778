use super::*;
use serde_json::json;

#[test]
fn kind_is_tagged_by_type() {
    let layer: Layer = serde_json::from_value(json!({
        "id": "t1",
        "name": "Title",
        "type": "text",
        "position": {"x": 10, "y": 20},
        "size": {"w": 100, "h": 30},
        "text": "Hello",
        "fontSize": 18
    }))
    .unwrap();
    assert_eq!(layer.id(), "t1");
    let LayerKind::Text(t) = &layer.kind else {
        panic!("expected text layer");
    };
    assert_eq!(t.text, "Hello");
    assert_eq!(t.font_size, Some(18.0));

    let v = serde_json::to_value(&layer).unwrap();
    assert_eq!(v["type"], json!("text"));
    assert_eq!(v["fontSize"], json!(18.0));
    assert!(v.get("children").is_none());
    assert!(v.get("opacity").is_none());
}

#[test]
fn group_is_an_alias_for_basic() {
    let layer: Layer = serde_json::from_value(json!({
        "id": "g", "type": "group",
        "children": [{"id": "c", "type": "basic"}]
    }))
    .unwrap();
    assert_eq!(layer.kind, LayerKind::Basic);
    assert_eq!(layer.children.len(), 1);
    assert_eq!(serde_json::to_value(&layer).unwrap()["type"], json!("basic"));
}

#[test]
fn accessors_apply_defaults() {
    let layer = Layer::new("a", "A", LayerKind::Basic);
    assert_eq!(layer.effective_opacity(), 1.0);
    assert_eq!(layer.effective_rotation(), 0.0);
    assert_eq!(layer.effective_anchor(), Vec2Def::new(0.5, 0.5));
    assert!(layer.is_visible());
    assert!(!layer.is_geometry_flipped());
    assert!(!layer.masks_to_bounds());
}

#[test]
fn flags_accept_integers_and_booleans() {
    let layer: Layer = serde_json::from_value(json!({
        "id": "a", "type": "basic", "geometryFlipped": 1, "masksToBounds": true
    }))
    .unwrap();
    assert!(layer.is_geometry_flipped());
    assert!(layer.masks_to_bounds());
    assert_eq!(
        serde_json::to_value(&layer).unwrap()["masksToBounds"],
        json!(1)
    );
}

#[test]
fn emitter_cells_default_missing_numbers() {
    let layer: Layer = serde_json::from_value(json!({
        "id": "e", "type": "emitter",
        "emitterShape": "rectangle",
        "emitterCells": [{"id": "c1", "birthRate": 5}]
    }))
    .unwrap();
    let e = layer.kind.as_emitter().unwrap();
    assert_eq!(e.emitter_shape, EmitterShape::Rectangle);
    assert_eq!(e.render_mode, RenderMode::Additive);
    let cell = &e.emitter_cells[0];
    assert_eq!(cell.birth_rate, 5.0);
    assert_eq!(cell.lifetime, 0.0);
    assert_eq!(cell.scale, 1.0);
    assert_eq!(cell.color, DEFAULT_CELL_COLOR);
}

#[test]
fn render_mode_accepts_source_over() {
    let m: RenderMode = serde_json::from_value(json!("sourceOver")).unwrap();
    assert_eq!(m, RenderMode::Unordered);
}

#[test]
fn validate_rejects_out_of_range_properties() {
    let mut layer = Layer::new("a", "A", LayerKind::Basic);
    assert!(layer.validate().is_ok());

    layer.opacity = Some(1.5);
    assert!(layer.validate().is_err());
    layer.opacity = Some(0.5);

    layer.size = SizeDef::new(-1.0, 10.0);
    assert!(layer.validate().is_err());
    layer.size = SizeDef::new(1.0, 10.0);

    layer.background_color = Some("not-a-color".to_owned());
    let err = layer.validate().unwrap_err();
    assert!(err.to_string().contains("backgroundColor"));
}

#[test]
fn validate_checks_kind_payloads() {
    let video = Layer::new("v", "V", LayerKind::Video(VideoProps::default()));
    assert!(video.validate().is_err());

    let mut cell = EmitterCellDef::new("c");
    cell.birth_rate = -1.0;
    let emitter = Layer::new(
        "e",
        "E",
        LayerKind::Emitter(EmitterProps {
            emitter_cells: vec![cell],
            ..EmitterProps::default()
        }),
    );
    let err = emitter.validate().unwrap_err();
    assert!(err.to_string().contains("birthRate"));

    assert!(Layer::new("", "blank", LayerKind::Basic).validate().is_err());
}

#[test]
fn name_bases_follow_kind() {
    assert_eq!(LayerKind::Basic.name_base(), "Basic Layer");
    assert_eq!(
        LayerKind::Emitter(EmitterProps::default()).name_base(),
        "Emitter Layer"
    );
    assert_eq!(LayerKind::Transform.type_name(), "transform");
}
