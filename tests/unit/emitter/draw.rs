use super::*;
use crate::assets::store::{CellAsset, CellAssetMap};
use crate::emitter::sim::RealizeOpts;
use crate::foundation::core::{FlagDef, SizeDef, Vec2Def};
use crate::foundation::rng::ScriptedRandom;
use crate::layers::model::{EmitterCellDef, EmitterProps, LayerKind};

fn emitter_layer(render_mode: RenderMode, cell: EmitterCellDef) -> Layer {
    Layer::new(
        "em",
        "Emitter",
        LayerKind::Emitter(EmitterProps {
            render_mode,
            emitter_cells: vec![cell],
            ..EmitterProps::default()
        }),
    )
}

fn one_particle(layer: &Layer, assets: &CellAssetMap) -> EmitterSim<ScriptedRandom> {
    let mut sim = EmitterSim::realize_with_rng(
        layer,
        assets,
        &RealizeOpts::default(),
        ScriptedRandom::constant(0.5),
    )
    .unwrap();
    sim.step(0.1);
    assert_eq!(sim.live_count(), 1);
    sim
}

fn spark(id: &str) -> EmitterCellDef {
    let mut c = EmitterCellDef::new(id);
    c.birth_rate = 10.0;
    c.lifetime = 5.0;
    c
}

#[test]
fn circles_without_sprites_and_blend_reset() {
    let mut c = spark("dot");
    c.scale = 2.0;
    let layer = emitter_layer(RenderMode::Additive, c);
    let sim = one_particle(&layer, &CellAssetMap::new());

    let mut surface = RecordingSurface::new();
    sim.draw(&mut surface);
    assert_eq!(surface.commands.len(), 3);
    assert_eq!(surface.commands[0], DrawCmd::Blend(Blend::Additive));
    assert_eq!(
        surface.commands[1],
        DrawCmd::Circle {
            center: Point::new(0.0, 0.0),
            radius: 16.0,
            color: ColorDef::WHITE,
            alpha: 1.0,
        }
    );
    assert_eq!(surface.commands[2], DrawCmd::Blend(Blend::SourceOver));
}

#[test]
fn unordered_layers_leave_blend_alone() {
    let layer = emitter_layer(RenderMode::Unordered, spark("dot"));
    let sim = one_particle(&layer, &CellAssetMap::new());
    let mut surface = RecordingSurface::new();
    sim.draw(&mut surface);
    assert_eq!(surface.particle_draws(), 1);
    assert!(!surface.commands.iter().any(|c| matches!(c, DrawCmd::Blend(_))));
}

#[test]
fn sprites_are_centered_with_aspect() {
    let mut c = spark("img");
    c.spin = 90.0;
    let layer = emitter_layer(RenderMode::Unordered, c);
    let mut assets = CellAssetMap::new();
    assets.insert(
        "img".to_owned(),
        CellAsset {
            data_url: Some("data:img".to_owned()),
            width: Some(20.0),
            height: Some(10.0),
        },
    );
    let sim = one_particle(&layer, &assets);
    let mut surface = RecordingSurface::new();
    sim.draw(&mut surface);

    let DrawCmd::Sprite {
        handle,
        transform,
        dest,
        alpha,
    } = &surface.commands[0]
    else {
        panic!("expected a sprite draw");
    };
    assert_eq!(handle, "data:img");
    assert_eq!(*alpha, 1.0);
    // base size 20, height 20, width 40
    assert_eq!(*dest, Rect::new(-20.0, -10.0, 20.0, 10.0));
    let rot = sim.particles().next().unwrap().rot;
    assert!(rot > 0.0);
    let expected = Affine::rotate(rot);
    for (a, b) in transform.as_coeffs().iter().zip(expected.as_coeffs()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn transparent_particles_are_skipped() {
    let mut c = spark("dot");
    c.alpha_speed = -20.0;
    let layer = emitter_layer(RenderMode::Unordered, c);
    let sim = one_particle(&layer, &CellAssetMap::new());
    let mut surface = RecordingSurface::new();
    sim.draw(&mut surface);
    assert_eq!(surface.particle_draws(), 0);
}

#[test]
fn canvas_transform_flips_unflipped_layers() {
    let mut layer = Layer::new("em", "E", LayerKind::Basic)
        .with_frame(Vec2Def::new(100.0, 50.0), SizeDef::new(20.0, 10.0));
    let m = canvas_transform(&layer, 400.0);
    // Layer-local origin lands at (position - size/2) with y mirrored.
    let p = m * Point::new(0.0, 0.0);
    assert!((p.x - 90.0).abs() < 1e-9);
    assert!((p.y - (400.0 - 45.0)).abs() < 1e-9);

    layer.geometry_flipped = Some(FlagDef::ON);
    let m = canvas_transform(&layer, 400.0);
    let p = m * Point::new(0.0, 0.0);
    assert!((p.x - 90.0).abs() < 1e-9);
    assert!((p.y - (350.0 - 5.0)).abs() < 1e-9);
}

#[test]
fn canvas_transform_rotates_about_the_center() {
    let mut layer = Layer::new("em", "E", LayerKind::Basic)
        .with_frame(Vec2Def::new(0.0, 0.0), SizeDef::new(2.0, 2.0));
    layer.rotation = Some(90.0);
    layer.geometry_flipped = Some(FlagDef::ON);
    let m = canvas_transform(&layer, 0.0);
    // Flipped layers rotate by the negated angle.
    let p = m * Point::new(2.0, 1.0);
    assert!((p.x - 0.0).abs() < 1e-9);
    assert!((p.y - -1.0).abs() < 1e-9);
}
