//! Drawing of live particles onto an abstract surface.

use std::f64::consts::PI;

use crate::assets::color::ColorDef;
use crate::assets::store::Sprite;
use crate::emitter::sim::EmitterSim;
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::rng::RandomSource;
use crate::layers::model::{Layer, RenderMode};

/// Compositing operation for subsequent draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    /// Normal source-over compositing.
    SourceOver,
    /// Additive ("lighter") compositing.
    Additive,
}

/// Drawing contract used by [`EmitterSim::draw`].
///
/// Coordinates are in emitter layer space; the host applies [`canvas_transform`] (or its own
/// mapping) before forwarding to a real canvas.
pub trait ParticleSurface {
    /// Switch the compositing operation.
    fn set_blend(&mut self, blend: Blend);
    /// Draw `sprite` into `dest` (local space) under `transform` with `alpha`.
    fn draw_sprite(&mut self, sprite: &Sprite, transform: Affine, dest: Rect, alpha: f64);
    /// Fill a circle with `color` at `alpha`.
    fn fill_circle(&mut self, center: Point, radius: f64, color: ColorDef, alpha: f64);
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// [`ParticleSurface::set_blend`].
    Blend(Blend),
    /// [`ParticleSurface::draw_sprite`].
    Sprite {
        /// Sprite handle.
        handle: String,
        /// Local-to-layer transform.
        transform: Affine,
        /// Destination rectangle in local space.
        dest: Rect,
        /// Clamped alpha.
        alpha: f64,
    },
    /// [`ParticleSurface::fill_circle`].
    Circle {
        /// Center in layer space.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill color.
        color: ColorDef,
        /// Clamped alpha.
        alpha: f64,
    },
}

/// Surface that records every call, for tests and headless hosts.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    /// Calls in order.
    pub commands: Vec<DrawCmd>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of particle draws (sprites and circles).
    pub fn particle_draws(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| !matches!(c, DrawCmd::Blend(_)))
            .count()
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl ParticleSurface for RecordingSurface {
    fn set_blend(&mut self, blend: Blend) {
        self.commands.push(DrawCmd::Blend(blend));
    }

    fn draw_sprite(&mut self, sprite: &Sprite, transform: Affine, dest: Rect, alpha: f64) {
        self.commands.push(DrawCmd::Sprite {
            handle: sprite.handle.clone(),
            transform,
            dest,
            alpha,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: ColorDef, alpha: f64) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }
}

impl<R: RandomSource> EmitterSim<R> {
    /// Draw every live particle, oldest first.
    ///
    /// Additive layers switch the surface to [`Blend::Additive`] for the pass and back to
    /// [`Blend::SourceOver`] afterwards. Particles with zero alpha are skipped.
    pub fn draw<S: ParticleSurface + ?Sized>(&self, surface: &mut S) {
        let additive = self.render_mode() == RenderMode::Additive;
        if additive {
            surface.set_blend(Blend::Additive);
        }

        for p in self.particles() {
            let alpha = p.alpha.clamp(0.0, 1.0);
            if alpha <= 0.0 || alpha.is_nan() {
                continue;
            }
            let size = p.scale.max(0.001) * p.base_size;
            let sprite = self.cells().get(p.cell).and_then(|c| c.sprite.as_deref());
            match sprite {
                Some(sprite) => {
                    let h = size;
                    let w = h * sprite.aspect_ratio();
                    let mut transform = Affine::translate(Vec2::new(p.x, p.y));
                    if p.spin != 0.0 {
                        transform *= Affine::rotate(p.rot);
                    }
                    let dest = Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);
                    surface.draw_sprite(sprite, transform, dest, alpha);
                }
                None => surface.fill_circle(Point::new(p.x, p.y), size / 2.0, p.color, alpha),
            }
        }

        if additive {
            surface.set_blend(Blend::SourceOver);
        }
    }
}

/// Layer-space to canvas-space transform for drawing an emitter layer on a document canvas of
/// height `doc_height`.
///
/// Unflipped layers use a bottom-left origin, so y is mirrored first. The layer is positioned
/// at its `position`, rotated by its rotation (degrees, mirrored when flipped), and centered on
/// its size.
pub fn canvas_transform(layer: &Layer, doc_height: f64) -> Affine {
    let flipped = layer.is_geometry_flipped();
    let base = if flipped {
        Affine::IDENTITY
    } else {
        Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, doc_height])
    };
    let y = if flipped {
        doc_height - layer.position.y
    } else {
        layer.position.y
    };
    let sign = if flipped { -1.0 } else { 1.0 };
    let angle = PI * layer.effective_rotation() / 180.0 * sign;
    base * Affine::translate(Vec2::new(layer.position.x, y))
        * Affine::rotate(angle)
        * Affine::translate(Vec2::new(-layer.size.w / 2.0, -layer.size.h / 2.0))
}

#[cfg(test)]
#[path = "../../tests/unit/emitter/draw.rs"]
mod tests;
