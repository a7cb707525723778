use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::assets::store::CellAssetMap;
use crate::emitter::cell::EmitterCell;
use crate::foundation::core::{SizeDef, Vec2Def};
use crate::foundation::error::{CaError, CaResult};
use crate::foundation::rng::{RandomSource, Rng64};
use crate::layers::model::{EmitterMode, EmitterShape, Layer, RenderMode};

/// Default bound on simultaneously live particles.
pub const DEFAULT_CAPACITY: usize = 4000;

/// What realize does with shapes that have no sampling implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapePolicy {
    /// Fail with [`CaError::UnsupportedShape`].
    #[default]
    Reject,
    /// Emit from the anchor point and log a warning.
    FallbackToPoint,
}

/// Options for [`EmitterSim::realize`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealizeOpts {
    /// Maximum live particles; the oldest is evicted past this bound.
    pub capacity: usize,
    /// Force every cell's birth rate to 0.
    pub reduced_motion: bool,
    /// RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Handling of unsampled emission shapes.
    pub shape_policy: ShapePolicy,
}

impl Default for RealizeOpts {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            reduced_motion: false,
            seed: None,
            shape_policy: ShapePolicy::Reject,
        }
    }
}

/// One live (or pooled) particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x.
    pub vx: f64,
    /// Velocity y.
    pub vy: f64,
    /// Rotation in radians.
    pub rot: f64,
    /// Spin in radians per second.
    pub spin: f64,
    /// Remaining life in seconds.
    pub life: f64,
    /// Current alpha, unclamped.
    pub alpha: f64,
    /// Current scale.
    pub scale: f64,
    /// Size at scale 1.
    pub base_size: f64,
    /// Fill color.
    pub color: ColorDef,
    /// Index of the originating cell.
    pub cell: usize,
}

impl Particle {
    fn blank() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            rot: 0.0,
            spin: 0.0,
            life: 0.0,
            alpha: 0.0,
            scale: 0.0,
            base_size: 0.0,
            color: ColorDef::WHITE,
            cell: 0,
        }
    }
}

/// Counters since realize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Particles spawned.
    pub spawned: u64,
    /// Spawns served from the pool.
    pub recycled: u64,
    /// Live particles evicted by the capacity bound.
    pub evicted: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Emission {
    position: Vec2Def,
    size: SizeDef,
    shape: EmitterShape,
    mode: EmitterMode,
}

impl Emission {
    fn point<R: RandomSource>(&self, rng: &mut R) -> (f64, f64) {
        let (ex, ey) = (self.position.x, self.position.y);
        let (w, h) = (self.size.w, self.size.h);
        match self.shape {
            EmitterShape::Line => {
                let t = rng.next_f64() * w - w / 2.0;
                if self.mode == EmitterMode::Volume {
                    let v = (rng.next_f64() - 0.5) * h.max(1.0);
                    (ex + t, ey + v)
                } else {
                    (ex + t, ey)
                }
            }
            EmitterShape::Rectangle if self.mode == EmitterMode::Outline => {
                let mut d = rng.next_f64() * 2.0 * (w + h);
                if d < w {
                    return (ex - w / 2.0 + d, ey - h / 2.0);
                }
                d -= w;
                if d < h {
                    return (ex + w / 2.0, ey - h / 2.0 + d);
                }
                d -= h;
                if d < w {
                    return (ex + w / 2.0 - d, ey + h / 2.0);
                }
                d -= w;
                (ex - w / 2.0, ey + h / 2.0 - d)
            }
            EmitterShape::Rectangle => {
                let x = ex + (rng.next_f64() - 0.5) * w;
                let y = ey + (rng.next_f64() - 0.5) * h;
                (x, y)
            }
            // Unsampled shapes are rejected or downgraded to a point at realize.
            EmitterShape::Point
            | EmitterShape::Cuboid
            | EmitterShape::Circle
            | EmitterShape::Sphere => (ex, ey),
        }
    }
}

/// Particle simulator for one emitter layer.
///
/// Realized from a layer once, then advanced with [`EmitterSim::step`] independently of the
/// document. Dropping it (or no longer stepping it) stops the simulation.
#[derive(Clone, Debug)]
pub struct EmitterSim<R: RandomSource = Rng64> {
    emission: Emission,
    render_mode: RenderMode,
    birth_rate: f64,
    lifetime: f64,
    cells: Vec<EmitterCell>,
    live: VecDeque<Particle>,
    pool: Vec<Particle>,
    capacity: usize,
    rng: R,
    stats: SimStats,
}

impl EmitterSim<Rng64> {
    /// Build a simulator from an emitter layer.
    ///
    /// Fails when `layer` is not an emitter, when `opts.capacity` is 0, or when the emission
    /// shape is unsampled and `opts.shape_policy` is [`ShapePolicy::Reject`].
    #[tracing::instrument(skip(layer, assets, opts), fields(layer_id = %layer.id()))]
    pub fn realize(layer: &Layer, assets: &CellAssetMap, opts: &RealizeOpts) -> CaResult<Self> {
        let rng = match opts.seed {
            Some(seed) => Rng64::new(seed),
            None => Rng64::from_entropy(),
        };
        Self::realize_with_rng(layer, assets, opts, rng)
    }
}

impl<R: RandomSource> EmitterSim<R> {
    /// [`EmitterSim::realize`] with a caller-supplied random source; `opts.seed` is ignored.
    pub fn realize_with_rng(
        layer: &Layer,
        assets: &CellAssetMap,
        opts: &RealizeOpts,
        rng: R,
    ) -> CaResult<Self> {
        let Some(props) = layer.kind.as_emitter() else {
            return Err(CaError::validation(format!(
                "layer '{}' is a {} layer, not an emitter",
                layer.id(),
                layer.kind.type_name()
            )));
        };
        if opts.capacity == 0 {
            return Err(CaError::validation("emitter capacity must be > 0"));
        }

        let mut shape = props.emitter_shape;
        if !shape.is_sampled() {
            match opts.shape_policy {
                ShapePolicy::Reject => {
                    return Err(CaError::unsupported_shape(shape.as_str()));
                }
                ShapePolicy::FallbackToPoint => {
                    tracing::warn!(
                        layer_id = %layer.id(),
                        shape = shape.as_str(),
                        "emitter shape is not sampled, emitting from the anchor point"
                    );
                    shape = EmitterShape::Point;
                }
            }
        }

        let cells: Vec<EmitterCell> = props
            .emitter_cells
            .iter()
            .map(|def| EmitterCell::realize(def, assets, opts.reduced_motion))
            .collect();
        tracing::debug!(
            cells = cells.len(),
            shape = shape.as_str(),
            capacity = opts.capacity,
            reduced_motion = opts.reduced_motion,
            "emitter realized"
        );

        Ok(Self {
            emission: Emission {
                position: props.emitter_position,
                size: props.emitter_size,
                shape,
                mode: props.emitter_mode,
            },
            render_mode: props.render_mode,
            birth_rate: props.birth_rate.unwrap_or(1.0),
            lifetime: props.lifetime.unwrap_or(1.0),
            cells,
            live: VecDeque::new(),
            pool: Vec::new(),
            capacity: opts.capacity,
            rng,
            stats: SimStats::default(),
        })
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Spawning happens before integration, so particles born in this step already age by `dt`.
    /// Non-positive or non-finite `dt` is ignored.
    pub fn step(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let layer_rate = self.birth_rate * self.lifetime.max(0.0);
        for i in 0..self.cells.len() {
            let expected = self.cells[i].birth_rate * layer_rate * dt;
            let n = self.cells[i].take_spawn_count(expected);
            for _ in 0..n {
                self.spawn(i);
            }
        }

        let cells = &self.cells;
        let pool = &mut self.pool;
        self.live.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                pool.push(*p);
                return false;
            }
            if let Some(cell) = cells.get(p.cell) {
                p.vx += cell.x_acceleration * dt;
                p.vy += cell.y_acceleration * dt;
                p.scale += cell.scale_speed * dt;
                p.alpha += cell.alpha_speed * dt;
            }
            p.rot += p.spin * dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            true
        });
    }

    fn spawn(&mut self, idx: usize) {
        let cell = &self.cells[idx];
        let rng = &mut self.rng;

        let life = rng.spread(cell.lifetime, cell.lifetime_range);
        if life <= 0.0 {
            return;
        }
        let speed = rng.spread(cell.velocity, cell.velocity_range);
        let angle = rng.spread(cell.emission_longitude, cell.emission_range);
        let (x, y) = self.emission.point(rng);
        let scale = rng.spread(cell.scale, cell.scale_range);
        let alpha = rng.spread(1.0, cell.alpha_range);
        let spin = rng.spread(cell.spin, cell.spin_range);

        let mut p = match self.pool.pop() {
            Some(p) => {
                self.stats.recycled += 1;
                p
            }
            None => Particle::blank(),
        };
        p.x = x;
        p.y = y;
        p.vx = angle.cos() * speed;
        p.vy = angle.sin() * speed;
        p.rot = 0.0;
        p.spin = spin;
        p.life = life;
        p.alpha = alpha;
        p.scale = scale;
        p.base_size = cell.base_size();
        p.color = cell.color;
        p.cell = idx;

        self.live.push_back(p);
        self.stats.spawned += 1;
        if self.live.len() > self.capacity
            && let Some(old) = self.live.pop_front()
        {
            self.pool.push(old);
            self.stats.evicted += 1;
        }
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.live.iter()
    }

    /// Number of live particles.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of pooled particle records.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Live particle bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Runtime cells in layer order.
    pub fn cells(&self) -> &[EmitterCell] {
        &self.cells
    }

    /// Mutable runtime cells, for hosts that retune a running emitter.
    pub fn cells_mut(&mut self) -> &mut [EmitterCell] {
        &mut self.cells
    }

    /// Compositing mode of the layer.
    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Emission shape in effect (after any fallback).
    pub fn shape(&self) -> EmitterShape {
        self.emission.shape
    }

    /// Spawn counters.
    pub fn stats(&self) -> SimStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/emitter/sim.rs"]
mod tests;
