use std::sync::Arc;

use crate::assets::color::ColorDef;
use crate::assets::store::{CellAssetMap, Sprite, resolve_sprite};
use crate::layers::model::EmitterCellDef;

/// Runtime spawn template. Angles are in radians.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterCell {
    /// Id of the persisted cell.
    pub id: String,
    /// Particles per second (0 under reduced motion).
    pub birth_rate: f64,
    /// Lifetime in seconds.
    pub lifetime: f64,
    /// Lifetime jitter.
    pub lifetime_range: f64,
    /// Emission direction.
    pub emission_longitude: f64,
    /// Emission cone half-angle.
    pub emission_range: f64,
    /// Out-of-plane angle; carried for hosts, not used by the planar integrator.
    pub emission_latitude: f64,
    /// Initial speed.
    pub velocity: f64,
    /// Speed jitter.
    pub velocity_range: f64,
    /// Horizontal acceleration.
    pub x_acceleration: f64,
    /// Vertical acceleration.
    pub y_acceleration: f64,
    /// Fill color when no sprite resolved.
    pub color: ColorDef,
    /// Initial scale.
    pub scale: f64,
    /// Scale jitter.
    pub scale_range: f64,
    /// Scale change per second.
    pub scale_speed: f64,
    /// Initial alpha jitter.
    pub alpha_range: f64,
    /// Alpha change per second.
    pub alpha_speed: f64,
    /// Spin in radians per second.
    pub spin: f64,
    /// Spin jitter in radians per second.
    pub spin_range: f64,
    /// Resolved drawable, if any.
    pub sprite: Option<Arc<Sprite>>,
    acc: f64,
}

impl EmitterCell {
    /// Build the runtime cell for `def`, resolving its sprite from `assets`.
    pub fn realize(def: &EmitterCellDef, assets: &CellAssetMap, reduced_motion: bool) -> Self {
        let color = ColorDef::parse(&def.color).unwrap_or_else(|err| {
            tracing::debug!(cell = %def.id, error = %err, "cell color unreadable, using white");
            ColorDef::WHITE
        });
        let sprite = resolve_sprite(assets, &def.id);
        if sprite.is_none() {
            tracing::debug!(cell = %def.id, "no sprite for cell, drawing circles");
        }
        Self {
            id: def.id.clone(),
            birth_rate: if reduced_motion { 0.0 } else { def.birth_rate },
            lifetime: def.lifetime,
            lifetime_range: def.lifetime_range,
            emission_longitude: def.emission_longitude.to_radians(),
            emission_range: def.emission_range.to_radians(),
            emission_latitude: def.emission_latitude.to_radians(),
            velocity: def.velocity,
            velocity_range: def.velocity_range,
            x_acceleration: def.x_acceleration,
            y_acceleration: def.y_acceleration,
            color,
            scale: def.scale,
            scale_range: def.scale_range,
            scale_speed: def.scale_speed,
            alpha_range: def.alpha_range,
            alpha_speed: def.alpha_speed,
            spin: def.spin.to_radians(),
            spin_range: def.spin_range.to_radians(),
            sprite,
            acc: 0.0,
        }
    }

    /// Base particle size: the sprite's, or 16 without one.
    pub fn base_size(&self) -> f64 {
        self.sprite.as_ref().map_or(16.0, |s| s.base_size())
    }

    /// Fractional spawn carry-over.
    pub fn accumulator(&self) -> f64 {
        self.acc
    }

    // Adds `expected` spawns and returns the whole part, keeping the fraction.
    pub(crate) fn take_spawn_count(&mut self, expected: f64) -> usize {
        if expected.is_finite() {
            self.acc += expected;
        }
        let n = self.acc.floor().max(0.0);
        self.acc -= n;
        n as usize
    }
}
