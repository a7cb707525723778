//! Particle emitter simulation.
//!
//! An emitter layer is realized into an [`sim::EmitterSim`], stepped with a fixed or clock-driven
//! `dt`, and drawn onto any [`draw::ParticleSurface`].

/// Runtime spawn templates.
pub mod cell;
/// Frame timing.
pub mod clock;
pub mod draw;
/// Simulator state and stepping.
pub mod sim;
