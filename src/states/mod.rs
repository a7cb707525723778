//! States, per-state overrides, and transitions between states.

/// State set and its wire types.
pub mod model;
pub mod project;
/// Planning of state switches.
pub mod transition;
