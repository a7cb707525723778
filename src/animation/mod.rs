//! Per-layer keyframe tracks and their editing helpers.

pub mod edit;
/// Keyframe track model and sampling.
pub mod keyframes;
