//! Shared building blocks: wire geometry types, errors, ids and deterministic randomness.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod ids;
pub(crate) mod rng;
