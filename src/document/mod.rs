//! Project documents and editing sessions.

/// Single-root bundle exchange.
pub mod bundle;
pub mod editor;
/// Persisted project shapes.
pub mod model;
