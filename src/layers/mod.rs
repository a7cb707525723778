//! Layer tree model and the structural algorithms over it.

/// Layer node types.
pub mod model;
pub mod tree;
