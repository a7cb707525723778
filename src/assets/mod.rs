//! Asset-facing helpers. Asset references are opaque; nothing here performs IO.

pub(crate) mod color;
pub(crate) mod store;
