/// Convenience result type used across caforge.
pub type CaResult<T> = Result<T, CaError>;

/// Top-level error taxonomy used by library APIs.
///
/// Not-found conditions in tree operations are never errors; they are signalled through return
/// values. Only invariant violations and strict-boundary rejections end up here.
#[derive(thiserror::Error, Debug)]
pub enum CaError {
    /// Invalid user-provided or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Two nodes in one tree share an id.
    #[error("duplicate layer id: {0}")]
    DuplicateId(String),

    /// Emitter shape that has no sampling implementation.
    #[error("unsupported emitter shape: {0}")]
    UnsupportedShape(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaError {
    /// Build a [`CaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaError::DuplicateId`] value.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId(id.into())
    }

    /// Build a [`CaError::UnsupportedShape`] value.
    pub fn unsupported_shape(shape: impl Into<String>) -> Self {
        Self::UnsupportedShape(shape.into())
    }

    /// Build a [`CaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
