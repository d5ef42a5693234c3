/// Result alias used across the crate.
pub type InkResult<T> = Result<T, InkError>;

/// Error type for every fallible library operation.
#[derive(thiserror::Error, Debug)]
pub enum InkError {
    /// Input failed a structural or range check.
    #[error("validation error: {0}")]
    Validation(String),

    /// A render resource (ink geometry, ink style, brush, raster target) could not be built.
    #[error("resource error: {0}")]
    Resource(String),

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(String),

    /// (De)serialization of a persisted document failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InkError {
    /// Build an [`InkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`InkError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build an [`InkError::Io`].
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build an [`InkError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
