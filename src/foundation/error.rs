use std::path::PathBuf;

use crate::index::extract::TimestampField;

/// Result alias used across the crate.
pub type LapseResult<T> = Result<T, LapseError>;

/// Error type for indexing, alignment, materialization and clock rendering.
#[derive(thiserror::Error, Debug)]
pub enum LapseError {
    /// Invalid caller-provided parameters (raster bounds, clock time, sizes, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested timestamp field is absent on a source image.
    ///
    /// Fatal for an indexing run: without a timestamp the frame cannot be placed.
    #[error("missing metadata: '{field}' not found on '{}'", .path.display())]
    MissingMetadata {
        /// Image that lacks the field.
        path: PathBuf,
        /// Field that was requested.
        field: TimestampField,
    },

    /// Scene emission or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Manifest (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LapseError {
    /// Build a [`LapseError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LapseError::MissingMetadata`].
    pub fn missing_metadata(path: impl Into<PathBuf>, field: TimestampField) -> Self {
        Self::MissingMetadata {
            path: path.into(),
            field,
        }
    }

    /// Build a [`LapseError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LapseError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
