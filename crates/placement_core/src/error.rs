//! crates/placement_core/src/error.rs

use crate::ports::PortError;

/// Errors surfaced by the pipelines and view-state operations.
///
/// Remote generation failures never show up here: they degrade to "no content".
#[derive(Debug, thiserror::Error)]
pub enum GuidanceError {
    /// A required field was missing or blank. Nothing was changed.
    #[error("{0}")]
    Validation(String),

    /// The action depends on content that has not been generated yet.
    #[error("{0}")]
    MissingPrerequisite(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

pub type GuidanceResult<T> = Result<T, GuidanceError>;

/// Rejects blank strings with a validation error naming the field.
pub(crate) fn require(value: &str, field: &str) -> GuidanceResult<()> {
    if value.trim().is_empty() {
        Err(GuidanceError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
