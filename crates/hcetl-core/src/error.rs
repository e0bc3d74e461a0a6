use std::fmt;

use hcetl_ingest::SourceError;
use hcetl_load::SinkError;
use hcetl_model::{SchemaError, TransformError};
use hcetl_transform::NormalizeError;
use serde::Serialize;
use thiserror::Error;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Normalize,
    Dimensions,
    Facts,
    Load,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Normalize => "normalize",
            Self::Dimensions => "dimensions",
            Self::Facts => "facts",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal pipeline failure tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub kind: PipelineErrorKind,
}

impl PipelineError {
    pub fn new(stage: Stage, kind: impl Into<PipelineErrorKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum PipelineErrorKind {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Cancellation was requested before this stage started.
    #[error("cancelled before the stage started")]
    Cancelled,
}

impl From<NormalizeError> for PipelineErrorKind {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Schema(err) => Self::Schema(err),
            NormalizeError::Transform(err) => Self::Transform(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_stage() {
        let err = PipelineError::new(
            Stage::Normalize,
            SchemaError::MissingColumn {
                column: "hospital".into(),
                available: "name".into(),
            },
        );
        assert_eq!(err.to_string(), "normalize stage failed");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("required column 'hospital' not found (available: name)")
        );
    }
}
