//! Error taxonomy for the analysis pipeline.
//!
//! File-level errors (`Io`, `Syntax`) are reported per file and never abort
//! sibling files. Function-level AI errors (`Template`, `Render`, `Backend`)
//! are folded into an `ai_error` finding by the aggregator.

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::BackendError;

/// Errors raised while selecting, parsing or analyzing Go sources.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}:{column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("prompt template: {0}")]
    Template(String),
    #[error("prompt render: {0}")]
    Render(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}
