use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use super::state::JobStatus;
use crate::core::codec::CodecError;
use crate::core::io::report::ReportError;
use crate::core::symmetry::planner::PlanError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Sequence codec error: {source}")]
    Codec {
        #[from]
        source: CodecError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Symmetry planning failed: {source}")]
    Symmetry {
        #[from]
        source: PlanError,
    },

    #[error("Generation job failed to start: {0}")]
    JobStartup(String),

    #[error(
        "Generation job died during sample {sample} (last completed step {last_completed_step:?}): {reason}"
    )]
    JobRuntime {
        sample: usize,
        last_completed_step: Option<usize>,
        reason: String,
    },

    #[error(
        "Generation job cancelled during sample {sample} (last completed step {last_completed_step:?})"
    )]
    Cancelled {
        sample: usize,
        last_completed_step: Option<usize>,
    },

    #[error("Illegal job state transition from '{from}' to '{to}'")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("No scored candidate among {examined} redesigned sequences")]
    NoCandidate { examined: usize },

    #[error("Sequence redesign failed: {0}")]
    Redesign(String),

    #[error("Failed to read redesign report '{path}': {source}")]
    Report { path: PathBuf, source: ReportError },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
