//! The per-frame export pipeline.
//!
//! - `job`: the immutable `ExportJob` configuration and its validation
//! - `sequencer`: the frame loop driving sampling, sizing, splat building
//!   and serialization, against a host-supplied `MeshEvaluator`

mod job;
mod sequencer;

use crate::io::WriteError;
use crate::sample::SampleError;
use thiserror::Error;

// Re-export public types and functions
pub use job::{ExportJob, SampleMode};
pub use sequencer::{
    build_splat, run_export, ExportReport, FrameArtifact, JobPhase, MeshEvaluator,
    StaticMeshEvaluator,
};

/// Errors that abort an export job.
///
/// The pipeline is fail-fast: the first error stops the job before the next
/// frame starts. Artifacts already written for earlier frames are left in
/// place; each is independently valid.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export job: {0}")]
    InvalidJob(String),

    #[error("frame {frame}: {source}")]
    Sample {
        frame: i32,
        #[source]
        source: SampleError,
    },

    #[error("frame {frame}: mesh evaluation failed: {reason}")]
    FrameEvaluation { frame: i32, reason: String },

    #[error("frame {frame}: {source}")]
    Serialization {
        frame: i32,
        #[source]
        source: WriteError,
    },
}
