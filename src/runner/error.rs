use std::time::Duration;

use thiserror::Error;

use crate::geometry::GeometryError;

/// Failures surfaced by a benchmark run. The first failure aborts the
/// affected phase; no partial or default area values are ever emitted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("worker pool failure: {0}")]
    WorkerFailure(String),

    #[error("run exceeded its deadline after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("sequential and parallel results differ at index {index}")]
    ResultMismatch { index: usize },
}
