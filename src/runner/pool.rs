use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::ThreadPoolBuilder;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::domain::PlateSet;
use crate::geometry::AreaEngine;
use crate::runner::RunError;

/// Execution strategy for a benchmark phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel,
}

impl ExecMode {
    pub fn label(&self) -> &'static str {
        match self {
            ExecMode::Sequential => "sequential",
            ExecMode::Parallel => "parallel",
        }
    }
}

/// Distributes per-plate area computations over a worker pool.
///
/// The plate set is captured once at construction as a read-only snapshot
/// shared by every worker; per-unit dispatch passes only the plate index.
/// Results always come back in plate-set order, whatever order the workers
/// finish in. The first failing unit aborts the run; completed results from
/// other workers are discarded, never substituted or corrupted.
pub struct AreaPool {
    plates: Arc<PlateSet>,
    engine: AreaEngine,
    workers: usize,
    deadline: Option<Duration>,
}

impl AreaPool {
    /// Create a pool over the given plates, defaulting to one worker per
    /// available CPU
    pub fn new(plates: Arc<PlateSet>, engine: AreaEngine) -> Self {
        Self {
            plates,
            engine,
            workers: num_cpus::get().max(1),
            deadline: None,
        }
    }

    /// Use exactly `workers` workers in parallel mode (minimum 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Abort a run whose wall-clock time exceeds `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Compute every plate's area, returning results in plate-set order
    pub fn run(&self, mode: ExecMode) -> Result<Vec<f64>, RunError> {
        match mode {
            ExecMode::Sequential => self.run_sequential(),
            ExecMode::Parallel => self.run_parallel(),
        }
    }

    fn compute_unit(&self, index: usize, started: Instant) -> Result<f64, RunError> {
        if let Some(deadline) = self.deadline
            && started.elapsed() > deadline
        {
            return Err(RunError::Timeout {
                elapsed: started.elapsed(),
            });
        }

        Ok(self.engine.area_of(index, &self.plates[index])?)
    }

    /// Strictly ordered execution in the calling thread
    fn run_sequential(&self) -> Result<Vec<f64>, RunError> {
        let started = Instant::now();
        let mut areas = Vec::with_capacity(self.plates.len());

        for index in 0..self.plates.len() {
            areas.push(self.compute_unit(index, started)?);
        }

        Ok(areas)
    }

    /// Fixed-size rayon pool; the indexed collect preserves input order and
    /// short-circuits on the first error
    fn run_parallel(&self) -> Result<Vec<f64>, RunError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| RunError::WorkerFailure(e.to_string()))?;

        let started = Instant::now();

        pool.install(|| {
            (0..self.plates.len())
                .into_par_iter()
                .map(|index| self.compute_unit(index, started))
                .collect()
        })
    }
}
