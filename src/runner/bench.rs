use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::PlateSet;
use crate::geometry::AreaEngine;
use crate::runner::{AreaPool, ExecMode, RunError};

/// Knobs consumed by the benchmark harness
#[derive(Debug, Clone)]
pub struct BenchOptions {
    /// Worker count for the parallel phase
    pub workers: usize,
    /// Synthetic per-unit latency (zero disables)
    pub latency: Duration,
    /// Optional wall-clock deadline per phase
    pub deadline: Option<Duration>,
    /// Print per-unit timing diagnostics to stderr
    pub per_unit_timing: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            latency: AreaEngine::DEFAULT_LATENCY,
            deadline: None,
            per_unit_timing: false,
        }
    }
}

/// Timing and results for one execution mode
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub mode: ExecMode,
    pub elapsed: Duration,
    pub areas: Vec<f64>,
}

/// Outcome of a full sequential-then-parallel comparison run.
///
/// The report is observational: it records both elapsed times without
/// asserting which mode is faster (that depends on the latency knob and the
/// host's parallelism).
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub sequential: PhaseResult,
    pub parallel: PhaseResult,
}

impl BenchReport {
    /// Assemble a report, verifying both phases computed identical areas
    pub fn from_phases(
        sequential: PhaseResult,
        parallel: PhaseResult,
    ) -> Result<Self, RunError> {
        verify_results(&sequential.areas, &parallel.areas)?;
        Ok(Self {
            sequential,
            parallel,
        })
    }

    /// Sequential elapsed time divided by parallel elapsed time
    pub fn speedup(&self) -> f64 {
        let parallel = self.parallel.elapsed.as_secs_f64();
        if parallel > 0.0 {
            self.sequential.elapsed.as_secs_f64() / parallel
        } else {
            f64::INFINITY
        }
    }

    /// Per-plate areas, in plate-set order
    pub fn areas(&self) -> &[f64] {
        &self.sequential.areas
    }
}

/// Runs the distributor in both modes over one plate set and times each run
pub struct Benchmark {
    pool: AreaPool,
}

impl Benchmark {
    pub fn new(plates: Arc<PlateSet>, opts: &BenchOptions) -> Self {
        let engine =
            AreaEngine::new(opts.latency).with_per_unit_timing(opts.per_unit_timing);
        let pool = AreaPool::new(plates, engine)
            .with_workers(opts.workers)
            .with_deadline(opts.deadline);

        Self { pool }
    }

    /// Run one mode over all units, recording start-to-finish wall-clock time
    pub fn run_phase(&self, mode: ExecMode) -> Result<PhaseResult, RunError> {
        let start = Instant::now();
        let areas = self.pool.run(mode)?;

        Ok(PhaseResult {
            mode,
            elapsed: start.elapsed(),
            areas,
        })
    }

    /// Sequential phase, then parallel phase, then cross-check
    pub fn run(&self) -> Result<BenchReport, RunError> {
        let sequential = self.run_phase(ExecMode::Sequential)?;
        let parallel = self.run_phase(ExecMode::Parallel)?;
        BenchReport::from_phases(sequential, parallel)
    }
}

/// Parallelism must not change numeric outcomes. Both phases run the same
/// instruction sequence per unit, so f64 equality is exact here.
fn verify_results(sequential: &[f64], parallel: &[f64]) -> Result<(), RunError> {
    if sequential.len() != parallel.len() {
        return Err(RunError::ResultMismatch {
            index: sequential.len().min(parallel.len()),
        });
    }

    for (index, (s, p)) in sequential.iter().zip(parallel).enumerate() {
        if s != p {
            return Err(RunError::ResultMismatch { index });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlatePolygon;

    fn sample_set() -> Arc<PlateSet> {
        Arc::new(PlateSet::new(vec![
            PlatePolygon::new("square", vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            PlatePolygon::new("triangle", vec![(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]),
            PlatePolygon::new("wide", vec![(0.0, 0.0), (10.0, 0.0), (10.0, 2.0), (0.0, 2.0)]),
        ]))
    }

    fn quiet_options() -> BenchOptions {
        BenchOptions {
            latency: Duration::ZERO,
            ..BenchOptions::default()
        }
    }

    #[test]
    fn test_report_phases_and_areas() {
        let report = Benchmark::new(sample_set(), &quiet_options())
            .run()
            .unwrap();

        assert_eq!(report.sequential.mode, ExecMode::Sequential);
        assert_eq!(report.parallel.mode, ExecMode::Parallel);
        assert_eq!(report.areas(), &[1.0, 6.0, 20.0]);
        assert_eq!(report.sequential.areas, report.parallel.areas);
    }

    #[test]
    fn test_speedup_is_positive() {
        let opts = BenchOptions {
            latency: Duration::from_millis(2),
            workers: 2,
            ..BenchOptions::default()
        };
        let report = Benchmark::new(sample_set(), &opts).run().unwrap();

        assert!(report.speedup() > 0.0);
        assert!(report.sequential.elapsed >= Duration::from_millis(6));
    }

    #[test]
    fn test_failure_propagates_to_report() {
        let plates = Arc::new(PlateSet::new(vec![PlatePolygon::new(
            "broken",
            vec![(0.0, 0.0), (1.0, 1.0)],
        )]));

        let result = Benchmark::new(plates, &quiet_options()).run();
        assert!(matches!(result, Err(RunError::Geometry(_))));
    }

    #[test]
    fn test_deadline_propagates_to_report() {
        let opts = BenchOptions {
            latency: Duration::from_millis(5),
            deadline: Some(Duration::ZERO),
            ..BenchOptions::default()
        };

        let result = Benchmark::new(sample_set(), &opts).run();
        assert!(matches!(result, Err(RunError::Timeout { .. })));
    }

    #[test]
    fn test_verify_results_detects_mismatch() {
        let seq = PhaseResult {
            mode: ExecMode::Sequential,
            elapsed: Duration::from_millis(1),
            areas: vec![1.0, 2.0, 3.0],
        };
        let par = PhaseResult {
            mode: ExecMode::Parallel,
            elapsed: Duration::from_millis(1),
            areas: vec![1.0, 9.0, 3.0],
        };

        let err = BenchReport::from_phases(seq, par).unwrap_err();
        assert!(matches!(err, RunError::ResultMismatch { index: 1 }));
    }

    #[test]
    fn test_verify_results_detects_length_mismatch() {
        let seq = PhaseResult {
            mode: ExecMode::Sequential,
            elapsed: Duration::ZERO,
            areas: vec![1.0, 2.0],
        };
        let par = PhaseResult {
            mode: ExecMode::Parallel,
            elapsed: Duration::ZERO,
            areas: vec![1.0],
        };

        let err = BenchReport::from_phases(seq, par).unwrap_err();
        assert!(matches!(err, RunError::ResultMismatch { index: 1 }));
    }
}
