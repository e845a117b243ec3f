pub mod bench;
pub mod error;
pub mod pool;

pub use bench::{BenchOptions, BenchReport, Benchmark, PhaseResult};
pub use error::RunError;
pub use pool::{AreaPool, ExecMode};
