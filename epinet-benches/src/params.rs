//! Benchmark parameter types.
//!
//! Each type renders as a compact `BenchmarkId` parameter.

use std::fmt;

/// Parameters for a random-network benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct NetworkBenchParams {
    /// Number of nodes.
    pub nodes: usize,
    /// Target mean degree.
    pub mean_degree: f64,
}

impl fmt::Display for NetworkBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={}", self.nodes, self.mean_degree)
    }
}

/// Parameters for an epidemic benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct EpidemicBenchParams {
    /// Number of nodes.
    pub nodes: usize,
    /// Per-contact transmissibility, or contact rate for Gillespie runs.
    pub transmission: f64,
}

impl fmt::Display for EpidemicBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},t={}", self.nodes, self.transmission)
    }
}
