//! Benchmark setup error type.
//!
//! Setup functions propagate failures with `?`; the bench entry points turn
//! them into a panic with context.

use epinet_core::{GeneratorError, NetworkError, SimulationError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Topology generation failed.
    #[error("network generation failed: {0}")]
    Generator(#[from] GeneratorError),
    /// A network primitive failed.
    #[error("network operation failed: {0}")]
    Network(#[from] NetworkError),
    /// Simulation parameters or seeding were rejected.
    #[error("simulation setup failed: {0}")]
    Simulation(#[from] SimulationError),
}
