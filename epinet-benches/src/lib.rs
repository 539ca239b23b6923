//! Benchmark support crate for epinet.
//!
//! Provides seeded network fixtures and parameter types used by the
//! Criterion benchmarks for topology generation, structural analysis and
//! epidemic simulation.

pub mod error;
pub mod fixtures;
pub mod params;
