//! Command-line interface for building contact networks and running
//! epidemics on them.
//!
//! `generate` builds a topology and reports its structure; `simulate` builds
//! or loads a network, seeds an outbreak and runs one engine to exhaustion.

mod commands;
mod error;
mod network;
mod summary;

pub use commands::{
    Cli, Command, EngineKind, GenerateCommand, SimulateCommand, TopologyArgs, TopologyKind,
    run_cli,
};
pub use error::CliError;
pub use summary::{
    EpidemicSummary, ExecutionSummary, NetworkSummary, StepRecord, render_summary,
};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
