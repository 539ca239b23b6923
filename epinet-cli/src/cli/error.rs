//! Errors surfaced while executing CLI commands.

use std::{io, path::PathBuf, process::ExitCode};

use epinet_core::{GeneratorError, NetworkError, SimulationError};
use epinet_providers_edgelist::EdgeListError;
use thiserror::Error;

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while reading or writing a network.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Writing the summary to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    /// A flag combination the commands cannot act on.
    #[error("invalid --{name}: {reason}")]
    InvalidArgument {
        /// Flag name without dashes.
        name: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A Gillespie run with waning immunity was requested without `--limit`.
    #[error("waning immunity can sustain an epidemic forever; pass --limit")]
    UnboundedRun,
    /// Edge-list ingestion or export failed.
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),
    /// A network primitive failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// Topology generation failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// The simulation rejected its parameters or state.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl CliError {
    /// Stable machine-readable code, delegating to the wrapped error's code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CLI_IO",
            Self::Output(_) => "CLI_OUTPUT",
            Self::InvalidArgument { .. } => "CLI_INVALID_ARGUMENT",
            Self::UnboundedRun => "CLI_UNBOUNDED_RUN",
            Self::EdgeList(inner) => inner.code().as_str(),
            Self::Network(inner) => inner.code().as_str(),
            Self::Generator(inner) => inner.code().as_str(),
            Self::Simulation(inner) => inner.code().as_str(),
        }
    }

    /// Process exit status: 2 for unusable arguments, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidArgument { .. }
            | Self::UnboundedRun
            | Self::Generator(GeneratorError::InvalidParameter { .. })
            | Self::Simulation(SimulationError::InvalidParameter { .. }) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}
