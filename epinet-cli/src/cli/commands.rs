//! Argument parsing and command execution.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use epinet_core::{
    ChainBinomialParams, ChainBinomialSim, EpidemicProcess, GillespieSeirs, Network,
    PercolationParams, PercolationSim, SeirsParams,
};
use tracing::{Span, field, info, instrument};

use super::{
    error::CliError,
    network::{build_network, load_network, write_network},
    summary::{EpidemicSummary, ExecutionSummary, NetworkSummary, StepRecord},
};

const DEFAULT_NODES: usize = 1_000;
const DEFAULT_MEAN_DEGREE: f64 = 4.0;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "epinet", about = "Build contact networks and simulate epidemics on them.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build a topology and report its structure.
    Generate(GenerateCommand),
    /// Run an epidemic over a generated or loaded network.
    Simulate(SimulateCommand),
}

/// Topology families the CLI can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopologyKind {
    /// Erdős–Rényi random graph with mean degree `--mean-degree`.
    ErdosRenyi,
    /// Sparse random graph by rejection sampling.
    FastRandom,
    /// Ring lattice joining each node to `--k` neighbours on each side.
    Ring,
    /// Open square lattice with `--rows` rows.
    Square,
    /// Watts-Strogatz small world rewiring a ring with probability `--rewire`.
    SmallWorld,
    /// Configuration model with Poisson degrees.
    Poisson,
    /// Configuration model with exponential degrees of scale `--cutoff`.
    Exponential,
    /// Configuration model with power-law degrees (`--exponent`, `--cutoff`).
    PowerLaw,
}

impl TopologyKind {
    /// Stable label for logs and summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ErdosRenyi => "erdos-renyi",
            Self::FastRandom => "fast-random",
            Self::Ring => "ring",
            Self::Square => "square",
            Self::SmallWorld => "small-world",
            Self::Poisson => "poisson",
            Self::Exponential => "exponential",
            Self::PowerLaw => "power-law",
        }
    }
}

/// Options shared by every command that builds a network.
#[derive(Debug, Args, Clone)]
pub struct TopologyArgs {
    /// Topology family.
    #[arg(long, value_enum, default_value_t = TopologyKind::Poisson)]
    pub topology: TopologyKind,

    /// Number of nodes.
    #[arg(long, default_value_t = DEFAULT_NODES)]
    pub nodes: usize,

    /// Target mean degree for random graphs and the Poisson model.
    #[arg(long = "mean-degree", default_value_t = DEFAULT_MEAN_DEGREE)]
    pub mean_degree: f64,

    /// Neighbours on each side for ring and small-world lattices.
    #[arg(long, default_value_t = 2)]
    pub k: usize,

    /// Rows of the square lattice; the node count must be a multiple.
    #[arg(long)]
    pub rows: Option<usize>,

    /// Join diagonal neighbours in the square lattice.
    #[arg(long)]
    pub diagonals: bool,

    /// Rewiring probability for small worlds.
    #[arg(long, default_value_t = 0.1)]
    pub rewire: f64,

    /// Power-law exponent.
    #[arg(long, default_value_t = 2.5)]
    pub exponent: f64,

    /// Exponential scale or power-law cutoff.
    #[arg(long, default_value_t = 20.0)]
    pub cutoff: f64,

    /// Build a directed network where the topology allows it.
    #[arg(long)]
    pub directed: bool,

    /// Seed for reproducible networks and runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for TopologyArgs {
    fn default() -> Self {
        Self {
            topology: TopologyKind::Poisson,
            nodes: DEFAULT_NODES,
            mean_degree: DEFAULT_MEAN_DEGREE,
            k: 2,
            rows: None,
            diagonals: false,
            rewire: 0.1,
            exponent: 2.5,
            cutoff: 20.0,
            directed: false,
            seed: None,
        }
    }
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone, Default)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub topology: TopologyArgs,

    /// Write the network as an edge list to this path.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Epidemic engines selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Continuous-time SEIRS.
    Gillespie,
    /// Synchronous percolation rounds.
    Percolation,
    /// Day-bucketed chain binomial.
    ChainBinomial,
}

/// Options accepted by the `simulate` command.
#[derive(Debug, Args, Clone)]
pub struct SimulateCommand {
    #[command(flatten)]
    pub topology: TopologyArgs,

    /// Load the network from an edge list instead of generating it.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Engine to run.
    #[arg(long, value_enum, default_value_t = EngineKind::Percolation)]
    pub engine: EngineKind,

    /// Number of initially infected nodes.
    #[arg(long, default_value_t = 1)]
    pub initial: usize,

    /// Per-contact transmissibility for percolation and chain binomial.
    #[arg(long, default_value_t = 0.5)]
    pub transmissibility: f64,

    /// Infectious period in days for the chain binomial.
    #[arg(long, default_value_t = 3)]
    pub period: u32,

    /// Onset rate (exposed to infectious) for Gillespie runs.
    #[arg(long = "onset-rate", default_value_t = 1.0)]
    pub onset_rate: f64,

    /// Contact rate for Gillespie runs.
    #[arg(long = "contact-rate", default_value_t = 1.0)]
    pub contact_rate: f64,

    /// Recovery rate for Gillespie runs.
    #[arg(long = "recovery-rate", default_value_t = 1.0)]
    pub recovery_rate: f64,

    /// Immunity duration for Gillespie runs; immunity is permanent when
    /// omitted.
    #[arg(long = "immunity-duration")]
    pub immunity_duration: Option<f64>,

    /// Stop after this much simulated time.
    #[arg(long)]
    pub limit: Option<f64>,
}

impl Default for SimulateCommand {
    fn default() -> Self {
        Self {
            topology: TopologyArgs::default(),
            input: None,
            engine: EngineKind::Percolation,
            initial: 1,
            transmissibility: 0.5,
            period: 3,
            onset_rate: 1.0,
            contact_rate: 1.0,
            recovery_rate: 1.0,
            immunity_duration: None,
            limit: None,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the network cannot be built or loaded, or the
/// simulation rejects its parameters.
///
/// # Examples
/// ```
/// use epinet_cli::cli::{Cli, Command, GenerateCommand, TopologyArgs, TopologyKind, run_cli};
///
/// let cli = Cli {
///     command: Command::Generate(GenerateCommand {
///         topology: TopologyArgs {
///             topology: TopologyKind::Ring,
///             nodes: 10,
///             k: 1,
///             seed: Some(1),
///             ..TopologyArgs::default()
///         },
///         output: None,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.network.edges, 10);
/// # Ok::<(), epinet_cli::cli::CliError>(())
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Generate(generate) => {
            Span::current().record("command", field::display("generate"));
            run_generate(generate)
        }
        Command::Simulate(simulate) => {
            Span::current().record("command", field::display("simulate"));
            run_simulate(simulate)
        }
    }
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(topology = command.topology.topology.label(), nodes = command.topology.nodes),
)]
pub(super) fn run_generate(command: GenerateCommand) -> Result<ExecutionSummary, CliError> {
    let net = build_network(&command.topology)?;
    if let Some(path) = &command.output {
        write_network(&net, path)?;
    }
    let network = NetworkSummary::of(&net);
    info!(nodes = network.nodes, edges = network.edges, "network generated");
    Ok(ExecutionSummary {
        command: "generate",
        network,
        epidemic: None,
    })
}

#[instrument(
    name = "cli.simulate",
    err,
    skip(command),
    fields(engine = field::Empty, source = field::Empty),
)]
pub(super) fn run_simulate(command: SimulateCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    let mut net = match &command.input {
        Some(path) => {
            span.record("source", field::display("edge-list"));
            load_network(path, &command.topology)?
        }
        None => {
            span.record("source", field::display(command.topology.topology.label()));
            build_network(&command.topology)?
        }
    };
    let network = NetworkSummary::of(&net);

    if command.engine == EngineKind::Gillespie
        && command.immunity_duration.is_some()
        && command.limit.is_none()
    {
        return Err(CliError::UnboundedRun);
    }
    let mut process = engine(&mut net, &command)?;
    span.record("engine", field::display(process.name()));
    let epidemic = run_process(&mut process, command.initial, command.limit)?;
    info!(
        engine = epidemic.engine,
        size = epidemic.epidemic_size,
        duration = epidemic.duration,
        "simulation completed"
    );
    Ok(ExecutionSummary {
        command: "simulate",
        network,
        epidemic: Some(epidemic),
    })
}

fn engine<'net>(
    net: &'net mut Network,
    command: &SimulateCommand,
) -> Result<EpidemicProcess<'net>, CliError> {
    let process = match command.engine {
        EngineKind::Gillespie => {
            let mut builder = SeirsParams::builder()
                .with_mu(command.onset_rate)
                .with_beta(command.contact_rate)
                .with_gamma(command.recovery_rate);
            if let Some(duration) = command.immunity_duration {
                builder = builder.with_immunity_duration(duration);
            }
            GillespieSeirs::new(net, builder.build()?).into()
        }
        EngineKind::Percolation => {
            PercolationSim::new(net, PercolationParams::new(command.transmissibility)?).into()
        }
        EngineKind::ChainBinomial => ChainBinomialSim::new(
            net,
            ChainBinomialParams::new(command.transmissibility, command.period)?,
        )
        .into(),
    };
    Ok(process)
}

/// Seeds `initial` infections and runs `process` in windows of at most one
/// time unit until it runs dry or `limit` time has passed, recording state
/// counts after every window that moved the clock.
pub(super) fn run_process(
    process: &mut EpidemicProcess<'_>,
    initial: usize,
    limit: Option<f64>,
) -> Result<EpidemicSummary, CliError> {
    process.rand_infect(initial)?;
    let start = process.time();
    let mut steps = vec![StepRecord::of(process)];
    let mut last_recorded = start;
    let mut elapsed = 0.0;
    while !process.is_exhausted() {
        let window = limit.map_or(1.0, |limit| (limit - elapsed).min(1.0));
        if window <= 0.0 {
            break;
        }
        process.run_simulation(Some(window))?;
        elapsed += window;
        if process.time() > last_recorded {
            last_recorded = process.time();
            steps.push(StepRecord::of(process));
        }
    }
    Ok(EpidemicSummary {
        engine: process.name(),
        epidemic_size: process.epidemic_size(),
        duration: process.time() - start,
        steps,
    })
}
