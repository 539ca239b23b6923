//! Command results and their text rendering.

use std::io::{self, Write};

use epinet_core::{CancelToken, EpidemicProcess, Network, StateCounts, analysis};

/// Structural overview of a network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    /// Live nodes.
    pub nodes: usize,
    /// Connections: arcs when directed, undirected pairs otherwise.
    pub edges: usize,
    /// Mean outbound degree.
    pub mean_degree: f64,
    /// Number of connected components.
    pub components: usize,
    /// Size of the largest component.
    pub largest_component: usize,
    /// No stubs, self-loops or parallel edges.
    pub simple: bool,
}

impl NetworkSummary {
    /// Summarises `net`.
    #[must_use]
    pub fn of(net: &Network) -> Self {
        let parts = analysis::components(net, &CancelToken::new());
        Self {
            nodes: net.size(),
            edges: net.edge_count(),
            mean_degree: analysis::mean_degree(net),
            components: parts.len(),
            largest_component: parts.iter().map(Vec::len).max().unwrap_or(0),
            simple: analysis::is_simple(net),
        }
    }
}

/// State counts at one point of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Engine clock.
    pub time: f64,
    /// Nodes per state.
    pub counts: StateCounts,
}

impl StepRecord {
    pub(super) fn of(process: &EpidemicProcess<'_>) -> Self {
        Self {
            time: process.time(),
            counts: process.state_counts(),
        }
    }
}

/// Outcome of one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct EpidemicSummary {
    /// Engine name.
    pub engine: &'static str,
    /// Recoveries over the run.
    pub epidemic_size: usize,
    /// Simulated time covered.
    pub duration: f64,
    /// Counts at the start, at least once per unit of time, and at the end.
    pub steps: Vec<StepRecord>,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Command that produced the summary.
    pub command: &'static str,
    /// The network the command built or loaded.
    pub network: NetworkSummary,
    /// Present for `simulate`.
    pub epidemic: Option<EpidemicSummary>,
}

/// Renders `summary` to `writer` in a human-readable text format, with one
/// tab-separated row per recorded step.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// use epinet_cli::cli::{ExecutionSummary, NetworkSummary, render_summary};
///
/// let summary = ExecutionSummary {
///     command: "generate",
///     network: NetworkSummary {
///         nodes: 4,
///         edges: 4,
///         mean_degree: 2.0,
///         components: 1,
///         largest_component: 4,
///         simple: true,
///     },
///     epidemic: None,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer).unwrap();
/// assert!(text.starts_with("command: generate\nnodes: 4\n"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let network = &summary.network;
    writeln!(writer, "command: {}", summary.command)?;
    writeln!(writer, "nodes: {}", network.nodes)?;
    writeln!(writer, "edges: {}", network.edges)?;
    writeln!(writer, "mean degree: {:.3}", network.mean_degree)?;
    writeln!(
        writer,
        "components: {} (largest {})",
        network.components, network.largest_component
    )?;
    writeln!(writer, "simple: {}", network.simple)?;

    let Some(epidemic) = &summary.epidemic else {
        return Ok(());
    };
    writeln!(writer, "engine: {}", epidemic.engine)?;
    writeln!(writer, "epidemic size: {}", epidemic.epidemic_size)?;
    writeln!(writer, "duration: {:.3}", epidemic.duration)?;
    writeln!(writer, "time\tS\tE\tI\tR")?;
    for step in &epidemic.steps {
        let counts = step.counts;
        writeln!(
            writer,
            "{:.3}\t{}\t{}\t{}\t{}",
            step.time, counts.susceptible, counts.exposed, counts.infectious, counts.resistant
        )?;
    }
    Ok(())
}
