//! Network construction, loading and export for the commands.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use epinet_core::{CancelToken, DegreeDistribution, Directedness, Network, generators};
use epinet_providers_edgelist::{EdgeListOptions, read_network, write_edge_list};
use tracing::{Span, field, instrument};

use super::{
    commands::{TopologyArgs, TopologyKind},
    error::CliError,
};

/// Builds the network described by `args`.
#[instrument(
    name = "cli.build_network",
    err,
    skip(args),
    fields(topology = args.topology.label(), nodes = args.nodes, directed = field::Empty),
)]
pub(super) fn build_network(args: &TopologyArgs) -> Result<Network, CliError> {
    let directedness = directedness(args);
    Span::current().record("directed", directedness == Directedness::Directed);
    let mut net = match args.seed {
        Some(seed) => Network::with_seed(directedness, seed),
        None => Network::new(directedness),
    };
    net.populate(args.nodes);

    let cancel = CancelToken::new();
    let max_degree = args.nodes.saturating_sub(1);
    match args.topology {
        TopologyKind::ErdosRenyi => generators::erdos_renyi(&mut net, args.mean_degree, &cancel)?,
        TopologyKind::FastRandom => {
            generators::fast_random_graph(&mut net, args.mean_degree, &cancel)?;
        }
        TopologyKind::Ring => generators::ring_lattice(&mut net, args.k)?,
        TopologyKind::Square => {
            let rows = args.rows.ok_or(CliError::InvalidArgument {
                name: "rows",
                reason: "the square lattice needs --rows",
            })?;
            let cols = if rows == 0 { 0 } else { args.nodes / rows };
            generators::square_lattice(&mut net, rows, cols, args.diagonals)?;
        }
        TopologyKind::SmallWorld => generators::small_world(&mut net, args.k, args.rewire)?,
        TopologyKind::Poisson => {
            generators::rand_connect_poisson(&mut net, args.mean_degree, &cancel)?;
        }
        TopologyKind::Exponential => {
            let dist = DegreeDistribution::exponential(args.cutoff, max_degree)?;
            generators::rand_connect_user(&mut net, &dist, &cancel)?;
        }
        TopologyKind::PowerLaw => {
            let dist = DegreeDistribution::power_law(args.exponent, args.cutoff, max_degree)?;
            generators::rand_connect_user(&mut net, &dist, &cancel)?;
        }
    }
    Ok(net)
}

/// Configuration models and small worlds only exist in undirected form.
fn directedness(args: &TopologyArgs) -> Directedness {
    let undirected_only = matches!(
        args.topology,
        TopologyKind::SmallWorld
            | TopologyKind::Poisson
            | TopologyKind::Exponential
            | TopologyKind::PowerLaw
    );
    if args.directed && !undirected_only {
        Directedness::Directed
    } else {
        Directedness::Undirected
    }
}

/// Reads the first snapshot of the edge list at `path`.
#[instrument(name = "cli.load_network", err, skip(args), fields(path = %path.display()))]
pub(super) fn load_network(path: &Path, args: &TopologyArgs) -> Result<Network, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut options = EdgeListOptions::default().with_directedness(if args.directed {
        Directedness::Directed
    } else {
        Directedness::Undirected
    });
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }
    Ok(read_network(BufReader::new(file), &options)?)
}

/// Writes `net` as an edge list to `path`.
#[instrument(name = "cli.write_network", err, skip(net), fields(path = %path.display()))]
pub(super) fn write_network(net: &Network, path: &Path) -> Result<(), CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    write_edge_list(net, &mut writer, &EdgeListOptions::default())?;
    writer.flush().map_err(io_error)?;
    Ok(())
}
