//! Seeded networks shared by the benchmarks.

use epinet_core::{CancelToken, Directedness, Network, generators};

use crate::{error::BenchSetupError, params::NetworkBenchParams};

/// Seed used for all fixture generation.
pub const SEED: u64 = 42;

/// An undirected configuration-model network with Poisson degrees.
///
/// # Errors
/// Returns [`BenchSetupError::Generator`] if the model cannot be wired.
pub fn poisson_network(params: NetworkBenchParams) -> Result<Network, BenchSetupError> {
    let mut net = populated(params.nodes);
    generators::rand_connect_poisson(&mut net, params.mean_degree, &CancelToken::new())?;
    Ok(net)
}

/// An undirected Watts-Strogatz network over `nodes` nodes.
///
/// # Errors
/// Returns [`BenchSetupError::Generator`] if `k` does not fit the ring.
pub fn small_world_network(
    nodes: usize,
    k: usize,
    rewire: f64,
) -> Result<Network, BenchSetupError> {
    let mut net = populated(nodes);
    generators::small_world(&mut net, k, rewire)?;
    Ok(net)
}

/// A seeded undirected network with `nodes` isolated nodes.
#[must_use]
pub fn populated(nodes: usize) -> Network {
    let mut net = Network::with_seed(Directedness::Undirected, SEED);
    net.populate(nodes);
    net
}
