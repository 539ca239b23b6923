//! Stochastic epidemic engines.
//!
//! Each engine borrows the [`Network`] mutably for its whole lifetime and
//! keeps the epidemiological state on the nodes themselves, so the network's
//! [`Network::state_counts`] always reflects the simulation. Randomness comes
//! from the network's RNG; reseeding the network through the engine and
//! rerunning after [`GillespieSeirs::reset`] reproduces a run exactly.

mod chain_binomial;
mod event;
mod gillespie;
mod params;
mod percolation;
mod process;

pub use self::{
    chain_binomial::ChainBinomialSim,
    event::{Event, EventKind},
    gillespie::GillespieSeirs,
    params::{ChainBinomialParams, PercolationParams, SeirsParams, SeirsParamsBuilder},
    percolation::PercolationSim,
    process::EpidemicProcess,
};

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::{
    error::SimulationError,
    network::{EpiState, Network, NodeId},
};

/// Picks `count` distinct susceptible nodes uniformly at random.
fn choose_susceptible(net: &mut Network, count: usize) -> Result<Vec<NodeId>, SimulationError> {
    let susceptible: Vec<NodeId> = net
        .nodes()
        .filter(|node| node.state() == EpiState::Susceptible)
        .map(|node| node.id())
        .collect();
    if count == 0 || count > susceptible.len() {
        return Err(SimulationError::InvalidInfectionCount {
            requested: count,
            susceptible: susceptible.len(),
        });
    }
    Ok(susceptible
        .choose_multiple(net.rng(), count)
        .copied()
        .collect())
}

/// Keeps the susceptible members of `nodes`, rejecting stale handles.
fn susceptible_only(net: &Network, nodes: &[NodeId]) -> Result<Vec<NodeId>, SimulationError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    let mut chosen = Vec::with_capacity(nodes.len());
    for &node in nodes {
        if net.state(node)? == EpiState::Susceptible && seen.insert(node) {
            chosen.push(node);
        }
    }
    Ok(chosen)
}

#[cfg(feature = "metrics")]
fn record_events(engine: &'static str, count: usize) {
    metrics::counter!("epinet_sim_events", "engine" => engine).increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_events(_engine: &'static str, _count: usize) {}
