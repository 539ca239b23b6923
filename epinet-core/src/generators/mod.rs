//! Topology generators.
//!
//! Every generator wires the nodes already present in the [`Network`]; none of
//! them add or remove nodes. Existing edges are cleared first, so calling a
//! generator twice replaces the topology rather than layering a second one on
//! top. Generators that can run for long take a [`CancelToken`]; when it
//! fires they clear whatever they wired and return
//! [`GeneratorError::Cancelled`].

mod classic;
mod config_model;
mod degree;
#[cfg(test)]
mod property;

pub use self::{
    classic::{erdos_renyi, fast_random_graph, ring_lattice, small_world, square_lattice},
    config_model::{
        MAX_FAILED_SWAPS, rand_connect_explicit, rand_connect_poisson, rand_connect_user,
    },
    degree::{DegreeDistribution, PROBABILITY_TOLERANCE},
};

use crate::{CancelToken, error::GeneratorError, network::Network};

fn require_nodes(net: &Network) -> Result<usize, GeneratorError> {
    match net.size() {
        0 => Err(GeneratorError::EmptyNetwork),
        size => Ok(size),
    }
}

fn require_undirected(net: &Network, generator: &'static str) -> Result<(), GeneratorError> {
    if net.is_directed() {
        Err(GeneratorError::RequiresUndirected { generator })
    } else {
        Ok(())
    }
}

fn require_probability(name: &'static str, value: f64) -> Result<(), GeneratorError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GeneratorError::InvalidParameter { name, value })
    }
}

fn require_rate(name: &'static str, value: f64) -> Result<(), GeneratorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GeneratorError::InvalidParameter { name, value })
    }
}

/// Clears the partial topology and reports cancellation.
fn abort_if_cancelled(net: &mut Network, cancel: &CancelToken) -> Result<(), GeneratorError> {
    if cancel.is_cancelled() {
        net.clear_edges();
        return Err(GeneratorError::Cancelled);
    }
    Ok(())
}
