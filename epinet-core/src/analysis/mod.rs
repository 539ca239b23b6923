//! Structural statistics computed over a [`Network`].
//!
//! Analysers only read the network. Those that can run for long take a
//! [`crate::CancelToken`] and return whatever they computed so far once it
//! fires; the caller decides whether a partial answer is usable.

mod clustering;
mod components;
mod degree;
mod kshell;
mod paths;

pub use self::{
    clustering::{local_clustering, transitivity},
    components::{components, major_component},
    degree::{degree_histogram, degree_series, is_simple, mean_degree},
    kshell::k_shell,
    paths::{
        DistanceMatrix, DistanceMetric, distance_matrix, mean_distance, unweighted_distances,
        weighted_distances,
    },
};

use crate::network::{Network, NodeId};

/// Distinct neighbours of `node` ignoring arc direction, excluding itself.
fn undirected_neighbours(net: &Network, node: NodeId) -> Vec<NodeId> {
    let mut neighbours: Vec<NodeId> = if net.is_directed() {
        net.out_neighbors(node).chain(net.in_neighbors(node)).collect()
    } else {
        net.out_neighbors(node).collect()
    };
    neighbours.retain(|&other| other != node);
    neighbours.sort_unstable();
    neighbours.dedup();
    neighbours
}

/// Distinct outbound neighbours of `node`, excluding itself.
fn distinct_out_neighbours(net: &Network, node: NodeId) -> Vec<NodeId> {
    let mut neighbours: Vec<NodeId> = net
        .out_neighbors(node)
        .filter(|&other| other != node)
        .collect();
    neighbours.sort_unstable();
    neighbours.dedup();
    neighbours
}
