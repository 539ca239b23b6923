use std::collections::{BTreeMap, HashMap};

use tracing::{instrument, trace};

use super::undirected_neighbours;
use crate::network::{Network, NodeId};

/// Assigns every node to its k-shell by iterative peeling.
///
/// At shell level `k`, nodes whose remaining degree is at most `k` are
/// removed and assigned to shell `k`; removals lower their neighbours'
/// degrees, so passes repeat at the same level until one removes nothing,
/// and only then does `k` advance. Degrees count distinct neighbours in
/// either direction, ignoring loops.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network, analysis};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 0);
/// let ids = net.populate(4);
/// net.connect(ids[0], ids[1])?;
/// net.connect(ids[1], ids[2])?;
/// net.connect(ids[2], ids[0])?;
/// net.connect(ids[0], ids[3])?;
/// let shells = analysis::k_shell(&net);
/// assert_eq!(shells[&ids[3]], 1);
/// assert_eq!(shells[&ids[0]], 2);
/// # Ok::<(), epinet_core::NetworkError>(())
/// ```
#[instrument(name = "analysis.k_shell", skip_all, fields(nodes = net.size()))]
#[must_use]
pub fn k_shell(net: &Network) -> BTreeMap<NodeId, usize> {
    let adjacency: HashMap<NodeId, Vec<NodeId>> = net
        .node_ids()
        .into_iter()
        .map(|node| (node, undirected_neighbours(net, node)))
        .collect();
    let mut degree: HashMap<NodeId, usize> = adjacency
        .iter()
        .map(|(&node, neighbours)| (node, neighbours.len()))
        .collect();
    let mut shells = BTreeMap::new();
    let mut level = 0;

    while !degree.is_empty() {
        let mut peeled: Vec<NodeId> = degree
            .iter()
            .filter(|&(_, &remaining)| remaining <= level)
            .map(|(&node, _)| node)
            .collect();
        if peeled.is_empty() {
            level += 1;
            continue;
        }
        peeled.sort_unstable();
        trace!(level, peeled = peeled.len(), "k-shell pass");
        for node in peeled {
            degree.remove(&node);
            shells.insert(node, level);
            for neighbour in &adjacency[&node] {
                if let Some(remaining) = degree.get_mut(neighbour) {
                    *remaining = remaining.saturating_sub(1);
                }
            }
        }
    }
    shells
}
