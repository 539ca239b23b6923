use std::collections::HashSet;

use crate::network::{Network, NodeId};

/// Outbound degree of every live node in ascending id order.
#[must_use]
pub fn degree_series(net: &Network) -> Vec<(NodeId, usize)> {
    net.nodes().map(|node| (node.id(), node.degree())).collect()
}

/// Count of nodes per degree; cached on the network until the topology
/// changes.
#[must_use]
pub fn degree_histogram(net: &Network) -> &[usize] {
    net.degree_histogram()
}

/// Mean outbound degree, or 0 for an empty network.
#[must_use]
pub fn mean_degree(net: &Network) -> f64 {
    let histogram = net.degree_histogram();
    let nodes: usize = histogram.iter().sum();
    if nodes == 0 {
        return 0.0;
    }
    let arcs: usize = histogram
        .iter()
        .enumerate()
        .map(|(degree, count)| degree * count)
        .sum();
    arcs as f64 / nodes as f64
}

/// Whether the network has no stubs, self-loops or parallel arcs.
#[must_use]
pub fn is_simple(net: &Network) -> bool {
    net.nodes().all(|node| {
        let mut seen = HashSet::new();
        net.out_arcs(node.id()).all(|arc| match arc.end() {
            None => false,
            Some(end) => end != node.id() && seen.insert(end),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Directedness;

    #[test]
    fn statistics_follow_topology() {
        let mut net = Network::with_seed(Directedness::Undirected, 0);
        let ids = net.populate(4);
        net.connect(ids[0], ids[1]).expect("live");
        net.connect(ids[0], ids[2]).expect("live");

        assert_eq!(
            degree_series(&net),
            vec![(ids[0], 2), (ids[1], 1), (ids[2], 1), (ids[3], 0)]
        );
        assert_eq!(degree_histogram(&net), &[1, 2, 1]);
        assert_eq!(mean_degree(&net), 1.0);
        assert!(is_simple(&net));
    }

    #[test]
    fn loops_duplicates_and_stubs_are_not_simple() {
        let mut net = Network::with_seed(Directedness::Undirected, 0);
        let ids = net.populate(2);
        net.connect(ids[0], ids[1]).expect("live");
        net.connect(ids[0], ids[1]).expect("live");
        assert!(!is_simple(&net));

        net.clear_edges();
        net.connect(ids[0], ids[0]).expect("live");
        assert!(!is_simple(&net));

        net.clear_edges();
        net.add_stub(ids[1]).expect("live");
        assert!(!is_simple(&net));
    }

    #[test]
    fn empty_network_has_zero_mean_degree() {
        let net = Network::with_seed(Directedness::Directed, 0);
        assert_eq!(mean_degree(&net), 0.0);
    }
}
