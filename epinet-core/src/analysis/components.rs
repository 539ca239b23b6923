use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument};

use super::undirected_neighbours;
use crate::{
    CancelToken,
    network::{Network, NodeId},
};

/// Partitions the nodes into connected components.
///
/// Expansion follows arcs in both directions, so directed networks yield
/// weakly connected components. Each component is sorted by id and the
/// components are ordered by their smallest id. The cancel token is polled
/// once per component.
///
/// # Examples
/// ```
/// use epinet_core::{CancelToken, Directedness, Network, analysis};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 0);
/// let ids = net.populate(5);
/// net.connect(ids[0], ids[1])?;
/// net.connect(ids[3], ids[4])?;
/// let parts = analysis::components(&net, &CancelToken::new());
/// assert_eq!(parts, vec![vec![ids[0], ids[1]], vec![ids[2]], vec![ids[3], ids[4]]]);
/// # Ok::<(), epinet_core::NetworkError>(())
/// ```
#[instrument(name = "analysis.components", skip_all, fields(nodes = net.size()))]
pub fn components(net: &Network, cancel: &CancelToken) -> Vec<Vec<NodeId>> {
    let mut visited = HashSet::with_capacity(net.size());
    let mut parts = Vec::new();
    for seed in net.node_ids() {
        if visited.contains(&seed) {
            continue;
        }
        if cancel.is_cancelled() {
            debug!(found = parts.len(), "component search cancelled");
            break;
        }
        visited.insert(seed);
        let mut members = vec![seed];
        let mut frontier = VecDeque::from([seed]);
        while let Some(node) = frontier.pop_front() {
            for neighbour in undirected_neighbours(net, node) {
                if visited.insert(neighbour) {
                    members.push(neighbour);
                    frontier.push_back(neighbour);
                }
            }
        }
        members.sort_unstable();
        parts.push(members);
    }
    parts
}

/// Returns the largest component; ties go to the component with the smallest
/// id. Empty for an empty network.
#[must_use]
pub fn major_component(net: &Network, cancel: &CancelToken) -> Vec<NodeId> {
    components(net, cancel)
        .into_iter()
        .rev()
        .max_by_key(Vec::len)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::network::Directedness;

    #[rstest]
    #[case(Directedness::Undirected)]
    #[case(Directedness::Directed)]
    fn components_partition_the_nodes(#[case] directedness: Directedness) {
        let mut net = Network::with_seed(directedness, 3);
        let ids = net.populate(6);
        net.connect(ids[1], ids[0]).expect("live");
        net.connect(ids[2], ids[1]).expect("live");
        net.connect(ids[4], ids[5]).expect("live");

        let parts = components(&net, &CancelToken::new());
        assert_eq!(
            parts,
            vec![vec![ids[0], ids[1], ids[2]], vec![ids[3]], vec![ids[4], ids[5]]]
        );
        assert_eq!(major_component(&net, &CancelToken::new()), vec![ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn major_component_prefers_smallest_id_on_ties() {
        let mut net = Network::with_seed(Directedness::Undirected, 3);
        let ids = net.populate(4);
        net.connect(ids[2], ids[3]).expect("live");
        net.connect(ids[0], ids[1]).expect("live");
        assert_eq!(major_component(&net, &CancelToken::new()), vec![ids[0], ids[1]]);
    }

    #[test]
    fn cancelled_search_returns_partial_result() {
        let mut net = Network::with_seed(Directedness::Undirected, 3);
        net.populate(10);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(components(&net, &cancel).is_empty());
    }

    #[test]
    fn empty_network_has_no_major_component() {
        let net = Network::with_seed(Directedness::Undirected, 3);
        assert!(major_component(&net, &CancelToken::new()).is_empty());
    }
}
