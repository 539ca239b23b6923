//! Shortest-path distances.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap, HashSet},
};

use tracing::{debug, instrument};

use crate::{
    CancelToken,
    error::{NetworkError, Result},
    network::{Network, NodeId},
};

/// How path length is measured.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DistanceMetric {
    /// Number of arcs traversed.
    #[default]
    Hops,
    /// Sum of arc costs. Costs are assumed non-negative.
    Cost,
}

/// Distances from every source to every node it reaches.
pub type DistanceMatrix = BTreeMap<NodeId, BTreeMap<NodeId, f64>>;

/// Breadth-first hop counts from `source`.
///
/// With `targets`, the search stops as soon as all of them are reached; the
/// result may then contain other nodes too. Unreachable nodes have no entry.
/// The cancel token is polled once per BFS level; a cancelled search returns
/// the levels finished so far.
///
/// # Errors
/// Returns [`NetworkError::UnknownNode`] when `source` is stale.
#[instrument(name = "analysis.unweighted_distances", skip(net, targets, cancel), err)]
pub fn unweighted_distances(
    net: &Network,
    source: NodeId,
    targets: Option<&[NodeId]>,
    cancel: &CancelToken,
) -> Result<BTreeMap<NodeId, usize>> {
    if !net.contains_node(source) {
        return Err(NetworkError::UnknownNode { node: source });
    }
    let mut remaining: Option<HashSet<NodeId>> =
        targets.map(|targets| targets.iter().copied().filter(|&t| t != source).collect());
    let mut distances = BTreeMap::from([(source, 0)]);
    let mut level = vec![source];
    let mut depth = 0;

    while !level.is_empty() && !remaining.as_ref().is_some_and(HashSet::is_empty) {
        if cancel.is_cancelled() {
            debug!(depth, "distance search cancelled");
            break;
        }
        depth += 1;
        let mut next = Vec::new();
        for node in level {
            for neighbour in net.out_neighbors(node) {
                if distances.contains_key(&neighbour) {
                    continue;
                }
                distances.insert(neighbour, depth);
                if let Some(remaining) = remaining.as_mut() {
                    remaining.remove(&neighbour);
                }
                next.push(neighbour);
            }
        }
        level = next;
    }
    Ok(distances)
}

#[derive(Clone, Copy, Debug)]
struct Tentative {
    distance: f64,
    node: NodeId,
}

impl Ord for Tentative {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for Tentative {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Tentative {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Tentative {}

/// Dijkstra distances from `source` using arc costs.
///
/// Nodes move from the uncertain frontier to the known set once their
/// distance is final. With `targets`, the search stops once every target is
/// known. Unreachable nodes have no entry. The cancel token is polled after
/// each settled node, so a cancelled search still reports `source`.
///
/// # Errors
/// Returns [`NetworkError::UnknownNode`] when `source` is stale.
#[instrument(name = "analysis.weighted_distances", skip(net, targets, cancel), err)]
pub fn weighted_distances(
    net: &Network,
    source: NodeId,
    targets: Option<&[NodeId]>,
    cancel: &CancelToken,
) -> Result<BTreeMap<NodeId, f64>> {
    if !net.contains_node(source) {
        return Err(NetworkError::UnknownNode { node: source });
    }
    let mut remaining: Option<HashSet<NodeId>> =
        targets.map(|targets| targets.iter().copied().collect());
    let mut known = BTreeMap::new();
    let mut uncertain = BinaryHeap::from([Reverse(Tentative {
        distance: 0.0,
        node: source,
    })]);

    while let Some(Reverse(Tentative { distance, node })) = uncertain.pop() {
        if known.contains_key(&node) {
            continue;
        }
        known.insert(node, distance);
        if cancel.is_cancelled() {
            debug!(settled = known.len(), "distance search cancelled");
            break;
        }
        if let Some(remaining) = remaining.as_mut() {
            remaining.remove(&node);
            if remaining.is_empty() {
                break;
            }
        }
        for arc in net.out_arcs(node) {
            let Some(end) = arc.end() else {
                continue;
            };
            if !known.contains_key(&end) {
                uncertain.push(Reverse(Tentative {
                    distance: distance + arc.cost(),
                    node: end,
                }));
            }
        }
    }
    Ok(known)
}

/// All-pairs distances under `metric`, one single-source search per node.
///
/// A cancelled computation returns the rows finished so far.
#[instrument(name = "analysis.distance_matrix", skip(net, cancel), fields(nodes = net.size()))]
pub fn distance_matrix(net: &Network, metric: DistanceMetric, cancel: &CancelToken) -> DistanceMatrix {
    let mut matrix = DistanceMatrix::new();
    for source in net.node_ids() {
        if cancel.is_cancelled() {
            break;
        }
        let row = match metric {
            DistanceMetric::Hops => unweighted_distances(net, source, None, cancel).map(|row| {
                row.into_iter()
                    .map(|(node, hops)| (node, hops as f64))
                    .collect()
            }),
            DistanceMetric::Cost => weighted_distances(net, source, None, cancel),
        };
        // Sources come from the live id list, so the lookups cannot fail.
        if let Ok(row) = row {
            matrix.insert(source, row);
        }
    }
    matrix
}

/// Mean distance over ordered pairs of distinct nodes that reach each other.
///
/// Returns `None` when no such pair exists.
#[must_use]
pub fn mean_distance(net: &Network, metric: DistanceMetric, cancel: &CancelToken) -> Option<f64> {
    let matrix = distance_matrix(net, metric, cancel);
    let (sum, pairs) = matrix
        .iter()
        .flat_map(|(source, row)| {
            row.iter()
                .filter(move |(target, _)| *target != source)
                .map(|(_, distance)| *distance)
        })
        .fold((0.0, 0_usize), |(sum, pairs), distance| (sum + distance, pairs + 1));
    (pairs > 0).then(|| sum / pairs as f64)
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::network::Directedness;

    /// Undirected square 0-1-2-3-0 with a chord 0-2 of cost 5 and an isolated
    /// node 4.
    #[fixture]
    fn square() -> (Network, Vec<NodeId>) {
        let mut net = Network::with_seed(Directedness::Undirected, 0);
        let ids = net.populate(5);
        for i in 0..4 {
            net.connect(ids[i], ids[(i + 1) % 4]).expect("live");
        }
        net.connect_with_cost(ids[0], ids[2], 5.0).expect("live");
        (net, ids)
    }

    #[rstest]
    fn bfs_counts_hops(square: (Network, Vec<NodeId>)) {
        let (net, ids) = square;
        let distances = unweighted_distances(&net, ids[0], None, &CancelToken::new()).expect("live");
        assert_eq!(distances.get(&ids[0]), Some(&0));
        assert_eq!(distances.get(&ids[1]), Some(&1));
        assert_eq!(distances.get(&ids[2]), Some(&1));
        assert_eq!(distances.get(&ids[3]), Some(&1));
        assert_eq!(distances.get(&ids[4]), None);
    }

    #[rstest]
    fn dijkstra_prefers_cheaper_detour(square: (Network, Vec<NodeId>)) {
        let (net, ids) = square;
        let distances = weighted_distances(&net, ids[0], None, &CancelToken::new()).expect("live");
        assert_eq!(distances.get(&ids[2]), Some(&2.0));
        assert!(!distances.contains_key(&ids[4]));
    }

    #[rstest]
    fn targets_stop_the_search_early(square: (Network, Vec<NodeId>)) {
        let (net, ids) = square;
        let distances = weighted_distances(&net, ids[0], Some(&[ids[1]]), &CancelToken::new())
            .expect("live");
        assert_eq!(distances.get(&ids[1]), Some(&1.0));
        assert!(!distances.contains_key(&ids[2]));
    }

    #[rstest]
    #[case(DistanceMetric::Hops)]
    #[case(DistanceMetric::Cost)]
    fn undirected_matrix_is_symmetric(square: (Network, Vec<NodeId>), #[case] metric: DistanceMetric) {
        let (net, _) = square;
        let matrix = distance_matrix(&net, metric, &CancelToken::new());
        for (source, row) in &matrix {
            for (target, distance) in row {
                assert_eq!(matrix[target].get(source), Some(distance));
            }
        }
    }

    #[rstest]
    fn mean_distance_ignores_unreachable_pairs(square: (Network, Vec<NodeId>)) {
        let (net, _) = square;
        // Twelve ordered pairs; only (1,3) and (3,1) are two hops apart.
        let mean = mean_distance(&net, DistanceMetric::Hops, &CancelToken::new()).expect("pairs");
        assert!((mean - 14.0 / 12.0).abs() < 1e-12);
    }

    #[rstest]
    fn cancelled_bfs_keeps_only_the_source(square: (Network, Vec<NodeId>)) {
        let (net, ids) = square;
        let cancel = CancelToken::new();
        cancel.cancel();
        let distances = unweighted_distances(&net, ids[0], None, &cancel).expect("live");
        assert_eq!(distances, BTreeMap::from([(ids[0], 0)]));
    }

    #[rstest]
    fn cancelled_dijkstra_keeps_only_the_source(square: (Network, Vec<NodeId>)) {
        let (net, ids) = square;
        let cancel = CancelToken::new();
        cancel.cancel();
        let distances = weighted_distances(&net, ids[0], None, &cancel).expect("live");
        assert_eq!(distances, BTreeMap::from([(ids[0], 0.0)]));
    }

    #[rstest]
    fn cancelled_search_still_rejects_stale_source(square: (Network, Vec<NodeId>)) {
        let (mut net, ids) = square;
        net.delete_node(ids[4]).expect("live");
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = weighted_distances(&net, ids[4], None, &cancel).expect_err("deleted source");
        assert_eq!(err, NetworkError::UnknownNode { node: ids[4] });
    }

    #[rstest]
    #[case(DistanceMetric::Hops)]
    #[case(DistanceMetric::Cost)]
    fn cancelled_matrix_has_no_rows(
        square: (Network, Vec<NodeId>),
        #[case] metric: DistanceMetric,
    ) {
        let (net, _) = square;
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(distance_matrix(&net, metric, &cancel).is_empty());
        assert_eq!(mean_distance(&net, metric, &cancel), None);
    }

    #[rstest]
    fn reset_token_computes_full_matrix(square: (Network, Vec<NodeId>)) {
        let (net, _) = square;
        let cancel = CancelToken::new();
        cancel.cancel();
        cancel.reset();
        let matrix = distance_matrix(&net, DistanceMetric::Hops, &cancel);
        assert_eq!(matrix.len(), 5);
        assert!(matrix.values().all(|row| !row.is_empty()));
    }

    #[test]
    fn stale_source_is_rejected() {
        let mut net = Network::with_seed(Directedness::Directed, 0);
        let node = net.add_node();
        net.delete_node(node).expect("live");
        let err = unweighted_distances(&net, node, None, &CancelToken::new())
            .expect_err("deleted source");
        assert_eq!(err, NetworkError::UnknownNode { node });
    }

    #[test]
    fn directed_distances_follow_arcs() {
        let mut net = Network::with_seed(Directedness::Directed, 0);
        let ids = net.populate(3);
        net.connect(ids[0], ids[1]).expect("live");
        net.connect(ids[1], ids[2]).expect("live");
        let forward = unweighted_distances(&net, ids[0], None, &CancelToken::new()).expect("live");
        assert_eq!(forward.get(&ids[2]), Some(&2));
        let backward = unweighted_distances(&net, ids[2], None, &CancelToken::new()).expect("live");
        assert_eq!(backward.len(), 1);
    }
}
