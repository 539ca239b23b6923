use std::collections::HashSet;

use tracing::instrument;

use super::distinct_out_neighbours;
use crate::{
    error::{NetworkError, Result},
    network::{Network, NodeId},
};

/// Closed and total connected triples centred on `node`.
fn triples(net: &Network, node: NodeId) -> (usize, usize) {
    let neighbours = distinct_out_neighbours(net, node);
    let degree = neighbours.len();
    if degree < 2 {
        return (0, 0);
    }
    let members: HashSet<NodeId> = neighbours.iter().copied().collect();
    let closed = neighbours
        .iter()
        .map(|&u| {
            distinct_out_neighbours(net, u)
                .into_iter()
                .filter(|w| *w != node && members.contains(w))
                .count()
        })
        .sum();
    (closed, degree * (degree - 1))
}

/// Global clustering coefficient: closed triples over connected triples.
///
/// Triples are centred on every node, or only on `subset` when given, and
/// found by expanding each centre's neighbours' neighbourhoods. Loops and
/// parallel edges are ignored. Returns 0 when no triple exists.
///
/// # Errors
/// Returns [`NetworkError::UnknownNode`] when `subset` holds a stale handle.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network, analysis};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 0);
/// let ids = net.populate(3);
/// net.connect(ids[0], ids[1])?;
/// net.connect(ids[1], ids[2])?;
/// assert_eq!(analysis::transitivity(&net, None)?, 0.0);
/// net.connect(ids[2], ids[0])?;
/// assert_eq!(analysis::transitivity(&net, None)?, 1.0);
/// # Ok::<(), epinet_core::NetworkError>(())
/// ```
#[instrument(name = "analysis.transitivity", skip_all, fields(nodes = net.size()), err)]
pub fn transitivity(net: &Network, subset: Option<&[NodeId]>) -> Result<f64> {
    let centres = match subset {
        Some(subset) => {
            if let Some(&node) = subset.iter().find(|&&node| !net.contains_node(node)) {
                return Err(NetworkError::UnknownNode { node });
            }
            subset.to_vec()
        }
        None => net.node_ids(),
    };
    let (closed, total) = centres
        .into_iter()
        .map(|node| triples(net, node))
        .fold((0, 0), |(closed, total), (c, t)| (closed + c, total + t));
    Ok(ratio(closed, total))
}

/// Fraction of pairs of `node`'s neighbours that are themselves connected.
///
/// # Errors
/// Returns [`NetworkError::UnknownNode`] for a stale handle.
pub fn local_clustering(net: &Network, node: NodeId) -> Result<f64> {
    if !net.contains_node(node) {
        return Err(NetworkError::UnknownNode { node });
    }
    let (closed, total) = triples(net, node);
    Ok(ratio(closed, total))
}

fn ratio(closed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        closed as f64 / total as f64
    }
}
