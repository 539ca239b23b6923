//! Configuration model: stub pairing followed by self-loop and duplicate
//! repair.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};
use tracing::{debug, instrument, warn};

use super::{
    DegreeDistribution, abort_if_cancelled, require_nodes, require_rate, require_undirected,
};
use crate::{
    CancelToken,
    error::{GeneratorError, NetworkError},
    network::{Edge, EdgeId, Network, NodeId},
};

/// Consecutive rejected repair swaps after which the repair gives up.
pub const MAX_FAILED_SWAPS: usize = 100;

/// Draws one degree per node from `dist` and wires them with the
/// configuration model.
///
/// When the drawn degrees sum to an odd total, one random node redraws its
/// degree until the total is even. Stubs are shuffled and paired, then
/// self-loops and duplicate edges are rewired away.
///
/// # Errors
/// Returns [`GeneratorError::RequiresUndirected`] for directed networks,
/// [`GeneratorError::EmptyNetwork`] for empty ones,
/// [`GeneratorError::OddDegreeSum`] when only odd degrees are supported and
/// the node count is odd, [`GeneratorError::RepairFailed`] when the repair
/// does not converge (every edge is cleared) and
/// [`GeneratorError::Cancelled`] when cancelled.
///
/// # Examples
/// ```
/// use epinet_core::{CancelToken, DegreeDistribution, Directedness, Network, generators};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 9);
/// net.populate(100);
/// let dist = DegreeDistribution::from_probabilities(vec![0.0, 0.0, 1.0])?;
/// generators::rand_connect_user(&mut net, &dist, &CancelToken::new())?;
/// assert_eq!(net.edge_count(), 100);
/// assert!(net.validate().is_empty());
/// # Ok::<(), epinet_core::GeneratorError>(())
/// ```
#[instrument(
    name = "generators.rand_connect_user",
    err,
    skip(net, dist, cancel),
    fields(nodes = net.size(), mean_degree = dist.mean()),
)]
pub fn rand_connect_user(
    net: &mut Network,
    dist: &DegreeDistribution,
    cancel: &CancelToken,
) -> Result<(), GeneratorError> {
    require_undirected(net, "rand_connect_user")?;
    let size = require_nodes(net)?;
    let mut degrees: Vec<usize> = (0..size).map(|_| dist.sample(net.rng())).collect();
    let mut sum: usize = degrees.iter().sum();
    if sum % 2 == 1 && size % 2 == 1 && dist.only_odd_degrees() {
        return Err(GeneratorError::OddDegreeSum { sum });
    }
    while sum % 2 == 1 {
        let index = net.rng().gen_range(0..size);
        sum -= degrees[index];
        degrees[index] = dist.sample(net.rng());
        sum += degrees[index];
    }
    wire(net, &degrees, cancel)
}

/// Wires the network so that the `i`-th live node (ascending id order) has
/// degree `degrees[i]`, using the configuration model.
///
/// # Errors
/// Returns [`GeneratorError::DegreeSequenceLength`] when the sequence length
/// differs from the node count, [`GeneratorError::OddDegreeSum`] for odd
/// totals, and otherwise the errors of [`rand_connect_user`].
#[instrument(
    name = "generators.rand_connect_explicit",
    err,
    skip(net, degrees, cancel),
    fields(nodes = net.size()),
)]
pub fn rand_connect_explicit(
    net: &mut Network,
    degrees: &[usize],
    cancel: &CancelToken,
) -> Result<(), GeneratorError> {
    require_undirected(net, "rand_connect_explicit")?;
    let size = require_nodes(net)?;
    if degrees.len() != size {
        return Err(GeneratorError::DegreeSequenceLength {
            expected: size,
            got: degrees.len(),
        });
    }
    let sum: usize = degrees.iter().sum();
    if sum % 2 == 1 {
        return Err(GeneratorError::OddDegreeSum { sum });
    }
    wire(net, degrees, cancel)
}

/// Configuration model over a Poisson(`lambda`) degree distribution truncated
/// at `N - 1`.
///
/// # Errors
/// Returns [`GeneratorError::InvalidParameter`] for a negative or non-finite
/// `lambda`, and otherwise the errors of [`rand_connect_user`].
pub fn rand_connect_poisson(
    net: &mut Network,
    lambda: f64,
    cancel: &CancelToken,
) -> Result<(), GeneratorError> {
    require_rate("lambda", lambda)?;
    let size = require_nodes(net)?;
    let tail = (lambda + 10.0 * lambda.sqrt() + 10.0).ceil() as usize;
    let dist = DegreeDistribution::poisson(lambda, tail.min(size - 1))?;
    rand_connect_user(net, &dist, cancel)
}

fn wire(net: &mut Network, degrees: &[usize], cancel: &CancelToken) -> Result<(), GeneratorError> {
    net.clear_edges();
    let ids = net.node_ids();
    let mut stubs = Vec::with_capacity(degrees.iter().sum());
    for (&node, &degree) in ids.iter().zip(degrees) {
        for _ in 0..degree {
            stubs.push(net.add_stub(node)?);
        }
    }
    abort_if_cancelled(net, cancel)?;

    stubs.shuffle(net.rng());
    for pair in stubs.chunks_exact(2) {
        let first_start = start_of(net, pair[0])?;
        let second_start = start_of(net, pair[1])?;
        net.define_edge_end(pair[0], second_start)?;
        net.define_edge_end(pair[1], first_start)?;
    }
    debug!(stubs = stubs.len(), "stubs paired");

    repair(net, cancel)
}

fn start_of(net: &Network, edge: EdgeId) -> Result<NodeId, GeneratorError> {
    net.edge(edge)
        .map(Edge::start)
        .ok_or(GeneratorError::Network(NetworkError::UnknownEdge { edge }))
}

/// Rewires self-loops and duplicate edges until none remain.
fn repair(net: &mut Network, cancel: &CancelToken) -> Result<(), GeneratorError> {
    let mut failures = 0;
    let mut round = 0_usize;
    loop {
        abort_if_cancelled(net, cancel)?;
        let mut bad = find_bad_edges(net);
        if bad.is_empty() {
            debug!(rounds = round, "repair converged");
            return Ok(());
        }
        round += 1;
        debug!(round, bad = bad.len(), "repairing self-loops and duplicate edges");
        bad.shuffle(net.rng());

        for edge in bad {
            abort_if_cancelled(net, cancel)?;
            if !is_still_bad(net, edge) {
                continue;
            }
            let Some(candidate) = net.random_edge() else {
                break;
            };
            if try_rewire(net, edge, candidate)? {
                failures = 0;
                record_swap();
            } else {
                failures += 1;
                if failures >= MAX_FAILED_SWAPS {
                    warn!(failures, "edge repair did not converge, clearing edges");
                    record_failure();
                    net.clear_edges();
                    return Err(GeneratorError::RepairFailed { attempts: failures });
                }
            }
        }
    }
}

/// One representative arc per self-loop and per surplus parallel edge.
fn find_bad_edges(net: &Network) -> Vec<EdgeId> {
    let mut bad = Vec::new();
    for node in net.nodes() {
        let start = node.id();
        let mut seen = HashSet::new();
        for arc in net.out_arcs(start) {
            let Some(end) = arc.end() else {
                continue;
            };
            if end == start {
                if arc.complement().is_none_or(|other| arc.id() < other) {
                    bad.push(arc.id());
                }
            } else if start < end && !seen.insert(end) {
                bad.push(arc.id());
            }
        }
    }
    bad
}

fn is_still_bad(net: &Network, edge: EdgeId) -> bool {
    let Some((start, Some(end))) = net.edge(edge).map(|arc| (arc.start(), arc.end())) else {
        return false;
    };
    start == end || net.out_neighbors(start).filter(|&n| n == end).count() > 1
}

/// Attempts to rewire `a-b` (`edge`) and `c-d` (`candidate`) into `a-d` and
/// `c-b`. Returns whether the swap was applied.
fn try_rewire(net: &mut Network, edge: EdgeId, candidate: EdgeId) -> Result<bool, GeneratorError> {
    let (Some(bad), Some(other)) = (net.edge(edge), net.edge(candidate)) else {
        return Ok(false);
    };
    if candidate == edge || bad.complement() == Some(candidate) {
        return Ok(false);
    }
    let (Some(b), Some(d)) = (bad.end(), other.end()) else {
        return Ok(false);
    };
    let (a, c) = (bad.start(), other.start());

    let same_pair = (a == c && b == d) || (a == d && b == c);
    let creates_loop = a == d || c == b;
    let creates_duplicate = net.is_connected_to(a, d) || net.is_connected_to(c, b);
    if same_pair || creates_loop || creates_duplicate {
        return Ok(false);
    }
    net.rewire_pair(edge, candidate)?;
    Ok(true)
}

#[cfg(feature = "metrics")]
fn record_swap() {
    metrics::counter!("epinet_repair_swaps").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_swap() {}

#[cfg(feature = "metrics")]
fn record_failure() {
    metrics::counter!("epinet_repair_failures").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_failure() {}
