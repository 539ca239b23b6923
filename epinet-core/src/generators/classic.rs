//! Direct generators: random graphs, lattices and small worlds.

use rand::Rng;
use tracing::{debug, instrument};

use super::{
    abort_if_cancelled, require_nodes, require_probability, require_rate, require_undirected,
};
use crate::{
    CancelToken,
    error::GeneratorError,
    network::{Directedness, Network, NodeId},
    sampling::standard_normal,
};

/// Mean degree per node above which [`fast_random_graph`] defers to
/// [`erdos_renyi`].
const SPARSE_DENSITY: f64 = 0.01;

/// Connects every pair of nodes independently with probability
/// `lambda / (N - 1)`, giving an expected degree of `lambda`.
///
/// Directed networks consider ordered pairs. The cancel token is polled once
/// per source node.
///
/// # Errors
/// Returns [`GeneratorError::EmptyNetwork`] for an empty network,
/// [`GeneratorError::InvalidParameter`] when `lambda` is negative or exceeds
/// `N - 1`, and [`GeneratorError::Cancelled`] when cancelled.
///
/// # Examples
/// ```
/// use epinet_core::{CancelToken, Directedness, Network, generators};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 5);
/// net.populate(200);
/// generators::erdos_renyi(&mut net, 4.0, &CancelToken::new())?;
/// assert!(net.edge_count() > 0);
/// assert!(net.validate().is_empty());
/// # Ok::<(), epinet_core::GeneratorError>(())
/// ```
#[instrument(
    name = "generators.erdos_renyi",
    err,
    skip(net, cancel),
    fields(nodes = net.size()),
)]
pub fn erdos_renyi(net: &mut Network, lambda: f64, cancel: &CancelToken) -> Result<(), GeneratorError> {
    let size = require_nodes(net)?;
    require_rate("lambda", lambda)?;
    net.clear_edges();
    if size < 2 {
        return Ok(());
    }
    let p = lambda / (size - 1) as f64;
    require_probability("lambda", p).map_err(|_| GeneratorError::InvalidParameter {
        name: "lambda",
        value: lambda,
    })?;

    let ids = net.node_ids();
    let directed = net.is_directed();
    for (i, &a) in ids.iter().enumerate() {
        abort_if_cancelled(net, cancel)?;
        let first = if directed { 0 } else { i + 1 };
        for &b in &ids[first..] {
            if a != b && net.rng().gen_bool(p) {
                net.connect(a, b)?;
            }
        }
    }
    debug!(edges = net.edge_count(), "erdos-renyi graph built");
    Ok(())
}

/// Sparse-graph shortcut for [`erdos_renyi`].
///
/// The number of edges is drawn from a normal approximation of the binomial
/// edge count, then random distinct, not-yet-adjacent endpoints are joined
/// until that many edges exist. Falls back to [`erdos_renyi`] when
/// `lambda / N` exceeds 0.01, where rejection sampling would slow down.
///
/// # Errors
/// As for [`erdos_renyi`].
#[instrument(
    name = "generators.fast_random_graph",
    err,
    skip(net, cancel),
    fields(nodes = net.size()),
)]
pub fn fast_random_graph(
    net: &mut Network,
    lambda: f64,
    cancel: &CancelToken,
) -> Result<(), GeneratorError> {
    let size = require_nodes(net)?;
    require_rate("lambda", lambda)?;
    if lambda / size as f64 > SPARSE_DENSITY {
        debug!("density too high for rejection sampling, using erdos-renyi");
        return erdos_renyi(net, lambda, cancel);
    }
    net.clear_edges();
    if size < 2 {
        return Ok(());
    }

    let n = size as f64;
    let p = lambda / (n - 1.0);
    let pairs = match net.directedness() {
        Directedness::Directed => n * (n - 1.0),
        Directedness::Undirected => n * (n - 1.0) / 2.0,
    };
    let mean = pairs * p;
    let deviation = (pairs * p * (1.0 - p)).sqrt();
    let draw = mean + deviation * standard_normal(net.rng());
    let target = draw.round().clamp(0.0, pairs) as usize;

    let ids = net.node_ids();
    let mut placed = 0;
    while placed < target {
        abort_if_cancelled(net, cancel)?;
        let a = ids[net.rng().gen_range(0..size)];
        let b = ids[net.rng().gen_range(0..size)];
        if a == b || net.is_connected_to(a, b) {
            continue;
        }
        net.connect(a, b)?;
        placed += 1;
    }
    debug!(edges = placed, "sparse random graph built");
    Ok(())
}

/// Joins each node to its `k` nearest neighbours on either side of a ring.
///
/// Nodes are placed around the ring in ascending id order. In directed mode
/// both arcs of each lattice connection are created.
///
/// # Errors
/// Returns [`GeneratorError::EmptyNetwork`] for an empty network and
/// [`GeneratorError::InvalidParameter`] unless `1 <= k` and `2k < N`.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network, generators};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 1);
/// let ids = net.populate(6);
/// generators::ring_lattice(&mut net, 1)?;
/// for id in ids {
///     assert_eq!(net.degree(id)?, 2);
/// }
/// # Ok::<(), epinet_core::GeneratorError>(())
/// ```
#[instrument(name = "generators.ring_lattice", err, skip(net), fields(nodes = net.size()))]
pub fn ring_lattice(net: &mut Network, k: usize) -> Result<(), GeneratorError> {
    let size = require_nodes(net)?;
    if k == 0 || 2 * k >= size {
        return Err(GeneratorError::InvalidParameter {
            name: "k",
            value: k as f64,
        });
    }
    net.clear_edges();
    let ids = net.node_ids();
    for (i, &a) in ids.iter().enumerate() {
        for offset in 1..=k {
            join(net, a, ids[(i + offset) % size])?;
        }
    }
    Ok(())
}

/// Wires a `rows x cols` grid with optional diagonals. Boundaries are open.
///
/// Node `r * cols + c` (in ascending id order) sits at row `r`, column `c`.
///
/// # Errors
/// Returns [`GeneratorError::EmptyNetwork`] for an empty network and
/// [`GeneratorError::LatticeShape`] unless both dimensions are non-zero and
/// `rows * cols == N`.
#[instrument(name = "generators.square_lattice", err, skip(net), fields(nodes = net.size()))]
pub fn square_lattice(
    net: &mut Network,
    rows: usize,
    cols: usize,
    diagonals: bool,
) -> Result<(), GeneratorError> {
    let size = require_nodes(net)?;
    if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(size) {
        return Err(GeneratorError::LatticeShape {
            rows,
            cols,
            nodes: size,
        });
    }
    net.clear_edges();
    let ids = net.node_ids();
    let at = |row: usize, col: usize| ids[row * cols + col];
    for row in 0..rows {
        for col in 0..cols {
            let here = at(row, col);
            if col + 1 < cols {
                join(net, here, at(row, col + 1))?;
            }
            if row + 1 < rows {
                join(net, here, at(row + 1, col))?;
                if diagonals && col + 1 < cols {
                    join(net, here, at(row + 1, col + 1))?;
                }
                if diagonals && col > 0 {
                    join(net, here, at(row + 1, col - 1))?;
                }
            }
        }
    }
    Ok(())
}

/// Watts-Strogatz small world: a [`ring_lattice`] whose connections each move
/// one endpoint to a uniformly random node with probability `beta`.
///
/// Rewiring never creates self-loops or duplicate edges; a node already
/// adjacent to every other node keeps its connection.
///
/// # Errors
/// Returns [`GeneratorError::RequiresUndirected`] for directed networks,
/// [`GeneratorError::InvalidParameter`] when `beta` is outside `[0, 1]`, and
/// the errors of [`ring_lattice`].
#[instrument(name = "generators.small_world", err, skip(net), fields(nodes = net.size()))]
pub fn small_world(net: &mut Network, k: usize, beta: f64) -> Result<(), GeneratorError> {
    require_undirected(net, "small_world")?;
    require_probability("beta", beta)?;
    ring_lattice(net, k)?;

    let ids = net.node_ids();
    let size = ids.len();
    let mut rewired = 0_usize;
    for (i, &a) in ids.iter().enumerate() {
        for offset in 1..=k {
            if !net.rng().gen_bool(beta) {
                continue;
            }
            let b = ids[(i + offset) % size];
            let distinct = {
                let mut seen = net.neighbors(a)?;
                seen.sort_unstable();
                seen.dedup();
                seen.len()
            };
            if distinct + 1 >= size || !net.is_connected_to(a, b) {
                continue;
            }
            let c = loop {
                let candidate = ids[net.rng().gen_range(0..size)];
                if candidate != a && !net.is_connected_to(a, candidate) {
                    break candidate;
                }
            };
            net.disconnect(a, b)?;
            net.connect(a, c)?;
            rewired += 1;
        }
    }
    debug!(rewired, "small-world rewiring finished");
    Ok(())
}

fn join(net: &mut Network, a: NodeId, b: NodeId) -> Result<(), GeneratorError> {
    net.connect(a, b)?;
    if net.is_directed() {
        net.connect(b, a)?;
    }
    Ok(())
}
