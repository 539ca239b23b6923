use epinet_core::{CancelToken, Directedness, Network, NodeId, generators};

/// Four nodes in a triangle with a pendant: 0-1, 0-2, 1-2, 2-3.
#[must_use]
pub fn kite() -> (Network, Vec<NodeId>) {
    let mut net = Network::with_seed(Directedness::Undirected, 5);
    let ids = net.populate(4);
    for (a, b) in [(0, 1), (0, 2), (1, 2), (2, 3)] {
        net.connect(ids[a], ids[b]).expect("live nodes");
    }
    (net, ids)
}

/// A seeded Poisson configuration model with `size` nodes.
#[must_use]
pub fn poisson_graph(size: usize, lambda: f64, seed: u64) -> Network {
    let mut net = Network::with_seed(Directedness::Undirected, seed);
    net.populate(size);
    generators::rand_connect_poisson(&mut net, lambda, &CancelToken::new()).expect("repairable");
    net
}
