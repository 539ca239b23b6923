//! Unit tests for the network primitives.

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn path() -> (Network, Vec<NodeId>) {
    let mut net = Network::with_seed(Directedness::Undirected, 11);
    let ids = net.populate(4);
    for pair in ids.windows(2) {
        net.connect(pair[0], pair[1]).expect("nodes exist");
    }
    (net, ids)
}

#[rstest]
fn undirected_connect_creates_complements(path: (Network, Vec<NodeId>)) {
    let (net, ids) = path;
    assert_eq!(net.arc_count(), 6);
    assert_eq!(net.edge_count(), 3);
    let arc = net
        .out_arcs(ids[0])
        .next()
        .expect("node 0 has one outbound arc");
    let complement = net
        .edge(arc.complement().expect("arc is paired"))
        .expect("complement exists");
    assert_eq!(complement.start(), ids[1]);
    assert_eq!(complement.end(), Some(ids[0]));
    assert!(net.validate().is_empty());
}

#[test]
fn directed_connect_creates_one_arc() {
    let mut net = Network::with_seed(Directedness::Directed, 1);
    let ids = net.populate(2);
    net.connect(ids[0], ids[1]).expect("nodes exist");
    assert_eq!(net.arc_count(), 1);
    assert_eq!(net.degree(ids[0]).expect("live"), 1);
    assert_eq!(net.degree(ids[1]).expect("live"), 0);
    assert_eq!(net.in_degree(ids[1]).expect("live"), 1);
    assert!(net.validate().is_empty());
}

#[rstest]
fn delete_node_cascades_to_neighbours(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    net.delete_node(ids[1]).expect("node exists");
    assert_eq!(net.size(), 3);
    assert_eq!(net.edge_count(), 1);
    assert_eq!(net.degree(ids[0]).expect("live"), 0);
    assert_eq!(net.degree(ids[2]).expect("live"), 1);
    assert!(!net.contains_node(ids[1]));
    assert!(net.validate().is_empty());
    let err = net.degree(ids[1]).expect_err("deleted node is stale");
    assert_eq!(err, NetworkError::UnknownNode { node: ids[1] });
}

#[test]
fn deleted_ids_are_not_reused() {
    let mut net = Network::with_seed(Directedness::Undirected, 2);
    let first = net.add_node();
    net.delete_node(first).expect("node exists");
    let second = net.add_node();
    assert_ne!(first, second);
    assert_eq!(net.node_ids(), vec![second]);
}

#[rstest]
fn break_and_define_round_trip(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    let arc = net.node(ids[0]).expect("live").edges_out()[0];
    let complement = net.edge(arc).and_then(Edge::complement).expect("paired");

    assert_eq!(net.break_edge(arc).expect("connected"), ids[1]);
    assert!(net.edge(arc).expect("live").is_stub());
    assert!(!net.validate().is_empty(), "half-broken edge is inconsistent");

    net.break_edge(complement).expect("connected");
    assert_eq!(net.stub_count(), 2);
    assert!(net.validate().is_empty(), "two stubs are consistent");

    net.define_edge_end(arc, ids[3]).expect("stub");
    let reverse = net.add_stub(ids[3]).expect("live");
    net.define_edge_end(reverse, ids[0]).expect("stub");
    assert_eq!(net.edge(arc).and_then(Edge::complement), Some(reverse));
    assert!(net.is_connected_to(ids[0], ids[3]));
    assert_eq!(net.stub_count(), 1, "the old complement is still a stub");
    assert!(net.validate().is_empty());
}

#[rstest]
fn define_rejects_connected_arc(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    let arc = net.node(ids[0]).expect("live").edges_out()[0];
    let err = net.define_edge_end(arc, ids[2]).expect_err("arc is connected");
    assert_eq!(err.code(), crate::NetworkErrorCode::EdgeNotStub);
}

#[rstest]
fn rewire_pair_preserves_degrees(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    let degrees: Vec<usize> = ids.iter().map(|&id| net.degree(id).expect("live")).collect();
    let first = net.node(ids[0]).expect("live").edges_out()[0];
    let second = net
        .out_arcs(ids[2])
        .find(|arc| arc.end() == Some(ids[3]))
        .map(Edge::id)
        .expect("2-3 exists");

    net.rewire_pair(first, second).expect("valid swap");

    assert!(net.is_connected_to(ids[0], ids[3]));
    assert!(net.is_connected_to(ids[2], ids[1]));
    let after: Vec<usize> = ids.iter().map(|&id| net.degree(id).expect("live")).collect();
    assert_eq!(degrees, after);
    assert!(net.validate().is_empty());
}

#[rstest]
fn rewire_with_complement_is_rejected(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    let arc = net.node(ids[0]).expect("live").edges_out()[0];
    let complement = net.edge(arc).and_then(Edge::complement).expect("paired");
    let err = net
        .rewire_pair(arc, complement)
        .expect_err("complement swap is degenerate");
    assert!(matches!(err, NetworkError::DegenerateSwap { .. }));
}

#[test]
fn directed_swap_exchanges_destinations() {
    let mut net = Network::with_seed(Directedness::Directed, 8);
    let ids = net.populate(4);
    let first = net.connect(ids[0], ids[1]).expect("live");
    let second = net.connect(ids[2], ids[3]).expect("live");
    net.swap_edge_ends(first, second).expect("valid swap");
    assert!(net.is_connected_to(ids[0], ids[3]));
    assert!(net.is_connected_to(ids[2], ids[1]));
    assert_eq!(net.in_degree(ids[1]).expect("live"), 1);
    assert!(net.validate().is_empty());
}

#[rstest]
fn undirected_swap_leaves_complements_stale(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    let first = net.node(ids[0]).expect("live").edges_out()[0];
    let second = net
        .out_arcs(ids[2])
        .find(|arc| arc.end() == Some(ids[3]))
        .map(Edge::id)
        .expect("2-3 exists");
    net.swap_edge_ends(first, second).expect("valid swap");
    assert!(
        net.validate()
            .iter()
            .any(|violation| matches!(violation, NetworkViolation::ComplementMismatch { .. }))
    );
}

#[rstest]
fn disconnect_removes_both_arcs(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    assert!(net.disconnect(ids[2], ids[1]).expect("nodes exist"));
    assert!(!net.is_connected_to(ids[1], ids[2]));
    assert!(!net.disconnect(ids[2], ids[1]).expect("nodes exist"));
    assert!(net.validate().is_empty());
}

#[rstest]
fn degree_histogram_is_invalidated_by_mutation(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    assert!(net.topology_altered());
    assert_eq!(net.degree_histogram(), &[0, 2, 2]);
    assert!(!net.topology_altered());
    net.connect(ids[0], ids[3]).expect("nodes exist");
    assert!(net.topology_altered());
    assert_eq!(net.degree_histogram(), &[0, 0, 4]);
}

#[rstest]
fn state_counts_track_updates(path: (Network, Vec<NodeId>)) {
    let (mut net, ids) = path;
    net.set_state(ids[0], EpiState::Infectious).expect("live");
    net.set_state(ids[1], EpiState::Resistant).expect("live");
    let counts = net.state_counts();
    assert_eq!(counts.susceptible, 2);
    assert_eq!(counts.infectious, 1);
    assert_eq!(counts.resistant, 1);
    net.set_all_states(EpiState::Susceptible);
    assert_eq!(net.state_counts().susceptible, 4);
}

#[test]
fn random_picks_only_live_handles() {
    let mut net = Network::with_seed(Directedness::Undirected, 5);
    assert!(net.random_node().is_none());
    let ids = net.populate(3);
    net.delete_node(ids[0]).expect("live");
    for _ in 0..32 {
        let picked = net.random_node().expect("network is non-empty");
        assert_ne!(picked, ids[0]);
    }
    net.connect(ids[1], ids[2]).expect("live");
    let edge = net.random_edge().expect("two arcs exist");
    assert!(net.edge(edge).is_some());
}

#[test]
fn non_finite_cost_is_rejected() {
    let mut net = Network::with_seed(Directedness::Directed, 9);
    let ids = net.populate(2);
    let err = net
        .connect_with_cost(ids[0], ids[1], f64::NAN)
        .expect_err("NaN cost must fail");
    assert!(matches!(err, NetworkError::NonFiniteCost { .. }));
}

#[test]
fn self_loop_stubs_pair_with_each_other() {
    let mut net = Network::with_seed(Directedness::Undirected, 4);
    let node = net.add_node();
    let first = net.add_stub(node).expect("live");
    let second = net.add_stub(node).expect("live");
    net.define_edge_end(first, node).expect("stub");
    net.define_edge_end(second, node).expect("stub");
    assert_eq!(net.edge(first).and_then(Edge::complement), Some(second));
    assert!(net.edge(first).expect("live").is_self_loop());
    assert!(net.validate().is_empty());
}
