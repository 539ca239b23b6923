//! Graph substrate: nodes, arcs and the owning [`Network`].
//!
//! The network is the sole owner of every node and arc. Nodes and arcs refer
//! to each other through [`NodeId`] and [`EdgeId`] handles into index-stable
//! arenas, so the start/end/inbound bookkeeping never needs shared ownership.
//! All mutation goes through the primitives on [`Network`], which keep the
//! outbound and inbound lists consistent; [`Network::validate`] audits them.

mod arena;
mod edge;
mod node;
mod validate;

use std::cell::OnceCell;

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
use tracing::trace;

use crate::error::{NetworkError, Result};

use self::arena::Arena;

pub use self::{
    edge::{DEFAULT_COST, Edge, EdgeId},
    node::{EpiState, Location, Node, NodeId, StateCounts},
    validate::NetworkViolation,
};

/// Whether connections are one-way arcs or paired undirected edges.
///
/// Fixed when the [`Network`] is constructed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Directedness {
    /// `connect(a, b)` creates a single arc `a -> b`.
    Directed,
    /// `connect(a, b)` creates `a -> b` and its complement `b -> a`.
    Undirected,
}

/// Owner of all topology state for one contact network.
///
/// The network also owns the random number generator used by the generators
/// and the epidemic engines, so a fixed seed reproduces a whole experiment.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 1);
/// let ids = net.populate(3);
/// net.connect(ids[0], ids[1])?;
/// net.connect(ids[1], ids[2])?;
/// assert_eq!(net.edge_count(), 2);
/// assert_eq!(net.degree(ids[1])?, 2);
/// assert!(net.validate().is_empty());
/// # Ok::<(), epinet_core::NetworkError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Network {
    directedness: Directedness,
    nodes: Arena<Node>,
    edges: Arena<Edge>,
    rng: SmallRng,
    degree_histogram: OnceCell<Vec<usize>>,
}

impl Network {
    /// Creates an empty network seeded from system entropy.
    #[must_use]
    pub fn new(directedness: Directedness) -> Self {
        Self::from_rng(directedness, SmallRng::from_entropy())
    }

    /// Creates an empty network with a deterministic RNG stream.
    #[must_use]
    pub fn with_seed(directedness: Directedness, seed: u64) -> Self {
        Self::from_rng(directedness, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(directedness: Directedness, rng: SmallRng) -> Self {
        Self {
            directedness,
            nodes: Arena::default(),
            edges: Arena::default(),
            rng,
            degree_histogram: OnceCell::new(),
        }
    }

    /// Restarts the RNG stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub(crate) fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Returns the directedness fixed at construction.
    #[must_use]
    pub const fn directedness(&self) -> Directedness {
        self.directedness
    }

    /// Whether connections are single arcs.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directedness == Directedness::Directed
    }

    /// Number of live nodes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of arcs, stubs included.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of stubs awaiting pairing.
    #[must_use]
    pub fn stub_count(&self) -> usize {
        self.edges.iter().filter(|edge| edge.is_stub()).count()
    }

    /// Number of connections: arcs in directed mode, complement pairs in
    /// undirected mode. Stubs are not counted.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let connected = self.arc_count() - self.stub_count();
        match self.directedness {
            Directedness::Directed => connected,
            Directedness::Undirected => connected / 2,
        }
    }

    /// Whether the topology changed since the degree histogram was last
    /// computed.
    #[must_use]
    pub fn topology_altered(&self) -> bool {
        self.degree_histogram.get().is_none()
    }

    fn mark_altered(&mut self) {
        self.degree_histogram.take();
    }

    /// Count of nodes per outbound degree, indexed by degree.
    ///
    /// The histogram is cached until the next topology change.
    #[must_use]
    pub fn degree_histogram(&self) -> &[usize] {
        self.degree_histogram.get_or_init(|| {
            let mut histogram = Vec::new();
            for node in self.nodes.iter() {
                let degree = node.degree();
                if histogram.len() <= degree {
                    histogram.resize(degree + 1, 0);
                }
                histogram[degree] += 1;
            }
            histogram
        })
    }

    /// Adds an anonymous node.
    pub fn add_node(&mut self) -> NodeId {
        self.insert_node(None)
    }

    /// Adds a node carrying `name`.
    pub fn add_named_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert_node(Some(name.into()))
    }

    fn insert_node(&mut self, name: Option<String>) -> NodeId {
        self.mark_altered();
        let index = self
            .nodes
            .insert_with(|index| Node::new(NodeId::new(index), name));
        NodeId::new(index)
    }

    /// Adds `count` anonymous nodes and returns their identifiers in order.
    pub fn populate(&mut self, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.add_node()).collect()
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.get())
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id.get())
    }

    /// Looks up an arc.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.get())
    }

    /// Live node identifiers in ascending order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(Node::id).collect()
    }

    /// Live nodes in ascending identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Live arcs in ascending identifier order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    fn node_ref(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(NetworkError::UnknownNode { node: id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.get())
            .ok_or(NetworkError::UnknownNode { node: id })
    }

    fn edge_ref(&self, id: EdgeId) -> Result<&Edge> {
        self.edge(id).ok_or(NetworkError::UnknownEdge { edge: id })
    }

    /// Sets the display name of `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn set_name(&mut self, node: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut(node)?.set_name(name.into());
        Ok(())
    }

    /// Sets the spatial location of `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn set_location(&mut self, node: NodeId, location: Location) -> Result<()> {
        self.node_mut(node)?.set_location(location);
        Ok(())
    }

    /// Returns the epidemiological state of `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn state(&self, node: NodeId) -> Result<EpiState> {
        Ok(self.node_ref(node)?.state())
    }

    /// Overwrites the epidemiological state of `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn set_state(&mut self, node: NodeId, state: EpiState) -> Result<()> {
        self.node_mut(node)?.set_state(state);
        Ok(())
    }

    /// Overwrites the state of every node.
    pub fn set_all_states(&mut self, state: EpiState) {
        for node in self.nodes.iter_mut() {
            node.set_state(state);
        }
    }

    /// Counts nodes per epidemiological state.
    #[must_use]
    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for node in self.nodes.iter() {
            counts.record(node.state());
        }
        counts
    }

    /// Deletes `node` together with every arc that starts or ends at it, and
    /// the complements of those arcs.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn delete_node(&mut self, node: NodeId) -> Result<()> {
        let record = self.node_ref(node)?;
        let mut doomed: Vec<EdgeId> = record
            .edges_out
            .iter()
            .chain(record.edges_in.iter())
            .copied()
            .collect();
        let complements: Vec<EdgeId> = doomed
            .iter()
            .filter_map(|&edge| self.edge(edge).and_then(Edge::complement))
            .collect();
        doomed.extend(complements);
        doomed.sort_unstable();
        doomed.dedup();

        trace!(%node, arcs = doomed.len(), "deleting node");
        for edge in doomed {
            self.detach_arc(edge);
        }
        self.nodes.remove(node.get());
        self.mark_altered();
        Ok(())
    }

    /// Connects `a` to `b` with the default cost and returns the `a -> b` arc.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] when either endpoint is stale.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId> {
        self.connect_with_cost(a, b, DEFAULT_COST)
    }

    /// Connects `a` to `b` with `cost` and returns the `a -> b` arc. In
    /// undirected mode the complementary `b -> a` arc is created as well.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] when either endpoint is stale and
    /// [`NetworkError::NonFiniteCost`] for NaN or infinite costs.
    pub fn connect_with_cost(&mut self, a: NodeId, b: NodeId, cost: f64) -> Result<EdgeId> {
        if !cost.is_finite() {
            return Err(NetworkError::NonFiniteCost { cost });
        }
        self.node_ref(a)?;
        self.node_ref(b)?;
        let forward = self.attach_arc(a, Some(b), cost);
        if self.directedness == Directedness::Undirected {
            let backward = self.attach_arc(b, Some(a), cost);
            self.link_complements(forward, backward);
        }
        Ok(forward)
    }

    /// Removes one connection from `a` to `b`, returning whether one existed.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] when either endpoint is stale.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.node_ref(b)?;
        let found = self
            .node_ref(a)?
            .edges_out
            .iter()
            .copied()
            .find(|&edge| self.edge(edge).is_some_and(|arc| arc.end() == Some(b)));
        match found {
            Some(edge) => {
                self.delete_edge(edge)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deletes an arc and, in undirected mode, its complement.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownEdge`] for a stale handle.
    pub fn delete_edge(&mut self, edge: EdgeId) -> Result<()> {
        let complement = self.edge_ref(edge)?.complement();
        self.detach_arc(edge);
        if let Some(complement) = complement {
            self.detach_arc(complement);
        }
        Ok(())
    }

    /// Adds a stub (an arc without destination) to `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn add_stub(&mut self, node: NodeId) -> Result<EdgeId> {
        self.node_ref(node)?;
        Ok(self.attach_arc(node, None, DEFAULT_COST))
    }

    /// Turns a connected arc back into a stub and returns its former end.
    ///
    /// The arc leaves the former end's inbound list. In undirected mode the
    /// complement link is dissolved on both sides; the network validates
    /// again once the partner is broken too or the arc is re-paired through
    /// [`Self::define_edge_end`].
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownEdge`] for a stale handle and
    /// [`NetworkError::EdgeIsStub`] when the arc is already a stub.
    pub fn break_edge(&mut self, edge: EdgeId) -> Result<NodeId> {
        let record = self.edge_ref(edge)?;
        let end = record.end().ok_or(NetworkError::EdgeIsStub { edge })?;
        let complement = record.complement();
        if let Some(node) = self.nodes.get_mut(end.get()) {
            node.drop_in(edge);
        }
        if let Some(partner) = complement.and_then(|id| self.edges.get_mut(id.get())) {
            partner.complement = None;
        }
        if let Some(record) = self.edges.get_mut(edge.get()) {
            record.end = None;
            record.complement = None;
        }
        self.mark_altered();
        Ok(end)
    }

    /// Attaches a stub to `end`.
    ///
    /// In undirected mode the arc is paired with an unpaired `end -> start`
    /// arc when one exists.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownEdge`] or [`NetworkError::UnknownNode`]
    /// for stale handles and [`NetworkError::EdgeNotStub`] when the arc is
    /// already connected.
    pub fn define_edge_end(&mut self, edge: EdgeId, end: NodeId) -> Result<()> {
        let record = self.edge_ref(edge)?;
        if let Some(current) = record.end() {
            return Err(NetworkError::EdgeNotStub { edge, end: current });
        }
        let start = record.start();
        self.node_mut(end)?.edges_in.push(edge);
        if let Some(record) = self.edges.get_mut(edge.get()) {
            record.end = Some(end);
        }
        if self.directedness == Directedness::Undirected {
            if let Some(partner) = self.find_unpaired(end, start, edge) {
                self.link_complements(edge, partner);
            }
        }
        self.mark_altered();
        Ok(())
    }

    /// Exchanges the destinations of two arcs without touching complements.
    ///
    /// In undirected mode this leaves both complement links stale until the
    /// partner arcs are swapped as well; [`Self::rewire_pair`] does both.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownEdge`] for stale handles,
    /// [`NetworkError::EdgeIsStub`] when either arc is a stub and
    /// [`NetworkError::DegenerateSwap`] when both handles are the same arc.
    pub fn swap_edge_ends(&mut self, first: EdgeId, second: EdgeId) -> Result<()> {
        self.check_swap(first, second)?;
        self.exchange_ends(first, second);
        self.mark_altered();
        Ok(())
    }

    /// Rewires two connections so that every node keeps its degree.
    ///
    /// In undirected mode edges `a-b` and `c-d` become `a-d` and `c-b`, with
    /// the complements swapped and relinked. In directed mode this is the same
    /// as [`Self::swap_edge_ends`].
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownEdge`] for stale handles,
    /// [`NetworkError::EdgeIsStub`] when either arc is a stub,
    /// [`NetworkError::DegenerateSwap`] when the arcs are identical or
    /// complementary, and [`NetworkError::MissingComplement`] when an
    /// undirected arc is unpaired.
    pub fn rewire_pair(&mut self, first: EdgeId, second: EdgeId) -> Result<()> {
        self.check_swap(first, second)?;
        if self.directedness == Directedness::Directed {
            self.exchange_ends(first, second);
            self.mark_altered();
            return Ok(());
        }
        let first_complement = self
            .edge_ref(first)?
            .complement()
            .ok_or(NetworkError::MissingComplement { edge: first })?;
        let second_complement = self
            .edge_ref(second)?
            .complement()
            .ok_or(NetworkError::MissingComplement { edge: second })?;
        if first_complement == second {
            return Err(NetworkError::DegenerateSwap {
                edge: first,
                other: second,
            });
        }
        self.exchange_ends(first, second);
        self.exchange_ends(first_complement, second_complement);
        self.link_complements(first, second_complement);
        self.link_complements(second, first_complement);
        self.mark_altered();
        Ok(())
    }

    fn check_swap(&self, first: EdgeId, second: EdgeId) -> Result<()> {
        if first == second {
            return Err(NetworkError::DegenerateSwap {
                edge: first,
                other: second,
            });
        }
        if self.edge_ref(first)?.is_stub() {
            return Err(NetworkError::EdgeIsStub { edge: first });
        }
        if self.edge_ref(second)?.is_stub() {
            return Err(NetworkError::EdgeIsStub { edge: second });
        }
        Ok(())
    }

    /// Destinations of the non-stub outbound arcs of `node`, with
    /// multiplicity.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn neighbors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.node_ref(node)?;
        Ok(self.out_neighbors(node).collect())
    }

    /// Number of outbound arcs of `node`, stubs included.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn degree(&self, node: NodeId) -> Result<usize> {
        Ok(self.node_ref(node)?.degree())
    }

    /// Number of inbound arcs of `node`.
    ///
    /// # Errors
    /// Returns [`NetworkError::UnknownNode`] for a stale handle.
    pub fn in_degree(&self, node: NodeId) -> Result<usize> {
        Ok(self.node_ref(node)?.edges_in().len())
    }

    /// Whether an arc `a -> b` exists.
    #[must_use]
    pub fn is_connected_to(&self, a: NodeId, b: NodeId) -> bool {
        self.out_neighbors(a).any(|neighbor| neighbor == b)
    }

    /// Picks a live node uniformly at random.
    pub fn random_node(&mut self) -> Option<NodeId> {
        self.nodes
            .live()
            .choose(&mut self.rng)
            .map(|&index| NodeId::new(index))
    }

    /// Picks a live arc uniformly at random.
    pub fn random_edge(&mut self) -> Option<EdgeId> {
        self.edges
            .live()
            .choose(&mut self.rng)
            .map(|&index| EdgeId::new(index))
    }

    /// Deletes every arc while keeping all nodes.
    pub fn clear_edges(&mut self) {
        for node in self.nodes.iter_mut() {
            node.edges_out.clear();
            node.edges_in.clear();
        }
        self.edges.clear();
        self.mark_altered();
    }

    pub(crate) fn out_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_arcs(node).filter_map(Edge::end)
    }

    pub(crate) fn in_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(node)
            .into_iter()
            .flat_map(|record| record.edges_in.iter())
            .filter_map(|&edge| self.edge(edge).map(Edge::start))
    }

    pub(crate) fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.node(node)
            .into_iter()
            .flat_map(|record| record.edges_out.iter())
            .filter_map(|&edge| self.edge(edge))
    }

    fn attach_arc(&mut self, start: NodeId, end: Option<NodeId>, cost: f64) -> EdgeId {
        let index = self
            .edges
            .insert_with(|index| Edge::new(EdgeId::new(index), start, end, cost));
        let edge = EdgeId::new(index);
        if let Some(node) = self.nodes.get_mut(start.get()) {
            node.edges_out.push(edge);
        }
        if let Some(node) = end.and_then(|end| self.nodes.get_mut(end.get())) {
            node.edges_in.push(edge);
        }
        self.mark_altered();
        edge
    }

    fn detach_arc(&mut self, edge: EdgeId) -> Option<Edge> {
        let removed = self.edges.remove(edge.get())?;
        if let Some(node) = self.nodes.get_mut(removed.start().get()) {
            node.drop_out(edge);
        }
        if let Some(node) = removed.end().and_then(|end| self.nodes.get_mut(end.get())) {
            node.drop_in(edge);
        }
        if let Some(partner) = removed
            .complement()
            .and_then(|id| self.edges.get_mut(id.get()))
        {
            if partner.complement == Some(edge) {
                partner.complement = None;
            }
        }
        self.mark_altered();
        Some(removed)
    }

    fn link_complements(&mut self, first: EdgeId, second: EdgeId) {
        if let Some(record) = self.edges.get_mut(first.get()) {
            record.complement = Some(second);
        }
        if let Some(record) = self.edges.get_mut(second.get()) {
            record.complement = Some(first);
        }
    }

    fn find_unpaired(&self, from: NodeId, to: NodeId, exclude: EdgeId) -> Option<EdgeId> {
        self.out_arcs(from)
            .find(|arc| arc.id() != exclude && arc.end() == Some(to) && arc.complement().is_none())
            .map(Edge::id)
    }

    fn exchange_ends(&mut self, first: EdgeId, second: EdgeId) {
        let first_end = self.edge(first).and_then(Edge::end);
        let second_end = self.edge(second).and_then(Edge::end);
        self.retarget(first, second_end);
        self.retarget(second, first_end);
    }

    fn retarget(&mut self, edge: EdgeId, new_end: Option<NodeId>) {
        let Some(record) = self.edges.get_mut(edge.get()) else {
            return;
        };
        let old_end = std::mem::replace(&mut record.end, new_end);
        if old_end == new_end {
            return;
        }
        if let Some(node) = old_end.and_then(|end| self.nodes.get_mut(end.get())) {
            node.drop_in(edge);
        }
        if let Some(node) = new_end.and_then(|end| self.nodes.get_mut(end.get())) {
            node.edges_in.push(edge);
        }
    }
}

#[cfg(test)]
mod tests;
