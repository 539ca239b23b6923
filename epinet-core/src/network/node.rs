//! Node records and the per-node epidemiological state.

use std::fmt;

use super::edge::EdgeId;

/// Stable identifier of a node within a [`crate::Network`].
///
/// Identifiers are allocated from a monotonically increasing counter and are
/// never reused, so they may become non-dense after deletions.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 7);
/// let a = net.add_node();
/// let b = net.add_node();
/// assert!(a < b);
/// assert_eq!(a.get() + 1, b.get());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Epidemiological state carried by every node.
///
/// SEIRS engines use all four states; the percolation and chain-binomial
/// engines only use `Susceptible`, `Infectious` and `Resistant`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EpiState {
    /// Can be infected.
    #[default]
    Susceptible,
    /// Infected but not yet infectious.
    Exposed,
    /// Infected and able to transmit.
    Infectious,
    /// Recovered and (for now) immune.
    Resistant,
}

/// Number of nodes in each [`EpiState`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StateCounts {
    /// Nodes in [`EpiState::Susceptible`].
    pub susceptible: usize,
    /// Nodes in [`EpiState::Exposed`].
    pub exposed: usize,
    /// Nodes in [`EpiState::Infectious`].
    pub infectious: usize,
    /// Nodes in [`EpiState::Resistant`].
    pub resistant: usize,
}

impl StateCounts {
    pub(crate) fn record(&mut self, state: EpiState) {
        match state {
            EpiState::Susceptible => self.susceptible += 1,
            EpiState::Exposed => self.exposed += 1,
            EpiState::Infectious => self.infectious += 1,
            EpiState::Resistant => self.resistant += 1,
        }
    }

    /// Total number of nodes counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.susceptible + self.exposed + self.infectious + self.resistant
    }
}

impl fmt::Display for StateCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={} E={} I={} R={}",
            self.susceptible, self.exposed, self.infectious, self.resistant
        )
    }
}

/// Planar position attached to a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// A vertex of the contact network.
///
/// Outbound edges are owned by the node; inbound edges are back-references to
/// arcs owned by other nodes. Both lists are maintained by
/// [`crate::Network`], which is the only way to mutate a node.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    location: Option<Location>,
    state: EpiState,
    pub(super) edges_out: Vec<EdgeId>,
    pub(super) edges_in: Vec<EdgeId>,
}

impl Node {
    pub(super) fn new(id: NodeId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            location: None,
            state: EpiState::Susceptible,
            edges_out: Vec::new(),
            edges_in: Vec::new(),
        }
    }

    /// Returns the node's identifier.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the optional spatial location.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }

    /// Returns the current epidemiological state.
    #[must_use]
    pub const fn state(&self) -> EpiState {
        self.state
    }

    /// Outbound arcs owned by this node, including stubs.
    #[must_use]
    pub fn edges_out(&self) -> &[EdgeId] {
        &self.edges_out
    }

    /// Inbound arcs ending at this node.
    #[must_use]
    pub fn edges_in(&self) -> &[EdgeId] {
        &self.edges_in
    }

    /// Number of outbound arcs (stubs included).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.edges_out.len()
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    pub(super) fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    pub(super) fn set_state(&mut self, state: EpiState) {
        self.state = state;
    }

    pub(super) fn drop_out(&mut self, edge: EdgeId) -> bool {
        remove_first(&mut self.edges_out, edge)
    }

    pub(super) fn drop_in(&mut self, edge: EdgeId) -> bool {
        remove_first(&mut self.edges_in, edge)
    }
}

fn remove_first(list: &mut Vec<EdgeId>, edge: EdgeId) -> bool {
    match list.iter().position(|&candidate| candidate == edge) {
        Some(pos) => {
            list.swap_remove(pos);
            true
        }
        None => false,
    }
}
