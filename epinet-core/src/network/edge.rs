//! Directed arcs owned by their start node.

use std::fmt;

use super::node::NodeId;

/// Stable identifier of an arc within a [`crate::Network`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId(usize);

impl EdgeId {
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

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Default cost assigned to arcs created without an explicit weight.
pub const DEFAULT_COST: f64 = 1.0;

/// A directed arc. An arc without an end is a *stub* awaiting pairing.
///
/// In undirected networks every connected arc is paired with an antiparallel
/// complement; the pair together represents one undirected edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    id: EdgeId,
    start: NodeId,
    pub(super) end: Option<NodeId>,
    cost: f64,
    pub(super) complement: Option<EdgeId>,
}

impl Edge {
    pub(super) fn new(id: EdgeId, start: NodeId, end: Option<NodeId>, cost: f64) -> Self {
        Self {
            id,
            start,
            end,
            cost,
            complement: None,
        }
    }

    /// Returns the arc identifier.
    #[must_use]
    pub const fn id(&self) -> EdgeId {
        self.id
    }

    /// Returns the owning node.
    #[must_use]
    pub const fn start(&self) -> NodeId {
        self.start
    }

    /// Returns the destination, or `None` for a stub.
    #[must_use]
    pub const fn end(&self) -> Option<NodeId> {
        self.end
    }

    /// Returns the traversal cost.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the antiparallel partner in undirected networks.
    #[must_use]
    pub const fn complement(&self) -> Option<EdgeId> {
        self.complement
    }

    /// Whether the arc is a half-connection without a destination.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        self.end.is_none()
    }

    /// Whether the arc starts and ends at the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.end == Some(self.start)
    }
}
