//! Consistency audit for the outbound/inbound bookkeeping.
//!
//! The audit reports every violation it finds and never repairs anything:
//! the mutation primitives are expected to keep the network consistent, so a
//! non-empty report points at a bug rather than at bad input.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::{Directedness, EdgeId, Network, NodeId};

/// A single inconsistency found by [`Network::validate`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum NetworkViolation {
    /// A node lists an inbound arc that no longer exists.
    #[error("node {node} lists missing inbound edge {edge}")]
    DanglingInbound {
        /// Node holding the stale reference.
        node: NodeId,
        /// The missing arc.
        edge: EdgeId,
    },
    /// An inbound arc's start node is gone.
    #[error("inbound edge {edge} of node {node} starts at missing node {start}")]
    MissingStart {
        /// Node holding the inbound reference.
        node: NodeId,
        /// The arc.
        edge: EdgeId,
        /// Its recorded start.
        start: NodeId,
    },
    /// An inbound arc does not end at the node that lists it.
    #[error("inbound edge {edge} of node {node} ends at {recorded:?}")]
    InboundEndMismatch {
        /// Node holding the inbound reference.
        node: NodeId,
        /// The arc.
        edge: EdgeId,
        /// The arc's recorded end.
        recorded: Option<NodeId>,
    },
    /// A node lists an outbound arc that no longer exists.
    #[error("node {node} lists missing outbound edge {edge}")]
    DanglingOutbound {
        /// Node holding the stale reference.
        node: NodeId,
        /// The missing arc.
        edge: EdgeId,
    },
    /// An outbound arc's recorded start differs from the owning node.
    #[error("outbound edge {edge} of node {node} records start {recorded}")]
    OutboundStartMismatch {
        /// Owning node.
        node: NodeId,
        /// The arc.
        edge: EdgeId,
        /// The arc's recorded start.
        recorded: NodeId,
    },
    /// An arc ends at a node that no longer exists.
    #[error("edge {edge} ends at missing node {end}")]
    MissingEnd {
        /// The arc.
        edge: EdgeId,
        /// Its recorded end.
        end: NodeId,
    },
    /// An arc is absent from its end node's inbound list.
    #[error("edge {edge} is missing from the inbound list of {end}")]
    MissingInboundRecord {
        /// The arc.
        edge: EdgeId,
        /// Its end node.
        end: NodeId,
    },
    /// An undirected arc has no complement.
    #[error("undirected edge {edge} has no complement")]
    MissingComplement {
        /// The unpaired arc.
        edge: EdgeId,
    },
    /// An undirected arc's complement is not its antiparallel partner.
    #[error("edge {edge} has complement {complement} that is not antiparallel")]
    ComplementMismatch {
        /// The arc.
        edge: EdgeId,
        /// Its recorded complement.
        complement: EdgeId,
    },
}

impl Network {
    /// Audits the adjacency bookkeeping and returns every violation found.
    ///
    /// Runs in O(N + E).
    ///
    /// # Examples
    /// ```
    /// use epinet_core::{Directedness, Network};
    ///
    /// let mut net = Network::with_seed(Directedness::Undirected, 3);
    /// let ids = net.populate(4);
    /// for pair in ids.windows(2) {
    ///     net.connect(pair[0], pair[1])?;
    /// }
    /// net.delete_node(ids[1])?;
    /// assert!(net.validate().is_empty());
    /// # Ok::<(), epinet_core::NetworkError>(())
    /// ```
    #[must_use]
    pub fn validate(&self) -> Vec<NetworkViolation> {
        let mut violations = Vec::new();
        let mut inbound = HashSet::new();

        for node in self.nodes.iter() {
            for &edge in node.edges_in() {
                inbound.insert((node.id(), edge));
                self.check_inbound(node.id(), edge, &mut violations);
            }
        }
        for node in self.nodes.iter() {
            for &edge in node.edges_out() {
                self.check_outbound(node.id(), edge, &inbound, &mut violations);
            }
        }

        for violation in &violations {
            debug!(%violation, "network violation");
        }
        violations
    }

    fn check_inbound(&self, node: NodeId, edge: EdgeId, out: &mut Vec<NetworkViolation>) {
        let Some(arc) = self.edge(edge) else {
            out.push(NetworkViolation::DanglingInbound { node, edge });
            return;
        };
        if !self.contains_node(arc.start()) {
            out.push(NetworkViolation::MissingStart {
                node,
                edge,
                start: arc.start(),
            });
        }
        if arc.end() != Some(node) {
            out.push(NetworkViolation::InboundEndMismatch {
                node,
                edge,
                recorded: arc.end(),
            });
        }
    }

    fn check_outbound(
        &self,
        node: NodeId,
        edge: EdgeId,
        inbound: &HashSet<(NodeId, EdgeId)>,
        out: &mut Vec<NetworkViolation>,
    ) {
        let Some(arc) = self.edge(edge) else {
            out.push(NetworkViolation::DanglingOutbound { node, edge });
            return;
        };
        if arc.start() != node {
            out.push(NetworkViolation::OutboundStartMismatch {
                node,
                edge,
                recorded: arc.start(),
            });
        }
        let Some(end) = arc.end() else {
            return;
        };
        if !self.contains_node(end) {
            out.push(NetworkViolation::MissingEnd { edge, end });
        } else if !inbound.contains(&(end, edge)) {
            out.push(NetworkViolation::MissingInboundRecord { edge, end });
        }

        if self.directedness == Directedness::Undirected {
            match arc.complement() {
                None => out.push(NetworkViolation::MissingComplement { edge }),
                Some(complement) => {
                    let paired = self.edge(complement).is_some_and(|partner| {
                        partner.id() != edge
                            && partner.start() == end
                            && partner.end() == Some(arc.start())
                            && partner.complement() == Some(edge)
                    });
                    if !paired {
                        out.push(NetworkViolation::ComplementMismatch { edge, complement });
                    }
                }
            }
        }
    }
}
