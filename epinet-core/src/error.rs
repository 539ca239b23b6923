//! Error types for the epinet core library.
//!
//! Each concern (network mutation, topology generation, simulation) exposes
//! its own error enum with a stable machine-readable code.

use std::fmt;

use thiserror::Error;

use crate::network::{EdgeId, NodeId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::Network`] mutation and query primitives.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NetworkError {
    /// The node handle does not refer to a live node.
    #[error("node {node} does not exist")]
    UnknownNode {
        /// The stale or foreign handle.
        node: NodeId,
    },
    /// The edge handle does not refer to a live arc.
    #[error("edge {edge} does not exist")]
    UnknownEdge {
        /// The stale or foreign handle.
        edge: EdgeId,
    },
    /// The operation needs a connected arc but received a stub.
    #[error("edge {edge} is a stub")]
    EdgeIsStub {
        /// The stub arc.
        edge: EdgeId,
    },
    /// The operation needs a stub but the arc already has an end.
    #[error("edge {edge} already ends at {end}")]
    EdgeNotStub {
        /// The connected arc.
        edge: EdgeId,
        /// Its current destination.
        end: NodeId,
    },
    /// Arc costs must be finite.
    #[error("edge cost must be finite (got {cost})")]
    NonFiniteCost {
        /// The rejected cost.
        cost: f64,
    },
    /// An arc cannot have its endpoints swapped with itself or its complement.
    #[error("cannot swap edge {edge} with {other}")]
    DegenerateSwap {
        /// First arc of the swap.
        edge: EdgeId,
        /// Second arc of the swap.
        other: EdgeId,
    },
    /// An undirected arc lacked the complement the operation relies on.
    #[error("undirected edge {edge} has no complement")]
    MissingComplement {
        /// The unpaired arc.
        edge: EdgeId,
    },
}

define_error_codes! {
    /// Stable codes describing [`NetworkError`] variants.
    enum NetworkErrorCode for NetworkError {
        /// The node handle does not refer to a live node.
        UnknownNode => UnknownNode { .. } => "NETWORK_UNKNOWN_NODE",
        /// The edge handle does not refer to a live arc.
        UnknownEdge => UnknownEdge { .. } => "NETWORK_UNKNOWN_EDGE",
        /// The operation needs a connected arc but received a stub.
        EdgeIsStub => EdgeIsStub { .. } => "NETWORK_EDGE_IS_STUB",
        /// The operation needs a stub but the arc already has an end.
        EdgeNotStub => EdgeNotStub { .. } => "NETWORK_EDGE_NOT_STUB",
        /// Arc costs must be finite.
        NonFiniteCost => NonFiniteCost { .. } => "NETWORK_NON_FINITE_COST",
        /// An arc cannot be swapped with itself or its complement.
        DegenerateSwap => DegenerateSwap { .. } => "NETWORK_DEGENERATE_SWAP",
        /// An undirected arc lacked its complement.
        MissingComplement => MissingComplement { .. } => "NETWORK_MISSING_COMPLEMENT",
    }
}

/// Error type produced by the topology generators.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// The generator needs at least one node to work with.
    #[error("network has no nodes")]
    EmptyNetwork,
    /// A numeric parameter was outside its valid range.
    #[error("parameter `{name}` is invalid (got {value})")]
    InvalidParameter {
        /// Parameter name as it appears in the API.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The degree distribution had no entries.
    #[error("degree distribution is empty")]
    EmptyDistribution,
    /// The degree distribution carried a negative or non-finite weight.
    #[error("degree {degree} has invalid weight {weight}")]
    InvalidWeight {
        /// Degree whose weight was rejected.
        degree: usize,
        /// The rejected weight.
        weight: f64,
    },
    /// Probabilities did not sum to one within tolerance.
    #[error("degree distribution sums to {sum}, expected 1")]
    InvalidDistribution {
        /// The observed sum.
        sum: f64,
    },
    /// An explicit degree sequence did not match the node count.
    #[error("degree sequence has {got} entries but the network has {expected} nodes")]
    DegreeSequenceLength {
        /// Number of nodes in the network.
        expected: usize,
        /// Number of degrees supplied.
        got: usize,
    },
    /// Stub pairing requires an even number of stubs.
    #[error("degree sequence sums to odd total {sum}")]
    OddDegreeSum {
        /// The odd degree total.
        sum: usize,
    },
    /// The node count does not fit the requested lattice.
    #[error("lattice of {rows}x{cols} does not fit {nodes} nodes")]
    LatticeShape {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
        /// Nodes present in the network.
        nodes: usize,
    },
    /// The generator only supports undirected networks.
    #[error("`{generator}` requires an undirected network")]
    RequiresUndirected {
        /// Name of the generator.
        generator: &'static str,
    },
    /// Self-loop and multi-edge repair did not converge.
    #[error("edge repair gave up after {attempts} consecutive failed swaps")]
    RepairFailed {
        /// Consecutive rejected swap attempts before aborting.
        attempts: usize,
    },
    /// The caller cancelled construction.
    #[error("construction was cancelled")]
    Cancelled,
    /// A network primitive failed while wiring edges.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

define_error_codes! {
    /// Stable codes describing [`GeneratorError`] variants.
    enum GeneratorErrorCode for GeneratorError {
        /// The generator needs at least one node.
        EmptyNetwork => EmptyNetwork => "GENERATOR_EMPTY_NETWORK",
        /// A numeric parameter was outside its valid range.
        InvalidParameter => InvalidParameter { .. } => "GENERATOR_INVALID_PARAMETER",
        /// The degree distribution had no entries.
        EmptyDistribution => EmptyDistribution => "GENERATOR_EMPTY_DISTRIBUTION",
        /// The degree distribution carried an invalid weight.
        InvalidWeight => InvalidWeight { .. } => "GENERATOR_INVALID_WEIGHT",
        /// Probabilities did not sum to one.
        InvalidDistribution => InvalidDistribution { .. } => "GENERATOR_INVALID_DISTRIBUTION",
        /// Degree sequence length mismatch.
        DegreeSequenceLength => DegreeSequenceLength { .. } => "GENERATOR_DEGREE_SEQUENCE_LENGTH",
        /// Odd stub total.
        OddDegreeSum => OddDegreeSum { .. } => "GENERATOR_ODD_DEGREE_SUM",
        /// Lattice dimensions do not fit.
        LatticeShape => LatticeShape { .. } => "GENERATOR_LATTICE_SHAPE",
        /// Undirected network required.
        RequiresUndirected => RequiresUndirected { .. } => "GENERATOR_REQUIRES_UNDIRECTED",
        /// Repair did not converge.
        RepairFailed => RepairFailed { .. } => "GENERATOR_REPAIR_FAILED",
        /// Construction was cancelled.
        Cancelled => Cancelled => "GENERATOR_CANCELLED",
        /// A network primitive failed.
        NetworkFailure => Network(..) => "GENERATOR_NETWORK_FAILURE",
    }
}

impl GeneratorError {
    /// Retrieve the inner [`NetworkErrorCode`] when a network primitive failed.
    #[must_use]
    pub const fn network_code(&self) -> Option<NetworkErrorCode> {
        match self {
            Self::Network(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Error type produced by the epidemic engines.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationError {
    /// A rate or probability was outside its valid range.
    #[error("parameter `{name}` is invalid (got {value})")]
    InvalidParameter {
        /// Parameter name as it appears in the API.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// `rand_infect` asked for zero nodes or more than are susceptible.
    #[error("cannot infect {requested} node(s) when {susceptible} are susceptible")]
    InvalidInfectionCount {
        /// Number of nodes requested.
        requested: usize,
        /// Number of susceptible nodes available.
        susceptible: usize,
    },
    /// A step was requested with nobody infected.
    #[error("no infected individuals remain")]
    NoInfected,
    /// A step was requested with nothing scheduled.
    #[error("event queue is empty")]
    NoPendingEvents,
    /// A network primitive failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

define_error_codes! {
    /// Stable codes describing [`SimulationError`] variants.
    enum SimulationErrorCode for SimulationError {
        /// A rate or probability was invalid.
        InvalidParameter => InvalidParameter { .. } => "SIMULATION_INVALID_PARAMETER",
        /// Infection request out of range.
        InvalidInfectionCount => InvalidInfectionCount { .. } => "SIMULATION_INVALID_INFECTION_COUNT",
        /// Nobody is infected.
        NoInfected => NoInfected => "SIMULATION_NO_INFECTED",
        /// Nothing is scheduled.
        NoPendingEvents => NoPendingEvents => "SIMULATION_NO_PENDING_EVENTS",
        /// A network primitive failed.
        NetworkFailure => Network(..) => "SIMULATION_NETWORK_FAILURE",
    }
}

/// Convenient alias for results returned by network primitives.
pub type Result<T> = core::result::Result<T, NetworkError>;
