//! Contact networks and stochastic epidemics on them.
//!
//! A [`Network`] owns nodes, arcs and the random number generator. The
//! [`generators`] wire its nodes into classic topologies or configuration
//! models, [`analysis`] reads structural statistics back out, and the engines
//! re-exported at the crate root ([`GillespieSeirs`], [`PercolationSim`],
//! [`ChainBinomialSim`]) run epidemics over it.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod analysis;
mod cancel;
mod error;
pub mod generators;
mod network;
mod sampling;
mod sim;
#[cfg(test)]
mod test_utils;

pub use crate::{
    cancel::CancelToken,
    error::{
        GeneratorError, GeneratorErrorCode, NetworkError, NetworkErrorCode, Result,
        SimulationError, SimulationErrorCode,
    },
    generators::DegreeDistribution,
    network::{
        DEFAULT_COST, Directedness, Edge, EdgeId, EpiState, Location, Network, NetworkViolation,
        Node, NodeId, StateCounts,
    },
    sim::{
        ChainBinomialParams, ChainBinomialSim, EpidemicProcess, Event, EventKind, GillespieSeirs,
        PercolationParams, PercolationSim, SeirsParams, SeirsParamsBuilder,
    },
};
