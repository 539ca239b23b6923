//! Closed dispatch over the epidemic engines.

use super::{ChainBinomialSim, GillespieSeirs, PercolationSim};
use crate::{
    error::SimulationError,
    network::{Network, NodeId, StateCounts},
};

/// Any of the epidemic engines behind one interface.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, EpidemicProcess, Network, PercolationParams, PercolationSim};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 1);
/// let ids = net.populate(2);
/// net.connect(ids[0], ids[1])?;
/// let mut process = EpidemicProcess::from(PercolationSim::new(&mut net, PercolationParams::new(1.0)?));
/// process.infect(&[ids[0]])?;
/// process.run_simulation(None)?;
/// assert_eq!(process.name(), "percolation");
/// assert_eq!(process.epidemic_size(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub enum EpidemicProcess<'net> {
    /// Continuous-time SEIRS.
    Gillespie(GillespieSeirs<'net>),
    /// Synchronous percolation rounds.
    Percolation(PercolationSim<'net>),
    /// Day-bucketed chain binomial.
    ChainBinomial(ChainBinomialSim<'net>),
}

macro_rules! dispatch {
    ($self:expr, $engine:ident => $body:expr) => {
        match $self {
            EpidemicProcess::Gillespie($engine) => $body,
            EpidemicProcess::Percolation($engine) => $body,
            EpidemicProcess::ChainBinomial($engine) => $body,
        }
    };
}

impl EpidemicProcess<'_> {
    /// Stable engine name for logs and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gillespie(_) => "gillespie",
            Self::Percolation(_) => "percolation",
            Self::ChainBinomial(_) => "chain_binomial",
        }
    }

    /// Read access to the simulated network.
    #[must_use]
    pub fn network(&self) -> &Network {
        dispatch!(self, engine => engine.network())
    }

    /// Restarts the network's RNG stream.
    pub fn reseed(&mut self, seed: u64) {
        dispatch!(self, engine => engine.reseed(seed));
    }

    /// Infects `count` random susceptible nodes.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidInfectionCount`] unless
    /// `1 <= count <= susceptible`.
    pub fn rand_infect(&mut self, count: usize) -> Result<Vec<NodeId>, SimulationError> {
        dispatch!(self, engine => engine.rand_infect(count))
    }

    /// Infects the susceptible members of `nodes`.
    ///
    /// # Errors
    /// Returns [`SimulationError::Network`] for stale handles.
    pub fn infect(&mut self, nodes: &[NodeId]) -> Result<usize, SimulationError> {
        dispatch!(self, engine => engine.infect(nodes))
    }

    /// Advances by one event, round or day.
    ///
    /// # Errors
    /// Returns [`SimulationError::NoPendingEvents`] or
    /// [`SimulationError::NoInfected`] when there is nothing to advance.
    pub fn step_simulation(&mut self) -> Result<(), SimulationError> {
        match self {
            Self::Gillespie(engine) => engine.step_simulation().map(drop),
            Self::Percolation(engine) => engine.step_simulation().map(drop),
            Self::ChainBinomial(engine) => engine.step_simulation().map(drop),
        }
    }

    /// Whether stepping has nothing left to advance.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        match self {
            Self::Gillespie(engine) => engine.pending_events() == 0,
            Self::Percolation(engine) => engine.count_infected() == 0,
            Self::ChainBinomial(engine) => engine.count_infected() == 0,
        }
    }

    /// Runs to exhaustion or for at most `limit` time units. Returns the
    /// number of events, rounds or days processed.
    ///
    /// # Errors
    /// Propagates engine failures.
    pub fn run_simulation(&mut self, limit: Option<f64>) -> Result<usize, SimulationError> {
        dispatch!(self, engine => engine.run_simulation(limit))
    }

    /// Nodes currently infected (exposed or infectious).
    #[must_use]
    pub fn count_infected(&self) -> usize {
        dispatch!(self, engine => engine.count_infected())
    }

    /// Recoveries since the last reset.
    #[must_use]
    pub fn epidemic_size(&self) -> usize {
        dispatch!(self, engine => engine.epidemic_size())
    }

    /// Nodes per state.
    #[must_use]
    pub fn state_counts(&self) -> StateCounts {
        dispatch!(self, engine => engine.state_counts())
    }

    /// Engine clock.
    #[must_use]
    pub fn time(&self) -> f64 {
        dispatch!(self, engine => engine.time())
    }

    /// Restores the baseline state.
    pub fn reset(&mut self) {
        dispatch!(self, engine => engine.reset());
    }
}

impl<'net> From<GillespieSeirs<'net>> for EpidemicProcess<'net> {
    fn from(engine: GillespieSeirs<'net>) -> Self {
        Self::Gillespie(engine)
    }
}

impl<'net> From<PercolationSim<'net>> for EpidemicProcess<'net> {
    fn from(engine: PercolationSim<'net>) -> Self {
        Self::Percolation(engine)
    }
}

impl<'net> From<ChainBinomialSim<'net>> for EpidemicProcess<'net> {
    fn from(engine: ChainBinomialSim<'net>) -> Self {
        Self::ChainBinomial(engine)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        ChainBinomialParams, PercolationParams, SeirsParams, generators,
        network::Directedness,
    };

    fn lattice() -> Network {
        let mut net = Network::with_seed(Directedness::Undirected, 37);
        net.populate(60);
        generators::ring_lattice(&mut net, 2).expect("valid");
        net
    }

    #[rstest]
    #[case("gillespie")]
    #[case("percolation")]
    #[case("chain_binomial")]
    fn every_engine_honours_the_common_contract(#[case] engine: &str) {
        let mut net = lattice();
        let mut process: EpidemicProcess<'_> = match engine {
            "gillespie" => GillespieSeirs::new(&mut net, SeirsParams::builder().build().expect("valid")).into(),
            "percolation" => PercolationSim::new(&mut net, PercolationParams::new(0.5).expect("valid")).into(),
            _ => ChainBinomialSim::new(&mut net, ChainBinomialParams::new(0.5, 3).expect("valid")).into(),
        };
        assert_eq!(process.name(), engine);

        assert!(process.is_exhausted());
        process.rand_infect(3).expect("susceptible");
        assert!(process.count_infected() >= 1);
        assert!(!process.is_exhausted());
        let mut size = process.epidemic_size();
        while process.step_simulation().is_ok() {
            assert!(process.epidemic_size() >= size);
            size = process.epidemic_size();
        }
        assert!(process.is_exhausted());
        assert_eq!(process.count_infected(), 0);
        assert!(process.epidemic_size() >= 3);

        process.reset();
        assert_eq!(process.epidemic_size(), 0);
        assert_eq!(process.state_counts().susceptible, 60);
        assert_eq!(process.time(), 0.0);
        assert!(process.network().validate().is_empty());
    }
}
