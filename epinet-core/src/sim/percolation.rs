//! Synchronous round-based percolation engine.

use rand::Rng;
use tracing::{debug, instrument, trace};

use super::{PercolationParams, choose_susceptible, record_events, susceptible_only};
use crate::{
    error::SimulationError,
    network::{EpiState, Network, NodeId, StateCounts},
};

/// SIR percolation in discrete rounds.
///
/// In every round each infectious node tries every susceptible neighbour once
/// and infects it with probability `T`. Nodes infected in a round start
/// transmitting in the next one; nodes that were infectious at the start of
/// the round recover at its end.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network, PercolationParams, PercolationSim, generators};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 2);
/// net.populate(30);
/// generators::ring_lattice(&mut net, 1)?;
/// let mut sim = PercolationSim::new(&mut net, PercolationParams::new(1.0)?);
/// sim.rand_infect(1)?;
/// sim.run_simulation(None)?;
/// assert_eq!(sim.epidemic_size(), 30);
/// assert_eq!(sim.time(), 16.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct PercolationSim<'net> {
    net: &'net mut Network,
    params: PercolationParams,
    infected: Vec<NodeId>,
    rounds: u64,
    epidemic_size: usize,
}

impl<'net> PercolationSim<'net> {
    /// Creates an engine over `net`. Node states are left as they are.
    pub fn new(net: &'net mut Network, params: PercolationParams) -> Self {
        Self {
            net,
            params,
            infected: Vec::new(),
            rounds: 0,
            epidemic_size: 0,
        }
    }

    /// The engine's parameters.
    #[must_use]
    pub const fn params(&self) -> &PercolationParams {
        &self.params
    }

    /// Read access to the simulated network.
    #[must_use]
    pub fn network(&self) -> &Network {
        self.net
    }

    /// Restarts the network's RNG stream.
    pub fn reseed(&mut self, seed: u64) {
        self.net.reseed(seed);
    }

    /// Infects `count` susceptible nodes chosen uniformly without replacement.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidInfectionCount`] unless
    /// `1 <= count <= susceptible`.
    pub fn rand_infect(&mut self, count: usize) -> Result<Vec<NodeId>, SimulationError> {
        let chosen = choose_susceptible(self.net, count)?;
        for &node in &chosen {
            self.infect_node(node)?;
        }
        Ok(chosen)
    }

    /// Infects the susceptible members of `nodes` and returns how many were
    /// infected.
    ///
    /// # Errors
    /// Returns [`SimulationError::Network`] for stale handles.
    pub fn infect(&mut self, nodes: &[NodeId]) -> Result<usize, SimulationError> {
        let chosen = susceptible_only(self.net, nodes)?;
        for &node in &chosen {
            self.infect_node(node)?;
        }
        Ok(chosen.len())
    }

    fn infect_node(&mut self, node: NodeId) -> Result<(), SimulationError> {
        self.net.set_state(node, EpiState::Infectious)?;
        self.infected.push(node);
        Ok(())
    }

    /// Runs one round and returns the number of new infections.
    ///
    /// # Errors
    /// Returns [`SimulationError::NoInfected`] when nobody is infectious.
    pub fn step_simulation(&mut self) -> Result<usize, SimulationError> {
        if self.infected.is_empty() {
            return Err(SimulationError::NoInfected);
        }
        let transmissibility = self.params.transmissibility();
        let current = std::mem::take(&mut self.infected);
        for &node in &current {
            for neighbour in self.net.neighbors(node)? {
                if self.net.state(neighbour)? == EpiState::Susceptible
                    && self.net.rng().gen_bool(transmissibility)
                {
                    self.infect_node(neighbour)?;
                }
            }
        }
        for &node in &current {
            self.net.set_state(node, EpiState::Resistant)?;
        }
        self.epidemic_size += current.len();
        self.rounds += 1;
        let infections = self.infected.len();
        trace!(round = self.rounds, infections, recovered = current.len(), "round");
        record_events("percolation", current.len() + infections);
        Ok(infections)
    }

    /// Runs rounds until nobody is infectious or, with `limit`, until `limit`
    /// more rounds have run. Fractional limits round down. Returns the number of
    /// rounds run.
    ///
    /// # Errors
    /// Returns [`SimulationError::Network`] if an infected node disappeared.
    #[instrument(name = "sim.percolation.run", err, skip(self), fields(infected = self.infected.len()))]
    pub fn run_simulation(&mut self, limit: Option<f64>) -> Result<usize, SimulationError> {
        let mut rounds = 0;
        while !self.infected.is_empty()
            && limit.is_none_or(|limit| ((rounds + 1) as f64) <= limit)
        {
            self.step_simulation()?;
            rounds += 1;
        }
        debug!(rounds, size = self.epidemic_size, "run finished");
        Ok(rounds)
    }

    /// Nodes currently infectious.
    #[must_use]
    pub fn count_infected(&self) -> usize {
        self.infected.len()
    }

    /// Recoveries since the last reset.
    #[must_use]
    pub const fn epidemic_size(&self) -> usize {
        self.epidemic_size
    }

    /// Nodes per state.
    #[must_use]
    pub fn state_counts(&self) -> StateCounts {
        self.net.state_counts()
    }

    /// Completed rounds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.rounds as f64
    }

    /// Makes every node susceptible and clears the infected set, round
    /// counter and epidemic size.
    pub fn reset(&mut self) {
        self.net.set_all_states(EpiState::Susceptible);
        self.infected.clear();
        self.rounds = 0;
        self.epidemic_size = 0;
    }
}
