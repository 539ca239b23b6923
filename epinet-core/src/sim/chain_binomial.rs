//! Chain-binomial engine with day-bucketed transmission.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, instrument, trace};

use super::{
    ChainBinomialParams, choose_susceptible,
    event::{EventKind, EventQueue},
    record_events, susceptible_only,
};
use crate::{
    error::SimulationError,
    network::{EpiState, Network, NodeId, StateCounts},
};

/// Discrete-time SIR where transmission along each contact happens on at
/// most one day of the infectious period.
///
/// With daily probability `p = 1 - (1 - T)^(1/d)`, a newly infected node
/// draws, for each distinct susceptible neighbour, the day `i` in `1..=d` of
/// its transmission attempt with probability `p (1 - p)^(i - 1)`; with the
/// remaining probability `(1 - p)^d = 1 - T` no attempt is made. Attempts
/// are queued by day. Each step advances one day, fires that day's attempts
/// on still-susceptible targets, then ages every node infected before the
/// step and recovers those whose period has elapsed.
///
/// # Examples
/// ```
/// use epinet_core::{ChainBinomialParams, ChainBinomialSim, Directedness, Network};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 8);
/// let ids = net.populate(3);
/// net.connect(ids[0], ids[1])?;
/// net.connect(ids[1], ids[2])?;
/// let mut sim = ChainBinomialSim::new(&mut net, ChainBinomialParams::new(1.0, 3)?);
/// sim.infect(&[ids[0]])?;
/// sim.run_simulation(None)?;
/// assert_eq!(sim.epidemic_size(), 3);
/// assert_eq!(sim.time(), 5.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ChainBinomialSim<'net> {
    net: &'net mut Network,
    params: ChainBinomialParams,
    daily: f64,
    queue: EventQueue,
    days_infected: BTreeMap<NodeId, u32>,
    day: u64,
    epidemic_size: usize,
}

impl<'net> ChainBinomialSim<'net> {
    /// Creates an engine over `net`. Node states are left as they are.
    pub fn new(net: &'net mut Network, params: ChainBinomialParams) -> Self {
        Self {
            net,
            daily: params.daily_probability(),
            params,
            queue: EventQueue::default(),
            days_infected: BTreeMap::new(),
            day: 0,
            epidemic_size: 0,
        }
    }

    /// The engine's parameters.
    #[must_use]
    pub const fn params(&self) -> &ChainBinomialParams {
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

    /// Infects the susceptible members of `nodes` on the current day and
    /// returns how many were infected.
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
        self.days_infected.insert(node, 0);

        let mut neighbours = self.net.neighbors(node)?;
        neighbours.sort_unstable();
        neighbours.dedup();
        for neighbour in neighbours {
            if self.net.state(neighbour)? != EpiState::Susceptible {
                continue;
            }
            let attempt_day = (1..=self.params.infectious_period())
                .find(|_| self.net.rng().gen_bool(self.daily));
            if let Some(offset) = attempt_day {
                let when = self.day + u64::from(offset);
                self.queue
                    .schedule(when as f64, neighbour, EventKind::InfectionAttempt);
            }
        }
        Ok(())
    }

    /// Advances one day and returns the number of new infections.
    ///
    /// # Errors
    /// Returns [`SimulationError::NoInfected`] when nobody is infectious.
    pub fn step_simulation(&mut self) -> Result<usize, SimulationError> {
        if self.days_infected.is_empty() {
            return Err(SimulationError::NoInfected);
        }
        let ageing: Vec<NodeId> = self.days_infected.keys().copied().collect();
        self.day += 1;

        let mut infections = 0;
        let mut attempts = 0;
        while let Some(event) = self.queue.pop_until(self.day as f64) {
            attempts += 1;
            if self.net.state(event.node)? == EpiState::Susceptible {
                self.infect_node(event.node)?;
                infections += 1;
            }
        }

        let period = self.params.infectious_period();
        let mut recovered = 0;
        for node in ageing {
            let Some(days) = self.days_infected.get_mut(&node) else {
                continue;
            };
            *days += 1;
            if *days >= period {
                self.days_infected.remove(&node);
                self.net.set_state(node, EpiState::Resistant)?;
                recovered += 1;
            }
        }
        self.epidemic_size += recovered;
        trace!(day = self.day, attempts, infections, recovered, "day");
        record_events("chain_binomial", attempts);
        Ok(infections)
    }

    /// Runs days until nobody is infectious or, with `limit`, until `limit`
    /// more days have passed. Fractional limits round down. Returns the number of
    /// days run.
    ///
    /// # Errors
    /// Returns [`SimulationError::Network`] if an infected node disappeared.
    #[instrument(
        name = "sim.chain_binomial.run",
        err,
        skip(self),
        fields(infected = self.days_infected.len()),
    )]
    pub fn run_simulation(&mut self, limit: Option<f64>) -> Result<usize, SimulationError> {
        let mut days = 0;
        while !self.days_infected.is_empty()
            && limit.is_none_or(|limit| ((days + 1) as f64) <= limit)
        {
            self.step_simulation()?;
            days += 1;
        }
        debug!(days, size = self.epidemic_size, "run finished");
        Ok(days)
    }

    /// Nodes currently infectious.
    #[must_use]
    pub fn count_infected(&self) -> usize {
        self.days_infected.len()
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

    /// Current day.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.day as f64
    }

    /// Number of queued infection attempts.
    #[must_use]
    pub fn pending_attempts(&self) -> usize {
        self.queue.len()
    }

    /// Makes every node susceptible and clears the attempt queue, day
    /// counters and epidemic size.
    pub fn reset(&mut self) {
        self.net.set_all_states(EpiState::Susceptible);
        self.queue.clear();
        self.days_infected.clear();
        self.day = 0;
        self.epidemic_size = 0;
    }
}
