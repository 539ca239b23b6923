//! Continuous-time SEIRS engine driven by a global event queue.

use rand::{Rng, seq::SliceRandom};
use tracing::{debug, instrument, trace};

use super::{
    SeirsParams, choose_susceptible,
    event::{Event, EventKind, EventQueue},
    record_events, susceptible_only,
};
use crate::{
    error::SimulationError,
    network::{EpiState, Network, NodeId, StateCounts},
    sampling::exponential,
};

/// Gillespie-style SEIRS simulation with detection-triggered distancing.
///
/// Infecting a node exposes it and schedules its whole course at once: the
/// infectious onset after an exponential(`mu`) delay, recovery an
/// exponential(`gamma`) delay after onset, contact attempts at
/// exponential(`beta`) intervals in between, and loss of immunity a fixed
/// duration after recovery when immunity wanes. A contact picks a uniformly
/// random neighbour and exposes it only if it is susceptible.
///
/// Each onset is detected with the configured probability. Once detections
/// exceed the distancing threshold, contacts from `reporting_delay` later on
/// are suppressed with probability `distancing_effect`.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, GillespieSeirs, Network, SeirsParams, generators};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 4);
/// net.populate(50);
/// generators::ring_lattice(&mut net, 2)?;
/// let params = SeirsParams::builder().with_beta(2.0).with_gamma(0.5).build()?;
/// let mut sim = GillespieSeirs::new(&mut net, params);
/// sim.rand_infect(1)?;
/// sim.run_simulation(None)?;
/// assert_eq!(sim.count_infected(), 0);
/// assert!(sim.epidemic_size() >= 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct GillespieSeirs<'net> {
    net: &'net mut Network,
    params: SeirsParams,
    queue: EventQueue,
    time: f64,
    epidemic_size: usize,
    detected: usize,
    distancing_from: Option<f64>,
}

impl<'net> GillespieSeirs<'net> {
    /// Creates an engine over `net`. Node states are left as they are.
    pub fn new(net: &'net mut Network, params: SeirsParams) -> Self {
        Self {
            net,
            params,
            queue: EventQueue::default(),
            time: 0.0,
            epidemic_size: 0,
            detected: 0,
            distancing_from: None,
        }
    }

    /// The engine's parameters.
    #[must_use]
    pub const fn params(&self) -> &SeirsParams {
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

    /// Exposes `count` susceptible nodes chosen uniformly without
    /// replacement and returns them.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidInfectionCount`] unless
    /// `1 <= count <= susceptible`.
    pub fn rand_infect(&mut self, count: usize) -> Result<Vec<NodeId>, SimulationError> {
        let chosen = choose_susceptible(self.net, count)?;
        for &node in &chosen {
            self.expose(node)?;
        }
        Ok(chosen)
    }

    /// Exposes the susceptible members of `nodes` at the current time and
    /// returns how many were exposed.
    ///
    /// # Errors
    /// Returns [`SimulationError::Network`] for stale handles.
    pub fn infect(&mut self, nodes: &[NodeId]) -> Result<usize, SimulationError> {
        let chosen = susceptible_only(self.net, nodes)?;
        for &node in &chosen {
            self.expose(node)?;
        }
        Ok(chosen.len())
    }

    fn expose(&mut self, node: NodeId) -> Result<(), SimulationError> {
        self.net.set_state(node, EpiState::Exposed)?;
        let rng = self.net.rng();
        let onset = self.time + exponential(rng, self.params.mu());
        let recovery = onset + exponential(rng, self.params.gamma());
        self.queue.schedule(onset, node, EventKind::InfectiousOnset);

        let mut contact = onset + exponential(rng, self.params.beta());
        while contact < recovery {
            self.queue.schedule(contact, node, EventKind::ContactAttempt);
            contact += exponential(rng, self.params.beta());
        }
        self.queue.schedule(recovery, node, EventKind::Recovery);
        if let Some(duration) = self.params.immunity_duration() {
            self.queue
                .schedule(recovery + duration, node, EventKind::ImmunityLoss);
        }
        trace!(%node, time = self.time, onset, recovery, "node exposed");
        Ok(())
    }

    /// Processes the earliest pending event and returns it.
    ///
    /// # Errors
    /// Returns [`SimulationError::NoPendingEvents`] when the queue is empty.
    pub fn step_simulation(&mut self) -> Result<Event, SimulationError> {
        let event = self.queue.pop().ok_or(SimulationError::NoPendingEvents)?;
        self.apply(event)?;
        record_events("gillespie", 1);
        Ok(event)
    }

    /// Processes events until the queue empties or, with `duration`, until
    /// the next event lies more than `duration` after the current time.
    /// Returns the number of events processed.
    ///
    /// A bounded run that stops with events still queued leaves the clock at
    /// the bound, so consecutive bounded runs cover contiguous windows.
    ///
    /// # Errors
    /// Returns [`SimulationError::Network`] if a scheduled node disappeared.
    #[instrument(name = "sim.gillespie.run", err, skip(self), fields(pending = self.queue.len()))]
    pub fn run_simulation(&mut self, duration: Option<f64>) -> Result<usize, SimulationError> {
        let limit = duration.map(|duration| self.time + duration);
        let mut processed = 0;
        loop {
            let next = match limit {
                Some(limit) => self.queue.pop_until(limit),
                None => self.queue.pop(),
            };
            let Some(event) = next else {
                break;
            };
            self.apply(event)?;
            processed += 1;
        }
        if let Some(limit) = limit
            && !self.queue.is_empty()
        {
            self.time = limit;
        }
        record_events("gillespie", processed);
        debug!(processed, time = self.time, size = self.epidemic_size, "run finished");
        Ok(processed)
    }

    fn apply(&mut self, event: Event) -> Result<(), SimulationError> {
        self.time = event.time;
        let node = event.node;
        let state = self.net.state(node)?;
        trace!(%node, time = event.time, kind = ?event.kind, "event");
        match (event.kind, state) {
            (EventKind::InfectiousOnset, EpiState::Exposed) => {
                self.net.set_state(node, EpiState::Infectious)?;
                self.detect();
            }
            (EventKind::Recovery, EpiState::Infectious) => {
                self.net.set_state(node, EpiState::Resistant)?;
                self.epidemic_size += 1;
            }
            (EventKind::ImmunityLoss, EpiState::Resistant) => {
                self.net.set_state(node, EpiState::Susceptible)?;
            }
            (EventKind::ContactAttempt, EpiState::Infectious) => self.contact(node)?,
            _ => {}
        }
        Ok(())
    }

    fn detect(&mut self) {
        if !self.net.rng().gen_bool(self.params.detection_probability()) {
            return;
        }
        self.detected += 1;
        let Some(threshold) = self.params.distancing_threshold() else {
            return;
        };
        if self.detected > threshold && self.distancing_from.is_none() {
            let from = self.time + self.params.reporting_delay();
            debug!(detected = self.detected, from, "distancing scheduled");
            self.distancing_from = Some(from);
        }
    }

    fn contact(&mut self, node: NodeId) -> Result<(), SimulationError> {
        if self.distancing_from.is_some_and(|from| self.time >= from)
            && self.net.rng().gen_bool(self.params.distancing_effect())
        {
            return Ok(());
        }
        let neighbours = self.net.neighbors(node)?;
        let Some(&target) = neighbours.choose(self.net.rng()) else {
            return Ok(());
        };
        if self.net.state(target)? == EpiState::Susceptible {
            self.expose(target)?;
        }
        Ok(())
    }

    /// Nodes currently exposed or infectious.
    #[must_use]
    pub fn count_infected(&self) -> usize {
        let counts = self.net.state_counts();
        counts.exposed + counts.infectious
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

    /// Simulation clock.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Detected infectious onsets since the last reset.
    #[must_use]
    pub const fn detected(&self) -> usize {
        self.detected
    }

    /// Time from which distancing applies, once triggered.
    #[must_use]
    pub const fn distancing_from(&self) -> Option<f64> {
        self.distancing_from
    }

    /// Number of scheduled events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Makes every node susceptible and clears the queue, clock, counters and
    /// detection bookkeeping.
    pub fn reset(&mut self) {
        self.net.set_all_states(EpiState::Susceptible);
        self.queue.clear();
        self.time = 0.0;
        self.epidemic_size = 0;
        self.detected = 0;
        self.distancing_from = None;
    }
}
