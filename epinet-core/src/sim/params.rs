//! Validated parameter sets for the epidemic engines.

use crate::error::SimulationError;

fn positive_rate(name: &'static str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

fn probability(name: &'static str, value: f64) -> Result<f64, SimulationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

/// Rates and feedback controls of the SEIRS engine.
///
/// Built through [`SeirsParamsBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeirsParams {
    mu: f64,
    beta: f64,
    gamma: f64,
    immunity_duration: Option<f64>,
    detection_probability: f64,
    distancing_effect: f64,
    distancing_threshold: Option<usize>,
    reporting_delay: f64,
}

impl SeirsParams {
    /// Starts a builder with default values.
    #[must_use]
    pub fn builder() -> SeirsParamsBuilder {
        SeirsParamsBuilder::new()
    }

    /// Exposed to infectious rate.
    #[must_use]
    pub const fn mu(&self) -> f64 {
        self.mu
    }

    /// Per-node contact rate while infectious.
    #[must_use]
    pub const fn beta(&self) -> f64 {
        self.beta
    }

    /// Recovery rate.
    #[must_use]
    pub const fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Time from recovery to loss of immunity; `None` means permanent.
    #[must_use]
    pub const fn immunity_duration(&self) -> Option<f64> {
        self.immunity_duration
    }

    /// Chance that an infectious onset is detected.
    #[must_use]
    pub const fn detection_probability(&self) -> f64 {
        self.detection_probability
    }

    /// Fraction of contacts suppressed once distancing is in force.
    #[must_use]
    pub const fn distancing_effect(&self) -> f64 {
        self.distancing_effect
    }

    /// Detected cases that must be exceeded before distancing starts;
    /// `None` disables distancing.
    #[must_use]
    pub const fn distancing_threshold(&self) -> Option<usize> {
        self.distancing_threshold
    }

    /// Delay between crossing the threshold and distancing taking effect.
    #[must_use]
    pub const fn reporting_delay(&self) -> f64 {
        self.reporting_delay
    }
}

/// Configures and validates [`SeirsParams`].
///
/// # Examples
/// ```
/// use epinet_core::SeirsParams;
///
/// let params = SeirsParams::builder()
///     .with_beta(0.5)
///     .with_gamma(0.2)
///     .with_immunity_duration(30.0)
///     .build()?;
/// assert_eq!(params.beta(), 0.5);
/// assert_eq!(params.immunity_duration(), Some(30.0));
///
/// let err = SeirsParams::builder().with_gamma(0.0).build().unwrap_err();
/// assert_eq!(err.code().as_str(), "SIMULATION_INVALID_PARAMETER");
/// # Ok::<(), epinet_core::SimulationError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SeirsParamsBuilder {
    mu: f64,
    beta: f64,
    gamma: f64,
    immunity_duration: Option<f64>,
    detection_probability: f64,
    distancing_effect: f64,
    distancing_threshold: Option<usize>,
    reporting_delay: f64,
}

impl Default for SeirsParamsBuilder {
    fn default() -> Self {
        Self {
            mu: 1.0,
            beta: 1.0,
            gamma: 1.0,
            immunity_duration: None,
            detection_probability: 0.0,
            distancing_effect: 0.0,
            distancing_threshold: None,
            reporting_delay: 0.0,
        }
    }
}

impl SeirsParamsBuilder {
    /// Creates a builder with unit rates, permanent immunity and no
    /// distancing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exposed to infectious rate.
    #[must_use]
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    /// Sets the contact rate.
    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the recovery rate.
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Makes immunity wane `duration` after recovery.
    #[must_use]
    pub fn with_immunity_duration(mut self, duration: f64) -> Self {
        self.immunity_duration = Some(duration);
        self
    }

    /// Sets the chance that an infectious onset is detected.
    #[must_use]
    pub fn with_detection_probability(mut self, probability: f64) -> Self {
        self.detection_probability = probability;
        self
    }

    /// Enables distancing: once more than `threshold` cases are detected,
    /// `effect` of all contacts are suppressed from `reporting_delay` later.
    #[must_use]
    pub fn with_distancing(mut self, effect: f64, threshold: usize) -> Self {
        self.distancing_effect = effect;
        self.distancing_threshold = Some(threshold);
        self
    }

    /// Sets the delay before distancing takes effect.
    #[must_use]
    pub fn with_reporting_delay(mut self, delay: f64) -> Self {
        self.reporting_delay = delay;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] when a rate is not
    /// positive and finite, a probability or the distancing effect lies
    /// outside `[0, 1]`, or a duration is negative or non-finite.
    pub fn build(self) -> Result<SeirsParams, SimulationError> {
        Ok(SeirsParams {
            mu: positive_rate("mu", self.mu)?,
            beta: positive_rate("beta", self.beta)?,
            gamma: positive_rate("gamma", self.gamma)?,
            immunity_duration: self
                .immunity_duration
                .map(|duration| non_negative("immunity_duration", duration))
                .transpose()?,
            detection_probability: probability(
                "detection_probability",
                self.detection_probability,
            )?,
            distancing_effect: probability("distancing_effect", self.distancing_effect)?,
            distancing_threshold: self.distancing_threshold,
            reporting_delay: non_negative("reporting_delay", self.reporting_delay)?,
        })
    }
}

/// Per-contact transmission probability of the percolation engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PercolationParams {
    transmissibility: f64,
}

impl PercolationParams {
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] unless `transmissibility`
    /// lies in `[0, 1]`.
    pub fn new(transmissibility: f64) -> Result<Self, SimulationError> {
        Ok(Self {
            transmissibility: probability("transmissibility", transmissibility)?,
        })
    }

    /// Chance that one infectious node infects one susceptible neighbour.
    #[must_use]
    pub const fn transmissibility(&self) -> f64 {
        self.transmissibility
    }
}

/// Transmissibility and infectious period of the chain-binomial engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainBinomialParams {
    transmissibility: f64,
    infectious_period: u32,
}

impl ChainBinomialParams {
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] unless
    /// `transmissibility` lies in `[0, 1]` and `infectious_period` is
    /// positive.
    pub fn new(transmissibility: f64, infectious_period: u32) -> Result<Self, SimulationError> {
        if infectious_period == 0 {
            return Err(SimulationError::InvalidParameter {
                name: "infectious_period",
                value: 0.0,
            });
        }
        Ok(Self {
            transmissibility: probability("transmissibility", transmissibility)?,
            infectious_period,
        })
    }

    /// Chance of transmission over a whole infectious period.
    #[must_use]
    pub const fn transmissibility(&self) -> f64 {
        self.transmissibility
    }

    /// Days an infected node stays infectious.
    #[must_use]
    pub const fn infectious_period(&self) -> u32 {
        self.infectious_period
    }

    /// Daily transmission probability `1 - (1 - T)^(1/d)`.
    #[must_use]
    pub fn daily_probability(&self) -> f64 {
        1.0 - (1.0 - self.transmissibility).powf(1.0 / f64::from(self.infectious_period))
    }
}
