//! Degree distributions sampled by the configuration model.

use rand::{Rng, distributions::Standard};

use crate::error::GeneratorError;

/// Largest deviation from 1 tolerated when probabilities are supplied as-is.
pub const PROBABILITY_TOLERANCE: f64 = 1e-14;

/// A probability mass function over node degrees, indexed by degree.
///
/// # Examples
/// ```
/// use epinet_core::DegreeDistribution;
///
/// let dist = DegreeDistribution::from_weights(vec![0.0, 1.0, 3.0])?;
/// assert_eq!(dist.probabilities(), &[0.0, 0.25, 0.75]);
/// assert_eq!(dist.max_degree(), 2);
/// assert!((dist.mean() - 1.75).abs() < 1e-12);
///
/// let err = DegreeDistribution::from_probabilities(vec![0.5, 0.4]).unwrap_err();
/// assert_eq!(err.code().as_str(), "GENERATOR_INVALID_DISTRIBUTION");
/// # Ok::<(), epinet_core::GeneratorError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DegreeDistribution {
    probabilities: Vec<f64>,
    cumulative: Vec<f64>,
    max_supported: usize,
}

impl DegreeDistribution {
    /// Accepts probabilities that must already sum to one within
    /// [`PROBABILITY_TOLERANCE`].
    ///
    /// # Errors
    /// Returns [`GeneratorError::EmptyDistribution`] for an empty input,
    /// [`GeneratorError::InvalidWeight`] for negative or non-finite entries and
    /// [`GeneratorError::InvalidDistribution`] when the sum is off.
    pub fn from_probabilities(probabilities: Vec<f64>) -> Result<Self, GeneratorError> {
        let sum = checked_sum(&probabilities)?;
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(GeneratorError::InvalidDistribution { sum });
        }
        Ok(Self::build(probabilities))
    }

    /// Normalises non-negative weights into probabilities.
    ///
    /// # Errors
    /// Returns [`GeneratorError::EmptyDistribution`] for an empty input,
    /// [`GeneratorError::InvalidWeight`] for negative or non-finite entries and
    /// [`GeneratorError::InvalidDistribution`] when every weight is zero.
    pub fn from_weights(weights: Vec<f64>) -> Result<Self, GeneratorError> {
        let sum = checked_sum(&weights)?;
        if sum <= 0.0 {
            return Err(GeneratorError::InvalidDistribution { sum });
        }
        Ok(Self::build(weights.into_iter().map(|w| w / sum).collect()))
    }

    /// Poisson(`lambda`) truncated at `max_degree` and renormalised.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidParameter`] when `lambda` is negative
    /// or non-finite.
    pub fn poisson(lambda: f64, max_degree: usize) -> Result<Self, GeneratorError> {
        require_non_negative("lambda", lambda)?;
        if lambda == 0.0 {
            return Self::constant(0);
        }
        // Work in log space so large means do not underflow `exp(-lambda)`.
        let mut log_factorial = 0.0;
        let logs: Vec<f64> = (0..=max_degree)
            .map(|k| {
                if k > 0 {
                    log_factorial += (k as f64).ln();
                }
                (k as f64) * lambda.ln() - lambda - log_factorial
            })
            .collect();
        Self::from_log_weights(&logs)
    }

    /// Discretised exponential with mean scale `beta`, truncated at
    /// `max_degree`: weight of degree `k` is `exp(-k / beta)`.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidParameter`] when `beta` is not
    /// positive and finite.
    pub fn exponential(beta: f64, max_degree: usize) -> Result<Self, GeneratorError> {
        require_positive("beta", beta)?;
        let logs: Vec<f64> = (0..=max_degree).map(|k| -(k as f64) / beta).collect();
        Self::from_log_weights(&logs)
    }

    /// Power law with exponential cutoff, truncated at `max_degree`: weight of
    /// degree `k >= 1` is `k^-alpha * exp(-k / kappa)`; degree zero gets no
    /// mass.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidParameter`] when `alpha` is negative,
    /// `kappa` is not positive, or `max_degree` is zero.
    pub fn power_law(alpha: f64, kappa: f64, max_degree: usize) -> Result<Self, GeneratorError> {
        require_non_negative("alpha", alpha)?;
        require_positive("kappa", kappa)?;
        if max_degree == 0 {
            return Err(GeneratorError::InvalidParameter {
                name: "max_degree",
                value: 0.0,
            });
        }
        let logs: Vec<f64> = (0..=max_degree)
            .map(|k| {
                if k == 0 {
                    f64::NEG_INFINITY
                } else {
                    let k = k as f64;
                    -alpha * k.ln() - k / kappa
                }
            })
            .collect();
        Self::from_log_weights(&logs)
    }

    /// Every node receives exactly `degree` stubs.
    ///
    /// # Errors
    /// Never fails; the signature matches the other constructors.
    pub fn constant(degree: usize) -> Result<Self, GeneratorError> {
        let mut probabilities = vec![0.0; degree + 1];
        probabilities[degree] = 1.0;
        Ok(Self::build(probabilities))
    }

    fn from_log_weights(logs: &[f64]) -> Result<Self, GeneratorError> {
        let peak = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::from_weights(logs.iter().map(|log| (log - peak).exp()).collect())
    }

    fn build(probabilities: Vec<f64>) -> Self {
        let mut running = 0.0;
        let cumulative = probabilities
            .iter()
            .map(|p| {
                running += p;
                running
            })
            .collect();
        let max_supported = probabilities.iter().rposition(|&p| p > 0.0).unwrap_or(0);
        Self {
            probabilities,
            cumulative,
            max_supported,
        }
    }

    /// Probabilities indexed by degree.
    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Largest degree with non-zero probability.
    #[must_use]
    pub const fn max_degree(&self) -> usize {
        self.max_supported
    }

    /// Expected degree.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(k, p)| k as f64 * p)
            .sum()
    }

    /// Whether every degree with non-zero probability is odd.
    #[must_use]
    pub fn only_odd_degrees(&self) -> bool {
        self.probabilities
            .iter()
            .enumerate()
            .all(|(k, &p)| p == 0.0 || k % 2 == 1)
    }

    /// Draws one degree by inverse-CDF sampling.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.sample(Standard);
        let index = self.cumulative.partition_point(|&c| c <= u);
        // Rounding can leave the final cumulative value just below one.
        index.min(self.max_supported)
    }
}

fn checked_sum(values: &[f64]) -> Result<f64, GeneratorError> {
    if values.is_empty() {
        return Err(GeneratorError::EmptyDistribution);
    }
    values.iter().enumerate().try_fold(0.0, |sum, (degree, &weight)| {
        if weight.is_finite() && weight >= 0.0 {
            Ok(sum + weight)
        } else {
            Err(GeneratorError::InvalidWeight { degree, weight })
        }
    })
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), GeneratorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GeneratorError::InvalidParameter { name, value })
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), GeneratorError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeneratorError::InvalidParameter { name, value })
    }
}
