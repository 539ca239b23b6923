//! Continuous variate samplers shared by the generators and the engines.

use std::f64::consts::TAU;

use rand::{Rng, distributions::Standard};

/// Draws from an exponential distribution with the given `rate`.
///
/// `rate` must be positive and finite; callers validate it up front.
pub(crate) fn exponential<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    // `Standard` yields [0, 1), so `1 - u` lies in (0, 1] and the log is finite.
    let u: f64 = rng.sample(Standard);
    -(1.0 - u).ln() / rate
}

/// Draws a standard normal variate using the Box-Muller transform.
pub(crate) fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.sample::<f64, _>(Standard);
    let u2: f64 = rng.sample(Standard);
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn exponential_mean_matches_rate() {
        let mut rng = SmallRng::seed_from_u64(42);
        let draws = 20_000;
        let mean: f64 = (0..draws).map(|_| exponential(&mut rng, 4.0)).sum::<f64>() / f64::from(draws);
        assert!((mean - 0.25).abs() < 0.01, "mean {mean} should be near 0.25");
    }

    #[test]
    fn standard_normal_is_centred() {
        let mut rng = SmallRng::seed_from_u64(7);
        let draws = 20_000;
        let samples: Vec<f64> = (0..draws).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / f64::from(draws);
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / f64::from(draws);
        assert!(mean.abs() < 0.05, "mean {mean} should be near 0");
        assert!((variance - 1.0).abs() < 0.05, "variance {variance} should be near 1");
    }
}
