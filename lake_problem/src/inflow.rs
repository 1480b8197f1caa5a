use rand::Rng;
use rand_distr::{Distribution, LogNormal};

use crate::LakeError;

/// Log-space `(mu, sigma)` of a log-normal whose underlying mean and
/// standard deviation are `mean` and `stdev`.
///
/// ```text
/// mu    = ln(mean^2 / sqrt(stdev^2 + mean^2))
/// sigma = sqrt(ln(1 + stdev^2 / mean^2))
/// ```
pub fn lognormal_params(mean: f64, stdev: f64) -> (f64, f64) {
    let mu = (mean * mean / (stdev * stdev + mean * mean).sqrt()).ln();
    let sigma = (1.0 + (stdev * stdev) / (mean * mean)).ln().sqrt();
    (mu, sigma)
}

/// Source of natural (uncontrolled) phosphorus inflow, one draw per sample
/// per step.
pub trait NaturalInflow: Sync {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;
}

/// Log-normal natural inflow parameterized by its underlying mean and
/// standard deviation.
#[derive(Debug, Clone, Copy)]
pub struct LogNormalInflow {
    mu: f64,
    sigma: f64,
    dist: LogNormal<f64>,
}

impl LogNormalInflow {
    pub fn new(mean: f64, stdev: f64) -> Result<Self, LakeError> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(LakeError::InvalidArgument(format!(
                "inflow mean must be finite and > 0, got {mean}"
            )));
        }
        if !(stdev.is_finite() && stdev >= 0.0) {
            return Err(LakeError::InvalidArgument(format!(
                "inflow stdev must be finite and >= 0, got {stdev}"
            )));
        }
        let (mu, sigma) = lognormal_params(mean, stdev);
        let dist = LogNormal::new(mu, sigma)
            .map_err(|e| LakeError::Distribution(e.to_string()))?;
        Ok(Self { mu, sigma, dist })
    }

    /// Log-space location.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Log-space scale.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl NaturalInflow for LogNormalInflow {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn unit_mean_with_unit_log_sigma() {
        // stdev^2 = e - 1 makes ln(1 + cv^2) exactly 1
        let (mu, sigma) = lognormal_params(1.0, (std::f64::consts::E - 1.0).sqrt());
        assert!((mu + 0.5).abs() < 1e-12, "mu = {mu}");
        assert!((sigma - 1.0).abs() < 1e-12, "sigma = {sigma}");
    }

    #[test]
    fn reference_lake_inflow_params() {
        let (mu, sigma) = lognormal_params(0.02, 0.0017);
        assert!((mu - (-3.9156225177914923)).abs() < 1e-12, "mu = {mu}");
        assert!((sigma - 0.08484706669468815).abs() < 1e-12, "sigma = {sigma}");
    }

    #[test]
    fn zero_stdev_collapses_to_the_mean() {
        let (mu, sigma) = lognormal_params(0.02, 0.0);
        assert_eq!(sigma, 0.0);
        assert!((mu - 0.02_f64.ln()).abs() < 1e-15);

        let inflow = LogNormalInflow::new(0.02, 0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10 {
            assert!((inflow.draw(&mut rng) - 0.02).abs() < 1e-15);
        }
    }

    #[test]
    fn sample_moments_match_the_underlying_mean_and_stdev() {
        let inflow = LogNormalInflow::new(0.02, 0.0017).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 200_000;
        let draws: Vec<f64> = (0..n).map(|_| inflow.draw(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!((mean - 0.02).abs() < 1e-4, "mean = {mean}");
        assert!((var.sqrt() - 0.0017).abs() < 1e-4, "stdev = {}", var.sqrt());
        assert!(draws.iter().all(|x| *x > 0.0));
    }

    #[test]
    fn rejects_non_positive_mean() {
        assert!(LogNormalInflow::new(0.0, 0.1).is_err());
        assert!(LogNormalInflow::new(0.02, -1.0).is_err());
    }
}
