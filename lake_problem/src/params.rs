use serde::{Deserialize, Serialize};

use crate::LakeError;

/// Physical and economic parameters of one lake experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeParameters {
    /// Fraction of the stock removed by the lake itself each step.
    pub b: f64,
    /// Recycling exponent; shapes the sigmoid feedback term.
    pub q: f64,
    /// Mean of the natural inflows (underlying, not log-space).
    pub mean: f64,
    /// Standard deviation of the natural inflows (underlying, not log-space).
    pub stdev: f64,
    /// Per-step discount factor applied to utility.
    pub delta: f64,
    /// Utility per unit of released phosphorus.
    pub alpha: f64,
    /// Number of Monte Carlo samples.
    pub nsamples: usize,
    /// Number of time steps; must equal the length of the decision sequence.
    pub steps: usize,
}

impl Default for LakeParameters {
    fn default() -> Self {
        Self {
            b: 0.42,
            q: 2.0,
            mean: 0.02,
            stdev: 0.0017,
            delta: 0.98,
            alpha: 0.4,
            nsamples: 100,
            steps: 100,
        }
    }
}

impl LakeParameters {
    /// Checks every parameter range; returns the first violation found.
    pub fn validate(&self) -> Result<(), LakeError> {
        let scalars = [
            ("b", self.b),
            ("q", self.q),
            ("mean", self.mean),
            ("stdev", self.stdev),
            ("delta", self.delta),
            ("alpha", self.alpha),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }
        if !(self.b > 0.0 && self.b < 1.0) {
            return Err(invalid(format!("b must lie in (0, 1), got {}", self.b)));
        }
        if self.q <= 0.0 {
            return Err(invalid(format!("q must be > 0, got {}", self.q)));
        }
        if self.mean <= 0.0 {
            return Err(invalid(format!("mean must be > 0, got {}", self.mean)));
        }
        if self.stdev < 0.0 {
            return Err(invalid(format!("stdev must be >= 0, got {}", self.stdev)));
        }
        if !(self.delta > 0.0 && self.delta <= 1.0) {
            return Err(invalid(format!(
                "delta must lie in (0, 1], got {}",
                self.delta
            )));
        }
        if self.nsamples == 0 {
            return Err(invalid("nsamples must be >= 1".to_string()));
        }
        if self.steps == 0 {
            return Err(invalid("steps must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Checks a release policy against these parameters.
    pub fn validate_decisions(&self, decisions: &[f64]) -> Result<(), LakeError> {
        if decisions.len() != self.steps {
            return Err(invalid(format!(
                "decision sequence has {} entries but steps = {}",
                decisions.len(),
                self.steps
            )));
        }
        if let Some((t, d)) = decisions
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d < 0.0)
        {
            return Err(invalid(format!(
                "decision at step {t} must be finite and >= 0, got {d}"
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> LakeError {
    LakeError::InvalidArgument(msg)
}
