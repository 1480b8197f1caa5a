use serde::{Deserialize, Serialize};

use crate::params::LakeParameters;
use crate::simulator::{LakeOutcomes, LakeSimulator};
use crate::LakeError;

/// A lake experiment as read from TOML. Every field is optional.
///
/// ```toml
/// [lake]
/// b = 0.42
/// nsamples = 1000
///
/// [run]
/// seed = 7
/// decisions = [0.0, 0.01, 0.02]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    pub lake: LakeParameters,
    pub run: RunConfig,
}

/// Release policy and seed for a configured run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Fixed seed; `None` draws a fresh one per call.
    pub seed: Option<u64>,
    /// Releases per step; empty means no release at any step.
    pub decisions: Vec<f64>,
}

impl LakeConfig {
    pub fn from_toml(text: &str) -> Result<Self, LakeError> {
        Ok(toml::from_str(text)?)
    }

    /// Configured releases, zero-filled to `steps` when none are given.
    pub fn decisions(&self) -> Vec<f64> {
        if self.run.decisions.is_empty() {
            vec![0.0; self.lake.steps]
        } else {
            self.run.decisions.clone()
        }
    }

    pub fn simulate(&self) -> Result<LakeOutcomes, LakeError> {
        let simulator = LakeSimulator::new(self.lake.clone())?;
        let decisions = self.decisions();
        match self.run.seed {
            Some(seed) => simulator.run_seeded(&decisions, seed),
            None => simulator.run(&decisions),
        }
    }
}
