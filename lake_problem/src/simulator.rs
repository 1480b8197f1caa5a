use std::ops::Range;

use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inflow::{LogNormalInflow, NaturalInflow};
use crate::params::LakeParameters;
use crate::threshold::critical_threshold;
use crate::LakeError;

/// Decision changes larger than this count towards inertia.
pub const INERTIA_THRESHOLD: f64 = 0.02;

/// Samples per rayon task. Fixed so that merge order, and therefore the
/// floating point result, does not depend on the thread count.
const SAMPLE_BATCH: usize = 64;

/// Policy metrics for one release policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeOutcomes {
    /// Mean stock across samples, one entry per step.
    #[serde(rename = "average_daily_P")]
    pub average_daily_p: Vec<f64>,
    /// Discounted, alpha-weighted sum of the releases.
    pub utility: f64,
    /// Fraction of step transitions whose release changes by more than
    /// [`INERTIA_THRESHOLD`].
    pub inertia: f64,
    /// Fraction of all (sample, step) stock values below `Pcrit`.
    pub reliability: f64,
}

impl LakeOutcomes {
    /// Highest step-wise average stock.
    pub fn max_p(&self) -> f64 {
        self.average_daily_p
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Validated lake model, ready to evaluate release policies.
#[derive(Debug, Clone)]
pub struct LakeSimulator<I = LogNormalInflow>
where
    I: NaturalInflow,
{
    params: LakeParameters,
    inflow: I,
    pcrit: f64,
}

impl LakeSimulator<LogNormalInflow> {
    /// Builds the log-normal inflow model from `params`, then validates the
    /// rest and solves for `Pcrit` via [`LakeSimulator::with_inflow`].
    pub fn new(params: LakeParameters) -> Result<Self, LakeError> {
        let inflow = LogNormalInflow::new(params.mean, params.stdev)?;
        debug!(
            mu = inflow.mu(),
            sigma = inflow.sigma(),
            "log-normal inflow parameters"
        );
        Self::with_inflow(params, inflow)
    }
}

impl<I> LakeSimulator<I>
where
    I: NaturalInflow,
{
    /// Same as [`LakeSimulator::new`] with a caller-supplied inflow model.
    /// `mean` and `stdev` in `params` are still validated but not used to
    /// draw inflows.
    pub fn with_inflow(params: LakeParameters, inflow: I) -> Result<Self, LakeError> {
        params.validate()?;
        let pcrit = critical_threshold(params.b, params.q)?;
        Ok(Self {
            params,
            inflow,
            pcrit,
        })
    }

    pub fn params(&self) -> &LakeParameters {
        &self.params
    }

    /// Critical stock for this lake's `(b, q)`.
    pub fn critical_threshold(&self) -> f64 {
        self.pcrit
    }

    /// Evaluates `decisions` with a fresh seed drawn from OS entropy.
    pub fn run(&self, decisions: &[f64]) -> Result<LakeOutcomes, LakeError> {
        self.run_seeded(decisions, OsRng.next_u64())
    }

    /// Evaluates `decisions` with a fixed seed. Sample `i` draws from
    /// stream `i` of a ChaCha8 generator seeded with `seed`, so results
    /// are reproducible regardless of how samples are scheduled.
    pub fn run_seeded(&self, decisions: &[f64], seed: u64) -> Result<LakeOutcomes, LakeError> {
        self.params.validate_decisions(decisions)?;

        let nsamples = self.params.nsamples;
        let nvars = decisions.len();

        let batches: Vec<Range<usize>> = (0..nsamples)
            .step_by(SAMPLE_BATCH)
            .map(|start| start..(start + SAMPLE_BATCH).min(nsamples))
            .collect();

        let tallies = batches
            .into_par_iter()
            .map(|samples| self.run_batch(samples, decisions, seed))
            .collect::<Result<Vec<_>, _>>()?;

        let mut total = StockTally::new(nvars);
        for tally in &tallies {
            total.merge(tally);
        }

        let average_daily_p = total
            .stock_sums
            .iter()
            .map(|sum| sum / nsamples as f64)
            .collect();
        let reliability = total.below_pcrit as f64 / (nsamples * nvars) as f64;

        let outcomes = LakeOutcomes {
            average_daily_p,
            utility: utility(decisions, self.params.alpha, self.params.delta),
            inertia: inertia(decisions),
            reliability,
        };
        debug!(
            nsamples,
            steps = nvars,
            seed,
            pcrit = self.pcrit,
            reliability = outcomes.reliability,
            utility = outcomes.utility,
            "lake simulation complete"
        );
        Ok(outcomes)
    }

    fn run_batch(
        &self,
        samples: Range<usize>,
        decisions: &[f64],
        seed: u64,
    ) -> Result<StockTally, LakeError> {
        let (b, q) = (self.params.b, self.params.q);
        let mut tally = StockTally::new(decisions.len());

        for sample in samples {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(sample as u64);

            let mut stock = 0.0_f64;
            tally.record(0, stock, self.pcrit);
            for t in 1..decisions.len() {
                let inflow = self.inflow.draw(&mut rng);
                stock = next_stock(stock, b, q, decisions[t - 1], inflow);
                if !stock.is_finite() {
                    return Err(LakeError::NonFinite("pollution stock"));
                }
                tally.record(t, stock, self.pcrit);
            }
        }
        Ok(tally)
    }
}

/// One step of the stock recurrence: decay, recycling, release, inflow.
///
/// The stock is clamped at zero before the power term; a negative base with
/// a non-integer `q` has no real value.
fn next_stock(stock: f64, b: f64, q: f64, release: f64, inflow: f64) -> f64 {
    let s = stock.max(0.0);
    let sq = s.powf(q);
    (1.0 - b) * s + sq / (1.0 + sq) + release + inflow
}

/// Per-step stock sums and the below-threshold count for a set of samples.
#[derive(Debug)]
struct StockTally {
    stock_sums: Vec<f64>,
    below_pcrit: u64,
}

impl StockTally {
    fn new(nvars: usize) -> Self {
        Self {
            stock_sums: vec![0.0; nvars],
            below_pcrit: 0,
        }
    }

    fn record(&mut self, t: usize, stock: f64, pcrit: f64) {
        self.stock_sums[t] += stock;
        if stock < pcrit {
            self.below_pcrit += 1;
        }
    }

    fn merge(&mut self, other: &StockTally) {
        for (acc, s) in self.stock_sums.iter_mut().zip(&other.stock_sums) {
            *acc += s;
        }
        self.below_pcrit += other.below_pcrit;
    }
}

/// `sum_t alpha * decisions[t] * delta^t`.
pub fn utility(decisions: &[f64], alpha: f64, delta: f64) -> f64 {
    decisions
        .iter()
        .enumerate()
        .map(|(t, d)| alpha * d * delta.powi(t as i32))
        .sum()
}

/// Fraction of consecutive decision pairs that differ by more than
/// [`INERTIA_THRESHOLD`]. Zero when there is no transition to measure.
pub fn inertia(decisions: &[f64]) -> f64 {
    if decisions.len() < 2 {
        return 0.0;
    }
    let changes = decisions
        .windows(2)
        .filter(|w| (w[1] - w[0]).abs() > INERTIA_THRESHOLD)
        .count();
    changes as f64 / (decisions.len() - 1) as f64
}

/// Runs the lake model once with a fresh seed.
pub fn simulate(params: &LakeParameters, decisions: &[f64]) -> Result<LakeOutcomes, LakeError> {
    LakeSimulator::new(params.clone())?.run(decisions)
}

/// Runs the lake model once with a fixed seed.
pub fn simulate_with_seed(
    params: &LakeParameters,
    decisions: &[f64],
    seed: u64,
) -> Result<LakeOutcomes, LakeError> {
    LakeSimulator::new(params.clone())?.run_seeded(decisions, seed)
}
