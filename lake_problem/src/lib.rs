#![forbid(unsafe_code)]

//! Stochastic lake pollution model.
//!
//! A lake accumulates phosphorus from controlled releases and log-normally
//! distributed natural inflows. Above the critical stock `Pcrit` the lake's
//! internal recycling outpaces its self-purification and the lake flips into
//! an irreversible eutrophic state. [`simulate`] runs a Monte Carlo ensemble
//! of the stock recurrence for one release policy and reduces it to four
//! policy metrics: average daily phosphorus, utility, inertia, reliability.

use thiserror::Error;

pub mod config;
pub mod inflow;
pub mod params;
pub mod simulator;
pub mod threshold;

pub use config::{LakeConfig, RunConfig};
pub use inflow::{lognormal_params, LogNormalInflow, NaturalInflow};
pub use params::LakeParameters;
pub use simulator::{
    inertia, simulate, simulate_with_seed, utility, LakeOutcomes, LakeSimulator,
    INERTIA_THRESHOLD,
};
pub use threshold::{critical_threshold, PCRIT_BRACKET};

/// Errors raised while validating inputs or evaluating the lake model.
#[derive(Debug, Error)]
pub enum LakeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(
        "critical threshold not bracketed in [{lower}, {upper}]: f(lower) = {f_lower}, f(upper) = {f_upper}"
    )]
    RootNotBracketed {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },
    #[error("critical threshold did not converge after {iterations} iterations")]
    RootNotConverged { iterations: usize },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("inflow distribution rejected its parameters: {0}")]
    Distribution(String),
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}
