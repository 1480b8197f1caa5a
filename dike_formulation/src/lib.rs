#![forbid(unsafe_code)]

//! Problem formulations for the dike-network flood-risk model.
//!
//! Declares the uncertainties and levers of a [`DikeNetwork`] and, for each
//! of six problem formulations, the outcomes an exploration framework sees
//! and how they are aggregated from the simulator's raw per-dike results.
//! Neither the simulator nor the exploration framework lives here.

use thiserror::Error;

pub mod formulation;
pub mod network;
pub mod outcomes;
pub mod parameters;

pub use formulation::{get_model_for_problem_formulation, ModelSpec, ProblemFormulation};
pub use network::{DikeNetwork, StandardDikeNetwork};
pub use outcomes::{
    sum_over, sum_over_time, Aggregation, Direction, Outcome, OutcomeKind, OutcomeValue,
};
pub use parameters::{Parameter, ParameterKind};

/// Errors for model assembly and outcome aggregation.
#[derive(Debug, Error, PartialEq)]
pub enum FormulationError {
    #[error("unknown problem formulation identifier: {0}")]
    UnknownFormulation(u32),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),
    #[error("missing simulator variable: {0}")]
    MissingVariable(String),
    #[error("outcome {outcome}: expected length {expected}, found {found}")]
    ShapeMismatch {
        outcome: String,
        expected: usize,
        found: usize,
    },
    #[error("outcome kind mismatch: {0}")]
    KindMismatch(String),
}
