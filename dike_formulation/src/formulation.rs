use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::network::DikeNetwork;
use crate::outcomes::{Aggregation, Direction, Outcome, OutcomeKind, OutcomeValue};
use crate::parameters::Parameter;
use crate::FormulationError;

const MODEL_NAME: &str = "dikesnet";

const DISCOUNT_RATES: [f64; 4] = [1.5, 2.5, 3.5, 4.5];
const BREACH_GROWTH_RATES: [f64; 3] = [1.0, 1.5, 10.0];
const FLOOD_WAVE_SHAPES: (i64, i64) = (0, 132);
/// Breach width bound (m).
const BMAX: (f64, f64) = (30.0, 350.0);
const PFAIL: (f64, f64) = (0.0, 1.0);
/// Dike heightening (dm).
const DIKE_INCREASE: (i64, i64) = (0, 10);
/// Days of early warning.
const EWS_DAYS: (i64, i64) = (0, 4);
const RFR_PROJECTS: u32 = 5;

const EXPECTED_ANNUAL_DAMAGE: &str = "Expected Annual Damage";
const DIKE_INVESTMENT_COSTS: &str = "Dike Investment Costs";
const EXPECTED_DEATHS: &str = "Expected Number of Deaths";
const RFR_TOTAL_COSTS: &str = "RfR Total Costs";
const EVACUATION_COSTS: &str = "Evacuation Costs";

/// The six problem formulations, each a different choice of objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemFormulation {
    /// Damage, RfR cost and dike cost over the upstream rings A.1-A.3.
    UpstreamCosts,
    /// One aggregate of upstream damage and RfR cost.
    UpstreamDamageAndRfr,
    /// Dike cost of A.3, evacuation cost, deaths.
    LowerRingSafety,
    /// Dike cost of A.1-A.2, evacuation cost, deaths.
    UpperRingSafety,
    /// Damage and dike cost of A.4-A.5 per planning step, RfR cost per step.
    DownstreamOverTime,
    /// Every per-dike result over time and space.
    FullyDisaggregated,
}

impl ProblemFormulation {
    pub const ALL: [ProblemFormulation; 6] = [
        ProblemFormulation::UpstreamCosts,
        ProblemFormulation::UpstreamDamageAndRfr,
        ProblemFormulation::LowerRingSafety,
        ProblemFormulation::UpperRingSafety,
        ProblemFormulation::DownstreamOverTime,
        ProblemFormulation::FullyDisaggregated,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    fn outcomes(self, network: &impl DikeNetwork) -> Vec<Outcome> {
        let minimize = |name: &str, variables: Vec<String>| {
            Outcome::scalar(name, variables, Aggregation::SumOver, Direction::Minimize)
        };

        match self {
            ProblemFormulation::UpstreamCosts => vec![
                minimize(
                    EXPECTED_ANNUAL_DAMAGE,
                    per_dike(&["A.1", "A.2", "A.3"], EXPECTED_ANNUAL_DAMAGE),
                ),
                minimize(RFR_TOTAL_COSTS, vec![RFR_TOTAL_COSTS.to_string()]),
                minimize(
                    DIKE_INVESTMENT_COSTS,
                    per_dike(&["A.1", "A.2", "A.3"], DIKE_INVESTMENT_COSTS),
                ),
            ],
            ProblemFormulation::UpstreamDamageAndRfr => {
                let mut variables = per_dike(&["A.1", "A.2", "A.3"], EXPECTED_ANNUAL_DAMAGE);
                variables.push(RFR_TOTAL_COSTS.to_string());
                vec![minimize("Rfr + Annual Damage Costs", variables)]
            }
            ProblemFormulation::LowerRingSafety => safety_outcomes(&["A.3"]),
            ProblemFormulation::UpperRingSafety => safety_outcomes(&["A.1", "A.2"]),
            ProblemFormulation::DownstreamOverTime => vec![
                Outcome::array(
                    EXPECTED_ANNUAL_DAMAGE,
                    per_dike(&["A.4", "A.5"], EXPECTED_ANNUAL_DAMAGE),
                    Aggregation::SumOverTime,
                ),
                Outcome::array(
                    DIKE_INVESTMENT_COSTS,
                    per_dike(&["A.4", "A.5"], DIKE_INVESTMENT_COSTS),
                    Aggregation::SumOverTime,
                ),
                Outcome::passthrough(RFR_TOTAL_COSTS),
            ],
            ProblemFormulation::FullyDisaggregated => {
                let mut outcomes: Vec<Outcome> = network
                    .dike_list()
                    .iter()
                    .flat_map(|dike| {
                        [EXPECTED_ANNUAL_DAMAGE, DIKE_INVESTMENT_COSTS, EXPECTED_DEATHS]
                            .into_iter()
                            .map(move |entry| Outcome::passthrough(format!("{dike}_{entry}")))
                    })
                    .collect();
                outcomes.push(Outcome::passthrough(RFR_TOTAL_COSTS));
                outcomes.push(Outcome::passthrough("Expected Evacuation Costs"));
                outcomes
            }
        }
    }
}

impl TryFrom<u32> for ProblemFormulation {
    type Error = FormulationError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        ProblemFormulation::ALL
            .get(id as usize)
            .copied()
            .ok_or(FormulationError::UnknownFormulation(id))
    }
}

impl fmt::Display for ProblemFormulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "problem formulation {} ({:?})", self.id(), self)
    }
}

fn per_dike(dikes: &[&str], entry: &str) -> Vec<String> {
    dikes.iter().map(|dike| format!("{dike}_{entry}")).collect()
}

fn safety_outcomes(dikes: &[&str]) -> Vec<Outcome> {
    vec![
        Outcome::scalar(
            DIKE_INVESTMENT_COSTS,
            per_dike(dikes, DIKE_INVESTMENT_COSTS),
            Aggregation::SumOver,
            Direction::Minimize,
        ),
        Outcome::scalar(
            EVACUATION_COSTS,
            vec![EVACUATION_COSTS.to_string()],
            Aggregation::SumOver,
            Direction::Minimize,
        ),
        Outcome::scalar(
            EXPECTED_DEATHS,
            vec![EXPECTED_DEATHS.to_string()],
            Aggregation::SumOver,
            Direction::Minimize,
        ),
    ]
}

/// Declaration of the dike-network model for an exploration framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub formulation: ProblemFormulation,
    pub uncertainties: Vec<Parameter>,
    pub levers: Vec<Parameter>,
    pub outcomes: Vec<Outcome>,
}

impl ModelSpec {
    /// Aggregates a raw simulator result into this formulation's outcomes.
    pub fn evaluate_outcomes(
        &self,
        raw: &BTreeMap<String, OutcomeValue>,
    ) -> Result<BTreeMap<String, OutcomeValue>, FormulationError> {
        self.outcomes
            .iter()
            .map(|outcome| {
                outcome
                    .evaluate(raw)
                    .map(|value| (outcome.name.clone(), value))
            })
            .collect()
    }

    /// Array outcomes cannot be handed to a multi-objective optimizer.
    pub fn is_optimizable(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| outcome.kind == OutcomeKind::Scalar)
    }

    pub fn uncertainty(&self, name: &str) -> Option<&Parameter> {
        self.uncertainties.iter().find(|p| p.name == name)
    }

    pub fn lever(&self, name: &str) -> Option<&Parameter> {
        self.levers.iter().find(|p| p.name == name)
    }

    fn check_unique_names(&self) -> Result<(), FormulationError> {
        let mut seen = HashSet::new();
        for parameter in self.uncertainties.iter().chain(&self.levers) {
            if !seen.insert(parameter.name.as_str()) {
                return Err(FormulationError::DuplicateParameter(parameter.name.clone()));
            }
        }
        Ok(())
    }
}

fn uncertainties(network: &impl DikeNetwork) -> Result<Vec<Parameter>, FormulationError> {
    let mut uncertainties = Vec::new();

    for step in network.planning_steps() {
        uncertainties.push(Parameter::categorical(
            format!("discount rate {step}"),
            &DISCOUNT_RATES,
        )?);
    }
    uncertainties.push(Parameter::integer(
        "A.0_ID flood wave shape",
        FLOOD_WAVE_SHAPES.0,
        FLOOD_WAVE_SHAPES.1,
    )?);

    for dike in network.dike_list() {
        uncertainties.push(Parameter::real(format!("{dike}_Bmax"), BMAX.0, BMAX.1)?);
        uncertainties.push(Parameter::real(format!("{dike}_pfail"), PFAIL.0, PFAIL.1)?);
        uncertainties.push(Parameter::categorical(
            format!("{dike}_Brate"),
            &BREACH_GROWTH_RATES,
        )?);
    }
    Ok(uncertainties)
}

fn levers(network: &impl DikeNetwork) -> Result<Vec<Parameter>, FormulationError> {
    let mut levers = Vec::new();

    // room for the river: each project is either implemented (1) or not (0)
    for project in 0..RFR_PROJECTS {
        for step in network.planning_steps() {
            levers.push(Parameter::integer(format!("{project}_RfR {step}"), 0, 1)?);
        }
    }
    levers.push(Parameter::integer(
        "EWS_DaysToThreat",
        EWS_DAYS.0,
        EWS_DAYS.1,
    )?);

    for dike in network.dike_list() {
        for step in network.planning_steps() {
            levers.push(Parameter::integer(
                format!("{dike}_DikeIncrease {step}"),
                DIKE_INCREASE.0,
                DIKE_INCREASE.1,
            )?);
        }
    }
    Ok(levers)
}

/// Builds the model declaration for formulation `id` (0..=5) and returns it
/// together with the network's planning steps.
pub fn get_model_for_problem_formulation<N>(
    id: u32,
    network: &N,
) -> Result<(ModelSpec, Vec<u32>), FormulationError>
where
    N: DikeNetwork,
{
    let formulation = ProblemFormulation::try_from(id)?;
    let model = ModelSpec {
        name: MODEL_NAME.to_string(),
        formulation,
        uncertainties: uncertainties(network)?,
        levers: levers(network)?,
        outcomes: formulation.outcomes(network),
    };
    model.check_unique_names()?;

    debug!(
        formulation = id,
        uncertainties = model.uncertainties.len(),
        levers = model.levers.len(),
        outcomes = model.outcomes.len(),
        "dike model assembled"
    );
    Ok((model, network.planning_steps().to_vec()))
}
