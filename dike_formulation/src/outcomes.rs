use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::FormulationError;

/// Optimization direction of a scalar outcome. Every dike-network outcome
/// is a cost, so minimization is the only direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Minimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Scalar,
    Array,
}

/// How an outcome is reduced from its simulator variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Single variable, passed through.
    Identity,
    /// See [`sum_over`].
    SumOver,
    /// See [`sum_over_time`].
    SumOverTime,
}

/// A raw simulator result or an aggregated outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutcomeValue {
    Scalar(f64),
    /// One entry per planning step.
    Series(Vec<f64>),
}

impl OutcomeValue {
    fn total(&self) -> f64 {
        match self {
            OutcomeValue::Scalar(v) => *v,
            OutcomeValue::Series(values) => values.iter().sum(),
        }
    }
}

/// Grand total over all entries; a series contributes the sum of its
/// elements, a scalar contributes itself.
pub fn sum_over<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a OutcomeValue>,
{
    values.into_iter().map(OutcomeValue::total).sum()
}

/// Element-wise sum of equal-length series, i.e. the total per planning
/// step across all entries.
pub fn sum_over_time<'a, I>(values: I) -> Result<Vec<f64>, FormulationError>
where
    I: IntoIterator<Item = &'a OutcomeValue>,
{
    sum_series("sum_over_time", values)
}

fn sum_series<'a, I>(outcome: &str, values: I) -> Result<Vec<f64>, FormulationError>
where
    I: IntoIterator<Item = &'a OutcomeValue>,
{
    let mut totals: Option<Vec<f64>> = None;
    for value in values {
        let series = match value {
            OutcomeValue::Series(series) => series,
            OutcomeValue::Scalar(_) => {
                return Err(FormulationError::KindMismatch(format!(
                    "{outcome}: cannot sum a scalar over time"
                )))
            }
        };
        match totals.as_mut() {
            None => totals = Some(series.clone()),
            Some(acc) => {
                if acc.len() != series.len() {
                    return Err(FormulationError::ShapeMismatch {
                        outcome: outcome.to_string(),
                        expected: acc.len(),
                        found: series.len(),
                    });
                }
                for (a, v) in acc.iter_mut().zip(series) {
                    *a += v;
                }
            }
        }
    }
    Ok(totals.unwrap_or_default())
}

/// An outcome of interest exposed to the exploration framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub kind: OutcomeKind,
    /// Simulator variables feeding this outcome; empty means the variable
    /// with the outcome's own name.
    pub variable_names: Vec<String>,
    pub aggregation: Aggregation,
    /// Only scalar outcomes carry a direction.
    pub direction: Option<Direction>,
}

impl Outcome {
    pub fn scalar(
        name: impl Into<String>,
        variable_names: Vec<String>,
        aggregation: Aggregation,
        direction: Direction,
    ) -> Self {
        Self {
            name: name.into(),
            kind: OutcomeKind::Scalar,
            variable_names,
            aggregation,
            direction: Some(direction),
        }
    }

    pub fn array(
        name: impl Into<String>,
        variable_names: Vec<String>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            name: name.into(),
            kind: OutcomeKind::Array,
            variable_names,
            aggregation,
            direction: None,
        }
    }

    /// Array outcome read straight from the simulator variable of the same
    /// name.
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self::array(name, Vec::new(), Aggregation::Identity)
    }

    pub fn variables(&self) -> Vec<&str> {
        if self.variable_names.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.variable_names.iter().map(String::as_str).collect()
        }
    }

    /// Reduces the raw simulator results for this outcome.
    pub fn evaluate(
        &self,
        raw: &BTreeMap<String, OutcomeValue>,
    ) -> Result<OutcomeValue, FormulationError> {
        let values = self
            .variables()
            .into_iter()
            .map(|var| {
                raw.get(var)
                    .ok_or_else(|| FormulationError::MissingVariable(var.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let value = match self.aggregation {
            Aggregation::Identity => match values.as_slice() {
                [single] => (*single).clone(),
                _ => {
                    return Err(FormulationError::KindMismatch(format!(
                        "{}: pass-through needs exactly one variable, got {}",
                        self.name,
                        values.len()
                    )))
                }
            },
            Aggregation::SumOver => OutcomeValue::Scalar(sum_over(values)),
            Aggregation::SumOverTime => OutcomeValue::Series(sum_series(&self.name, values)?),
        };

        match (self.kind, &value) {
            (OutcomeKind::Scalar, OutcomeValue::Scalar(_))
            | (OutcomeKind::Array, OutcomeValue::Series(_)) => Ok(value),
            _ => Err(FormulationError::KindMismatch(format!(
                "{}: {:?} outcome produced {:?}",
                self.name, self.kind, value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, OutcomeValue)]) -> BTreeMap<String, OutcomeValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn sum_over_mixes_scalars_and_series() {
        let values = [
            OutcomeValue::Scalar(1.5),
            OutcomeValue::Series(vec![1.0, 2.0, 3.0]),
        ];
        assert_eq!(sum_over(&values), 7.5);
        assert_eq!(sum_over(&[]), 0.0);
    }

    #[test]
    fn sum_over_time_is_elementwise() {
        let values = [
            OutcomeValue::Series(vec![1.0, 2.0, 3.0]),
            OutcomeValue::Series(vec![10.0, 20.0, 30.0]),
        ];
        assert_eq!(sum_over_time(&values).unwrap(), vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn sum_over_time_rejects_ragged_series() {
        let values = [
            OutcomeValue::Series(vec![1.0, 2.0, 3.0]),
            OutcomeValue::Series(vec![1.0]),
        ];
        let err = sum_over_time(&values).unwrap_err();
        assert_eq!(
            err,
            FormulationError::ShapeMismatch {
                outcome: "sum_over_time".into(),
                expected: 3,
                found: 1,
            }
        );
        assert!(sum_over_time(&[OutcomeValue::Scalar(1.0)]).is_err());
    }

    #[test]
    fn passthrough_reads_its_own_name() {
        let outcome = Outcome::passthrough("RfR Total Costs");
        let raw = raw(&[("RfR Total Costs", OutcomeValue::Series(vec![5.0, 0.0, 1.0]))]);
        assert_eq!(
            outcome.evaluate(&raw).unwrap(),
            OutcomeValue::Series(vec![5.0, 0.0, 1.0])
        );
    }

    #[test]
    fn missing_variable_is_reported() {
        let outcome = Outcome::scalar(
            "Evacuation Costs",
            vec!["Evacuation Costs".into()],
            Aggregation::SumOver,
            Direction::Minimize,
        );
        assert_eq!(
            outcome.evaluate(&BTreeMap::new()).unwrap_err(),
            FormulationError::MissingVariable("Evacuation Costs".into())
        );
    }

    #[test]
    fn scalar_outcome_cannot_pass_through_a_series() {
        let outcome = Outcome {
            name: "x".into(),
            kind: OutcomeKind::Scalar,
            variable_names: vec![],
            aggregation: Aggregation::Identity,
            direction: Some(Direction::Minimize),
        };
        let raw = raw(&[("x", OutcomeValue::Series(vec![1.0]))]);
        assert!(matches!(
            outcome.evaluate(&raw),
            Err(FormulationError::KindMismatch(_))
        ));
    }
}
