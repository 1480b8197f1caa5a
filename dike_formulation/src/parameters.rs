use serde::{Deserialize, Serialize};

use crate::FormulationError;

/// Range or category set an uncertainty or lever is sampled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterKind {
    Real { lower: f64, upper: f64 },
    Integer { lower: i64, upper: i64 },
    Categorical { categories: Vec<f64> },
}

/// A named uncertainty or lever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn real(
        name: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> Result<Self, FormulationError> {
        let name = name.into();
        if !(lower.is_finite() && upper.is_finite()) || lower > upper {
            return Err(FormulationError::InvalidParameter(format!(
                "{name}: real range [{lower}, {upper}] is empty or not finite"
            )));
        }
        Ok(Self {
            name,
            kind: ParameterKind::Real { lower, upper },
        })
    }

    pub fn integer(
        name: impl Into<String>,
        lower: i64,
        upper: i64,
    ) -> Result<Self, FormulationError> {
        let name = name.into();
        if lower > upper {
            return Err(FormulationError::InvalidParameter(format!(
                "{name}: integer range [{lower}, {upper}] is empty"
            )));
        }
        Ok(Self {
            name,
            kind: ParameterKind::Integer { lower, upper },
        })
    }

    pub fn categorical(
        name: impl Into<String>,
        categories: &[f64],
    ) -> Result<Self, FormulationError> {
        let name = name.into();
        if categories.is_empty() {
            return Err(FormulationError::InvalidParameter(format!(
                "{name}: no categories"
            )));
        }
        Ok(Self {
            name,
            kind: ParameterKind::Categorical {
                categories: categories.to_vec(),
            },
        })
    }

    /// True if `value` is a legal setting for this parameter.
    pub fn admits(&self, value: f64) -> bool {
        match &self.kind {
            ParameterKind::Real { lower, upper } => (*lower..=*upper).contains(&value),
            ParameterKind::Integer { lower, upper } => {
                value.fract() == 0.0 && (*lower as f64..=*upper as f64).contains(&value)
            }
            ParameterKind::Categorical { categories } => categories.contains(&value),
        }
    }
}
