//! Lost Capital Component
//!
//! Values the investments that were paid for but bought nothing, or whose
//! result was later destroyed.
//!
//! # Inputs
//!
//! - `Forest Surface|Deforestation|Requested` (Gha)
//! - `Forest Surface|Deforestation|Delta` (Gha)
//! - `Forest Surface|Managed Wood|Converted` (Gha)
//!
//! # Outputs
//!
//! - `Lost Capital|Deforestation` (G$): deforestation investment wasted once the
//!   deforestable stock is exhausted
//! - `Lost Capital|Managed Wood` (G$): managed wood planted and then cleared
//! - `Lost Capital|Reforestation` (G$): reforested land that was later cleared
//! - `Lost Capital|Total` (G$)
//!
//! Deforestation only ever clears unmanaged forest and, under
//! `UnmanagedThenManagedWood`, managed wood. Reforested land is never cleared, so
//! `Lost Capital|Reforestation` is identically zero and has no sensitivity to any
//! investment. It is still reported and summed into the total.

use crate::parameters::LostCapitalParameters;
use crate::variables::*;
use ndarray::Array1;
use rsforest_core::component::{Component, ComponentOutput, InputState, RequirementDefinition};
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::jacobian::operators;
use rsforest_core::timeseries::{FloatValue, Horizon, YearSeries};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LostCapital {
    parameters: LostCapitalParameters,
}

impl LostCapital {
    pub fn from_parameters(parameters: LostCapitalParameters) -> Self {
        Self { parameters }
    }
}

impl Default for LostCapital {
    fn default() -> Self {
        Self::from_parameters(LostCapitalParameters::default())
    }
}

fn check_nonnegative(name: &str, horizon: Horizon, values: &Array1<FloatValue>) -> RSForestResult<()> {
    // Accumulated rounding from the saturation can leave tiny negative residuals
    const TOLERANCE: FloatValue = 1e-12;
    match horizon
        .years()
        .zip(values.iter())
        .find(|(_, value)| !(value.is_finite() && **value >= -TOLERANCE))
    {
        Some((year, value)) => Err(RSForestError::NumericDomainError {
            series: name.to_string(),
            year,
            reason: format!("lost capital must be nonnegative, got {}", value),
        }),
        None => Ok(()),
    }
}

#[typetag::serde]
impl Component for LostCapital {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_DEFORESTATION_REQUESTED),
            RequirementDefinition::input(&VAR_DEFORESTATION_DELTA),
            RequirementDefinition::input(&VAR_MANAGED_WOOD_CONVERTED),
            RequirementDefinition::output(&VAR_LOST_CAPITAL_DEFORESTATION),
            RequirementDefinition::output(&VAR_LOST_CAPITAL_MANAGED_WOOD),
            RequirementDefinition::output(&VAR_LOST_CAPITAL_REFORESTATION),
            RequirementDefinition::output(&VAR_LOST_CAPITAL_TOTAL),
        ]
    }

    fn solve(&self, horizon: Horizon, input_state: &InputState) -> RSForestResult<ComponentOutput> {
        self.parameters.validate()?;
        let n = horizon.len();
        let deforestation_cost = self.parameters.deforestation_cost_per_ha;
        let managed_wood_cost = self.parameters.managed_wood_cost_per_ha;

        let requested = input_state.variable(&VAR_DEFORESTATION_REQUESTED)?.values();
        let deforested = input_state.variable(&VAR_DEFORESTATION_DELTA)?.values();
        let converted = input_state.variable(&VAR_MANAGED_WOOD_CONVERTED)?.values();

        // Gha × $/ha = G$
        let wasted = (requested - deforested) * deforestation_cost;
        let difference = operators::difference(n);
        let cleared = difference.dot(converted) * managed_wood_cost;
        check_nonnegative(VAR_LOST_CAPITAL_DEFORESTATION.name, horizon, &wasted)?;
        check_nonnegative(VAR_LOST_CAPITAL_MANAGED_WOOD.name, horizon, &cleared)?;
        let reforested = Array1::zeros(n);
        let total = &wasted + &cleared + &reforested;

        let series = |values: Array1<FloatValue>| YearSeries::new(horizon.year_start, values);
        let mut output = ComponentOutput::new();
        output.insert(&VAR_LOST_CAPITAL_DEFORESTATION, series(wasted)?);
        output.insert(&VAR_LOST_CAPITAL_MANAGED_WOOD, series(cleared)?);
        output.insert(&VAR_LOST_CAPITAL_REFORESTATION, series(reforested)?);
        output.insert(&VAR_LOST_CAPITAL_TOTAL, series(total)?);

        output.derivative(
            &VAR_LOST_CAPITAL_DEFORESTATION,
            &VAR_DEFORESTATION_REQUESTED,
            operators::scaled_identity(n, deforestation_cost),
        );
        output.derivative(
            &VAR_LOST_CAPITAL_DEFORESTATION,
            &VAR_DEFORESTATION_DELTA,
            operators::scaled_identity(n, -deforestation_cost),
        );
        output.derivative(
            &VAR_LOST_CAPITAL_MANAGED_WOOD,
            &VAR_MANAGED_WOOD_CONVERTED,
            difference * managed_wood_cost,
        );
        output.derivative(
            &VAR_LOST_CAPITAL_TOTAL,
            &VAR_LOST_CAPITAL_DEFORESTATION,
            operators::identity(n),
        );
        output.derivative(
            &VAR_LOST_CAPITAL_TOTAL,
            &VAR_LOST_CAPITAL_MANAGED_WOOD,
            operators::identity(n),
        );
        output.derivative(
            &VAR_LOST_CAPITAL_TOTAL,
            &VAR_LOST_CAPITAL_REFORESTATION,
            operators::identity(n),
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rsforest_core::timeseries_collection::{TimeseriesCollection, VariableType};

    fn solve(
        requested: Vec<FloatValue>,
        deforested: Vec<FloatValue>,
        converted: Vec<FloatValue>,
    ) -> RSForestResult<ComponentOutput> {
        let horizon = Horizon::new(2020, 2020 + requested.len() as i32 - 1).unwrap();
        let mut collection = TimeseriesCollection::new();
        for (variable, values) in [
            (&VAR_DEFORESTATION_REQUESTED, requested),
            (&VAR_DEFORESTATION_DELTA, deforested),
            (&VAR_MANAGED_WOOD_CONVERTED, converted),
        ] {
            collection
                .add_timeseries(
                    variable.name,
                    YearSeries::from_vec(2020, values).unwrap(),
                    VariableType::Endogenous,
                )
                .unwrap();
        }
        let state = InputState::build(horizon, collection.iter().collect());
        LostCapital::default().solve(horizon, &state)
    }

    #[test]
    fn wasted_and_cleared_investment() {
        let output = solve(
            vec![0.1, 0.1, 0.1],
            vec![0.1, 0.04, 0.0],
            vec![0.0, 0.0, 0.05],
        )
        .unwrap();
        let wasted = output.get(VAR_LOST_CAPITAL_DEFORESTATION.name).unwrap().to_vec();
        let cleared = output.get(VAR_LOST_CAPITAL_MANAGED_WOOD.name).unwrap().to_vec();
        let total = output.get(VAR_LOST_CAPITAL_TOTAL.name).unwrap().to_vec();

        assert_eq!(wasted[0], 0.0);
        assert_relative_eq!(wasted[1], 0.06 * 8000.0, max_relative = 1e-12);
        assert_relative_eq!(wasted[2], 800.0);
        assert_eq!(cleared[..2], [0.0, 0.0]);
        assert_relative_eq!(cleared[2], 0.05 * 13047.0);
        assert_relative_eq!(total[2], 800.0 + 0.05 * 13047.0);
    }

    #[test]
    fn reforested_land_is_never_lost() {
        let output = solve(
            vec![0.1, 0.1, 0.1],
            vec![0.05, 0.0, 0.0],
            vec![0.0, 0.02, 0.07],
        )
        .unwrap();
        let reforested = output.get(VAR_LOST_CAPITAL_REFORESTATION.name).unwrap().to_vec();
        assert_eq!(reforested, vec![0.0; 3]);
        assert!(output
            .derivatives()
            .iter()
            .all(|d| d.output != VAR_LOST_CAPITAL_REFORESTATION.name));
    }

    #[test]
    fn shrinking_conversion_is_rejected() {
        let result = solve(vec![0.0, 0.0], vec![0.0, 0.0], vec![0.2, 0.1]);
        assert!(matches!(
            result,
            Err(RSForestError::NumericDomainError { year: 2021, .. })
        ));
    }
}
