//! Carbon Balance Component
//!
//! Converts the yearly forest surface changes into CO2 flows and a running balance.
//!
//! # Inputs
//!
//! - `Forest Surface|Deforestation|Delta` (Gha)
//! - `Forest Surface|Reforestation|Delta` (Gha)
//!
//! # Outputs
//!
//! - `CO2 Emissions|Forest|Emitted` (GtCO2), positive
//! - `CO2 Emissions|Forest|Absorbed` (GtCO2), negative
//! - `CO2 Emissions|Forest|Net` (GtCO2)
//! - `CO2 Emissions|Forest|Cumulative` (GtCO2)

use crate::parameters::CarbonParameters;
use crate::variables::*;
use ndarray::Array1;
use rsforest_core::component::{Component, ComponentOutput, InputState, RequirementDefinition};
use rsforest_core::errors::RSForestResult;
use rsforest_core::jacobian::operators;
use rsforest_core::timeseries::{FloatValue, Horizon, YearSeries};
use serde::{Deserialize, Serialize};

/// Gha × kgCO2/ha to GtCO2
const KG_PER_HA_TO_GT_PER_GHA: FloatValue = 1e-3;

/// Forest CO2 balance.
///
/// $$ E_y = d_y \, c, \quad A_y = -r_y \, c, \quad B_y = B_0 + \sum_{k \le y} (E_k + A_k) $$
///
/// where $c$ is the CO2 stored per hectare and $B_0$ the initial debt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonBalance {
    parameters: CarbonParameters,
}

impl CarbonBalance {
    pub fn from_parameters(parameters: CarbonParameters) -> Self {
        Self { parameters }
    }

    /// GtCO2 per Gha of cleared or planted forest
    fn co2_per_surface(&self) -> FloatValue {
        self.parameters.co2_per_ha * KG_PER_HA_TO_GT_PER_GHA
    }
}

impl Default for CarbonBalance {
    fn default() -> Self {
        Self::from_parameters(CarbonParameters::default())
    }
}

#[typetag::serde]
impl Component for CarbonBalance {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_DEFORESTATION_DELTA),
            RequirementDefinition::input(&VAR_REFORESTATION_DELTA),
            RequirementDefinition::output(&VAR_CO2_EMITTED),
            RequirementDefinition::output(&VAR_CO2_ABSORBED),
            RequirementDefinition::output(&VAR_CO2_NET),
            RequirementDefinition::output(&VAR_CO2_CUMULATIVE),
        ]
    }

    fn solve(&self, horizon: Horizon, input_state: &InputState) -> RSForestResult<ComponentOutput> {
        let n = horizon.len();
        let factor = self.co2_per_surface();
        let deforested = input_state.variable(&VAR_DEFORESTATION_DELTA)?.values();
        let reforested = input_state.variable(&VAR_REFORESTATION_DELTA)?.values();

        let emitted: Array1<FloatValue> = deforested * factor;
        let absorbed: Array1<FloatValue> = reforested * -factor;
        let net = &emitted + &absorbed;
        let running_sum = operators::running_sum(n);
        let cumulative = running_sum.dot(&net) + self.parameters.initial_co2_debt;

        let mut output = ComponentOutput::new();
        output.insert(&VAR_CO2_EMITTED, YearSeries::new(horizon.year_start, emitted)?);
        output.insert(&VAR_CO2_ABSORBED, YearSeries::new(horizon.year_start, absorbed)?);
        output.insert(&VAR_CO2_NET, YearSeries::new(horizon.year_start, net)?);
        output.insert(&VAR_CO2_CUMULATIVE, YearSeries::new(horizon.year_start, cumulative)?);

        output.derivative(
            &VAR_CO2_EMITTED,
            &VAR_DEFORESTATION_DELTA,
            operators::scaled_identity(n, factor),
        );
        output.derivative(
            &VAR_CO2_ABSORBED,
            &VAR_REFORESTATION_DELTA,
            operators::scaled_identity(n, -factor),
        );
        output.derivative(&VAR_CO2_NET, &VAR_CO2_EMITTED, operators::identity(n));
        output.derivative(&VAR_CO2_NET, &VAR_CO2_ABSORBED, operators::identity(n));
        output.derivative(&VAR_CO2_CUMULATIVE, &VAR_CO2_NET, running_sum);

        Ok(output)
    }
}
