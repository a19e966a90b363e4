//! Biomass Production Component
//!
//! Converts harvested managed wood and cleared forest into biomass flows.
//!
//! # What This Component Does
//!
//! 1. Determines the productive managed-wood surface: managed wood planted at least
//!    `construction_delay` years earlier, less what deforestation has converted
//! 2. Converts the productive surface and the cleared surface into mass
//! 3. Splits the total mass into wood and residue, then into energy and industry uses
//! 4. Converts the energy mass into energy with the calorific value
//! 5. Accounts for the CO2 the produced biomass captured while growing
//!
//! # Inputs
//!
//! - `Forest Surface|Managed Wood|Cumulative` (Gha)
//! - `Forest Surface|Managed Wood|Converted` (Gha)
//! - `Forest Surface|Deforestation|Delta` (Gha)
//!
//! # Outputs
//!
//! Every `Biomass|*|Mass` variable (Mt), the productive surface (Gha),
//! `Biomass|Energy|Production` (TWh), `Biomass|CO2 Consumption` (Mt) and
//! `Biomass|CO2 Intensity` (kg/kWh).
//!
//! The CO2 consumption is the carbon content of the total mass expressed as CO2.
//! The intensity is the same quantity per kWh of biomass energy, with a negative
//! sign. It depends on no input and carries no derivative.

use crate::parameters::BiomassParameters;
use crate::variables::*;
use ndarray::Array1;
use rsforest_core::component::{Component, ComponentOutput, InputState, RequirementDefinition};
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::jacobian::operators;
use rsforest_core::timeseries::{FloatValue, Horizon, YearSeries};
use serde::{Deserialize, Serialize};

/// kg/ha × Gha to Mt
const KG_PER_HA_TO_MT_PER_GHA: FloatValue = 1.0;

/// Biomass production with a construction delay.
///
/// The productive surface in year $y$ is
///
/// $$ P_y = \max(L_y - O_y, 0) $$
///
/// where $L_y$ is the managed wood planted `construction_delay` years earlier and
/// $O_y$ the managed wood converted by deforestation. Before the delay has elapsed
/// within the horizon, $L_y$ is the initial managed wood less the plantings of the
/// investment history that are still maturing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomassProduction {
    parameters: BiomassParameters,
}

impl BiomassProduction {
    pub fn from_parameters(parameters: BiomassParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &BiomassParameters {
        &self.parameters
    }

    /// Managed wood old enough to be harvested, before conversion
    pub fn lagged_surface(&self, managed_wood_cumulative: &Array1<FloatValue>) -> Array1<FloatValue> {
        let delay = self.parameters.production.construction_delay;
        let history = self.parameters.history_surface();
        let initial = self.parameters.initial_managed_wood;

        Array1::from_shape_fn(managed_wood_cumulative.len(), |i| {
            if i >= delay {
                managed_wood_cumulative[i - delay]
            } else {
                let maturing: FloatValue = history[i + 1..].iter().sum();
                initial - maturing
            }
        })
    }
}

impl Default for BiomassProduction {
    fn default() -> Self {
        Self::from_parameters(BiomassParameters::default())
    }
}

#[typetag::serde]
impl Component for BiomassProduction {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_MANAGED_WOOD_CUMULATIVE),
            RequirementDefinition::input(&VAR_MANAGED_WOOD_CONVERTED),
            RequirementDefinition::input(&VAR_DEFORESTATION_DELTA),
            RequirementDefinition::output(&VAR_PRODUCTIVE_SURFACE),
            RequirementDefinition::output(&VAR_MANAGED_WOOD_MASS),
            RequirementDefinition::output(&VAR_DEFORESTATION_MASS),
            RequirementDefinition::output(&VAR_TOTAL_MASS),
            RequirementDefinition::output(&VAR_WOOD_MASS),
            RequirementDefinition::output(&VAR_RESIDUE_MASS),
            RequirementDefinition::output(&VAR_ENERGY_MASS),
            RequirementDefinition::output(&VAR_INDUSTRY_MASS),
            RequirementDefinition::output(&VAR_ENERGY_PRODUCTION),
            RequirementDefinition::output(&VAR_CO2_CONSUMPTION),
            RequirementDefinition::output(&VAR_CO2_INTENSITY),
        ]
    }

    fn solve(&self, horizon: Horizon, input_state: &InputState) -> RSForestResult<ComponentOutput> {
        self.parameters.validate()?;
        let production = &self.parameters.production;
        let n = horizon.len();

        let managed_wood = input_state.variable(&VAR_MANAGED_WOOD_CUMULATIVE)?.values();
        let converted = input_state.variable(&VAR_MANAGED_WOOD_CONVERTED)?.values();
        let deforested = input_state.variable(&VAR_DEFORESTATION_DELTA)?.values();

        let available = self.lagged_surface(managed_wood) - converted;
        let productive = available.mapv(|v| v.max(0.0));
        let productive_mask = available.mapv(|v| if v >= 0.0 { 1.0 } else { 0.0 });

        let managed_wood_yield = production.managed_wood_yield() * KG_PER_HA_TO_MT_PER_GHA;
        let clearing_yield = production.mass_per_ha() * KG_PER_HA_TO_MT_PER_GHA;
        let managed_wood_mass = &productive * managed_wood_yield;
        let deforestation_mass = deforested * clearing_yield;
        if let Some((year, value)) = horizon
            .years()
            .zip(deforestation_mass.iter())
            .find(|(_, value)| **value < 0.0)
        {
            return Err(RSForestError::NumericDomainError {
                series: VAR_DEFORESTATION_MASS.name.to_string(),
                year,
                reason: format!("mass must not be negative, got {}", value),
            });
        }

        let total = &managed_wood_mass + &deforestation_mass;
        let wood = &total * production.wood_share();
        let residue = &total * production.residue_share();
        let energy_share = production.energy_share();
        let energy = &total * energy_share;
        let industry = &total * (1.0 - energy_share);
        let energy_production = &energy * production.calorific_value;
        // Mt of biomass × kg/kg = Mt of CO2
        let co2_consumption = &total * production.co2_per_kg();
        let co2_intensity = Array1::from_elem(n, production.co2_intensity());

        let series = |values: Array1<FloatValue>| YearSeries::new(horizon.year_start, values);
        let mut output = ComponentOutput::new();
        output.insert(&VAR_PRODUCTIVE_SURFACE, series(productive)?);
        output.insert(&VAR_MANAGED_WOOD_MASS, series(managed_wood_mass)?);
        output.insert(&VAR_DEFORESTATION_MASS, series(deforestation_mass)?);
        output.insert(&VAR_TOTAL_MASS, series(total)?);
        output.insert(&VAR_WOOD_MASS, series(wood)?);
        output.insert(&VAR_RESIDUE_MASS, series(residue)?);
        output.insert(&VAR_ENERGY_MASS, series(energy)?);
        output.insert(&VAR_INDUSTRY_MASS, series(industry)?);
        output.insert(&VAR_ENERGY_PRODUCTION, series(energy_production)?);
        output.insert(&VAR_CO2_CONSUMPTION, series(co2_consumption)?);
        output.insert(&VAR_CO2_INTENSITY, series(co2_intensity)?);

        // Each productive year reads exactly one managed-wood year, `delay` years earlier
        let lag = operators::lag(n, production.construction_delay);
        let mask = operators::diagonal(&productive_mask);
        output.derivative(
            &VAR_PRODUCTIVE_SURFACE,
            &VAR_MANAGED_WOOD_CUMULATIVE,
            mask.dot(&lag),
        );
        output.derivative(
            &VAR_PRODUCTIVE_SURFACE,
            &VAR_MANAGED_WOOD_CONVERTED,
            -mask,
        );
        output.derivative(
            &VAR_MANAGED_WOOD_MASS,
            &VAR_PRODUCTIVE_SURFACE,
            operators::scaled_identity(n, managed_wood_yield),
        );
        output.derivative(
            &VAR_DEFORESTATION_MASS,
            &VAR_DEFORESTATION_DELTA,
            operators::scaled_identity(n, clearing_yield),
        );
        output.derivative(&VAR_TOTAL_MASS, &VAR_MANAGED_WOOD_MASS, operators::identity(n));
        output.derivative(&VAR_TOTAL_MASS, &VAR_DEFORESTATION_MASS, operators::identity(n));
        for (variable, share) in [
            (&VAR_WOOD_MASS, production.wood_share()),
            (&VAR_RESIDUE_MASS, production.residue_share()),
            (&VAR_ENERGY_MASS, energy_share),
            (&VAR_INDUSTRY_MASS, 1.0 - energy_share),
        ] {
            output.derivative(variable, &VAR_TOTAL_MASS, operators::scaled_identity(n, share));
        }
        output.derivative(
            &VAR_ENERGY_PRODUCTION,
            &VAR_ENERGY_MASS,
            operators::scaled_identity(n, production.calorific_value),
        );
        output.derivative(
            &VAR_CO2_CONSUMPTION,
            &VAR_TOTAL_MASS,
            operators::scaled_identity(n, production.co2_per_kg()),
        );

        Ok(output)
    }
}
