//! Cost and Price Component
//!
//! Computes the biomass price as a mass-weighted blend of the unit cost of each
//! source plus transport, scaled by a margin.
//!
//! # Inputs
//!
//! - `Biomass|Managed Wood|Mass` (Mt)
//! - `Biomass|Deforestation|Mass` (Mt)
//! - `Biomass|Transport Cost` ($/t), exogenous
//! - `Biomass|Margin` (%), exogenous
//!
//! # Outputs
//!
//! - `Biomass|Managed Wood|Price` ($/t)
//! - `Biomass|Deforestation|Price` ($/t)
//! - `Biomass|Price` ($/t)
//! - `Biomass|Price per Energy` ($/MWh)
//!
//! A year without any biomass has no blend. It reuses the price of the previous
//! year, or the configured default price in the first year.

use crate::parameters::PriceParameters;
use crate::variables::*;
use log::warn;
use ndarray::{Array1, Array2};
use rsforest_core::component::{Component, ComponentOutput, InputState, RequirementDefinition};
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::jacobian::operators;
use rsforest_core::timeseries::{FloatValue, Horizon, YearSeries};
use serde::{Deserialize, Serialize};

/// Biomass price.
///
/// With $m$ and $f$ the managed-wood and deforestation masses, $u_m$ and $u_f$ their
/// unit costs, $t$ the transport cost and $\mu$ the margin in percent:
///
/// $$ B = \frac{m u_m + f u_f}{m + f}, \qquad p = (B + t) \frac{\mu}{100} $$
///
/// so that
///
/// $$ \frac{\partial p}{\partial m} = \frac{\mu}{100} \frac{u_m - B}{m + f}, \qquad
///    \frac{\partial p}{\partial f} = \frac{\mu}{100} \frac{u_f - B}{m + f} $$
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomassPrice {
    parameters: PriceParameters,
}

impl BiomassPrice {
    pub fn from_parameters(parameters: PriceParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &PriceParameters {
        &self.parameters
    }
}

impl Default for BiomassPrice {
    fn default() -> Self {
        Self::from_parameters(PriceParameters::default())
    }
}

fn check_mass(name: &str, horizon: Horizon, values: &Array1<FloatValue>) -> RSForestResult<()> {
    match horizon
        .years()
        .zip(values.iter())
        .find(|(_, value)| !(value.is_finite() && **value >= 0.0))
    {
        Some((year, value)) => Err(RSForestError::NumericDomainError {
            series: name.to_string(),
            year,
            reason: format!("mass must be finite and nonnegative, got {}", value),
        }),
        None => Ok(()),
    }
}

#[typetag::serde]
impl Component for BiomassPrice {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_MANAGED_WOOD_MASS),
            RequirementDefinition::input(&VAR_DEFORESTATION_MASS),
            RequirementDefinition::input(&VAR_TRANSPORT_COST),
            RequirementDefinition::input(&VAR_MARGIN),
            RequirementDefinition::output(&VAR_MANAGED_WOOD_PRICE),
            RequirementDefinition::output(&VAR_DEFORESTATION_PRICE),
            RequirementDefinition::output(&VAR_PRICE_PER_TONNE),
            RequirementDefinition::output(&VAR_PRICE_PER_MWH),
        ]
    }

    fn solve(&self, horizon: Horizon, input_state: &InputState) -> RSForestResult<ComponentOutput> {
        let n = horizon.len();
        let managed_wood = input_state.variable(&VAR_MANAGED_WOOD_MASS)?.values();
        let deforestation = input_state.variable(&VAR_DEFORESTATION_MASS)?.values();
        let transport = input_state.variable(&VAR_TRANSPORT_COST)?.values();
        let margin = input_state.variable(&VAR_MARGIN)?.values();
        check_mass(VAR_MANAGED_WOOD_MASS.name, horizon, managed_wood)?;
        check_mass(VAR_DEFORESTATION_MASS.name, horizon, deforestation)?;

        let managed_wood_cost = self.parameters.managed_wood_unit_cost();
        let deforestation_cost = self.parameters.deforestation_unit_cost();
        let scale = margin / 100.0;

        let managed_wood_price = (transport + managed_wood_cost) * &scale;
        let deforestation_price = (transport + deforestation_cost) * &scale;

        let mut price = Array1::zeros(n);
        let mut by_managed_wood = Array2::zeros((n, n));
        let mut by_deforestation = Array2::zeros((n, n));
        let mut by_transport = Array2::zeros((n, n));
        let mut by_margin = Array2::zeros((n, n));

        for i in 0..n {
            let total = managed_wood[i] + deforestation[i];
            if total > 0.0 {
                let blend = (managed_wood[i] * managed_wood_cost
                    + deforestation[i] * deforestation_cost)
                    / total;
                price[i] = (blend + transport[i]) * scale[i];
                by_managed_wood[[i, i]] = scale[i] * (managed_wood_cost - blend) / total;
                by_deforestation[[i, i]] = scale[i] * (deforestation_cost - blend) / total;
                by_transport[[i, i]] = scale[i];
                by_margin[[i, i]] = (blend + transport[i]) / 100.0;
            } else if i > 0 {
                warn!(
                    "No biomass produced in {}, reusing the price of {}",
                    horizon.year_at(i),
                    horizon.year_at(i - 1)
                );
                price[i] = price[i - 1];
                for matrix in [
                    &mut by_managed_wood,
                    &mut by_deforestation,
                    &mut by_transport,
                    &mut by_margin,
                ] {
                    let previous = matrix.row(i - 1).to_owned();
                    matrix.row_mut(i).assign(&previous);
                }
            } else {
                match self.parameters.default_price {
                    Some(default_price) => {
                        warn!(
                            "No biomass produced in {}, using the default price",
                            horizon.year_at(i)
                        );
                        price[i] = default_price;
                    }
                    None => {
                        return Err(RSForestError::NumericDomainError {
                            series: VAR_PRICE_PER_TONNE.name.to_string(),
                            year: horizon.year_at(i),
                            reason: "no biomass is produced and no default price is configured"
                                .to_string(),
                        })
                    }
                }
            }

            if !(price[i].is_finite() && price[i] > 0.0) {
                return Err(RSForestError::NumericDomainError {
                    series: VAR_PRICE_PER_TONNE.name.to_string(),
                    year: horizon.year_at(i),
                    reason: format!("price must be positive, got {}", price[i]),
                });
            }
        }

        let per_energy = 1.0 / self.parameters.calorific_value;
        let price_per_mwh = &price * per_energy;

        let series = |values: Array1<FloatValue>| YearSeries::new(horizon.year_start, values);
        let mut output = ComponentOutput::new();
        output.insert(&VAR_MANAGED_WOOD_PRICE, series(managed_wood_price.clone())?);
        output.insert(&VAR_DEFORESTATION_PRICE, series(deforestation_price.clone())?);
        output.insert(&VAR_PRICE_PER_TONNE, series(price)?);
        output.insert(&VAR_PRICE_PER_MWH, series(price_per_mwh)?);

        let scale_diagonal = operators::diagonal(&scale);
        output.derivative(
            &VAR_MANAGED_WOOD_PRICE,
            &VAR_TRANSPORT_COST,
            scale_diagonal.clone(),
        );
        output.derivative(
            &VAR_MANAGED_WOOD_PRICE,
            &VAR_MARGIN,
            operators::diagonal(&((transport + managed_wood_cost) / 100.0)),
        );
        output.derivative(&VAR_DEFORESTATION_PRICE, &VAR_TRANSPORT_COST, scale_diagonal);
        output.derivative(
            &VAR_DEFORESTATION_PRICE,
            &VAR_MARGIN,
            operators::diagonal(&((transport + deforestation_cost) / 100.0)),
        );
        output.derivative(&VAR_PRICE_PER_TONNE, &VAR_MANAGED_WOOD_MASS, by_managed_wood);
        output.derivative(&VAR_PRICE_PER_TONNE, &VAR_DEFORESTATION_MASS, by_deforestation);
        output.derivative(&VAR_PRICE_PER_TONNE, &VAR_TRANSPORT_COST, by_transport);
        output.derivative(&VAR_PRICE_PER_TONNE, &VAR_MARGIN, by_margin);
        output.derivative(
            &VAR_PRICE_PER_MWH,
            &VAR_PRICE_PER_TONNE,
            operators::scaled_identity(n, per_energy),
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
        parameters: PriceParameters,
        managed_wood: Vec<FloatValue>,
        deforestation: Vec<FloatValue>,
    ) -> RSForestResult<ComponentOutput> {
        let n = managed_wood.len();
        let horizon = Horizon::new(2020, 2020 + n as i32 - 1).unwrap();
        let mut collection = TimeseriesCollection::new();
        for (variable, values) in [
            (&VAR_MANAGED_WOOD_MASS, managed_wood),
            (&VAR_DEFORESTATION_MASS, deforestation),
            (&VAR_TRANSPORT_COST, vec![7.6; n]),
            (&VAR_MARGIN, vec![110.0; n]),
        ] {
            collection
                .add_timeseries(
                    variable.name,
                    YearSeries::from_vec(2020, values).unwrap(),
                    VariableType::Exogenous,
                )
                .unwrap();
        }
        let state = InputState::build(horizon, collection.iter().collect());
        BiomassPrice::from_parameters(parameters).solve(horizon, &state)
    }

    fn derivative<'a>(output: &'a ComponentOutput, input: &str) -> &'a Array2<FloatValue> {
        &output
            .derivatives()
            .iter()
            .find(|d| d.output == VAR_PRICE_PER_TONNE.name && d.input == input)
            .unwrap()
            .values
    }

    #[test]
    fn single_source_price() {
        let parameters = PriceParameters::default();
        let output = solve(parameters.clone(), vec![0.0, 10.0], vec![5.0, 0.0]).unwrap();
        let price = output.get(VAR_PRICE_PER_TONNE.name).unwrap().to_vec();

        assert_relative_eq!(
            price[0],
            (parameters.deforestation_unit_cost() + 7.6) * 1.1,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            price[1],
            (parameters.managed_wood_unit_cost() + 7.6) * 1.1,
            max_relative = 1e-12
        );
        let per_energy = output.get(VAR_PRICE_PER_MWH.name).unwrap().to_vec();
        assert_relative_eq!(per_energy[1], price[1] / 3.6, max_relative = 1e-12);
    }

    #[test]
    fn blend_derivative_matches_quotient_rule() {
        let parameters = PriceParameters::default();
        let (m, f) = (30.0, 10.0);
        let output = solve(parameters.clone(), vec![m], vec![f]).unwrap();
        let (u_m, u_f) = (
            parameters.managed_wood_unit_cost(),
            parameters.deforestation_unit_cost(),
        );
        let expected = 1.1 * f * (u_m - u_f) / (m + f).powi(2);
        assert_relative_eq!(
            derivative(&output, VAR_MANAGED_WOOD_MASS.name)[[0, 0]],
            expected,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            derivative(&output, VAR_DEFORESTATION_MASS.name)[[0, 0]],
            -expected * m / f,
            max_relative = 1e-12
        );
    }

    #[test]
    fn zero_mass_reuses_previous_price() {
        let output = solve(
            PriceParameters::default(),
            vec![10.0, 0.0, 0.0],
            vec![2.0, 0.0, 0.0],
        )
        .unwrap();
        let price = output.get(VAR_PRICE_PER_TONNE.name).unwrap().to_vec();
        assert_eq!(price[1], price[0]);
        assert_eq!(price[2], price[0]);

        let by_mass = derivative(&output, VAR_MANAGED_WOOD_MASS.name);
        assert_eq!(by_mass.row(2), by_mass.row(0));
        assert_eq!(by_mass[[2, 2]], 0.0);
    }

    #[test]
    fn zero_mass_in_first_year() {
        let result = solve(PriceParameters::default(), vec![0.0, 1.0], vec![0.0, 1.0]);
        assert!(matches!(
            result,
            Err(RSForestError::NumericDomainError { year: 2020, .. })
        ));

        let parameters = PriceParameters {
            default_price: Some(120.0),
            ..Default::default()
        };
        let output = solve(parameters, vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(output.get(VAR_PRICE_PER_TONNE.name).unwrap().at(2020), Some(120.0));
    }

    #[test]
    fn negative_mass() {
        let result = solve(PriceParameters::default(), vec![1.0, -1.0], vec![0.0, 0.0]);
        assert!(matches!(
            result,
            Err(RSForestError::NumericDomainError { year: 2021, .. })
        ));
    }
}
