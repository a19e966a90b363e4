//! Surface Evolution Component
//!
//! Turns the three land-use investments into forest surfaces under a finite-land
//! constraint.
//!
//! # What This Component Does
//!
//! 1. Converts each investment into a yearly surface with its cost per hectare,
//!    clipping negative investment to zero
//! 2. Accumulates reforested and managed-wood surfaces
//! 3. Accumulates deforestation up to the deforestable capacity, recording the
//!    year from which the stock has been saturated
//! 4. Splits the deforested surface between unmanaged forest and converted managed wood
//! 5. Sums the categories into the global forest surface
//!
//! # Inputs
//!
//! - `Investment|Deforestation` (G$)
//! - `Investment|Reforestation` (G$)
//! - `Investment|Managed Wood` (G$)
//!
//! # Outputs
//!
//! Every `Forest Surface|*` variable, all in Gha.
//!
//! # Saturation under the default policy
//!
//! Under `UnmanagedOnly` the capacity is the fixed unmanaged stock, so once it is
//! exhausted deforestation stops for good and further investment has no effect.
//! The default `UnmanagedThenManagedWood` policy adds the managed wood to the
//! capacity instead. Once the unmanaged forest is gone, saturated deforestation
//! clears every hectare of managed wood in the year it is planted, leaving no
//! managed wood standing. Each G$ invested in managed wood is then lost in full
//! as `Lost Capital|Managed Wood` while its surface adds to the cleared biomass.

use crate::parameters::{DeforestationPolicy, SurfaceParameters};
use crate::variables::*;
use log::{info, warn};
use ndarray::Array1;
use ndarray::Array2;
use rsforest_core::component::{Component, ComponentOutput, InputState, RequirementDefinition};
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::jacobian::operators;
use rsforest_core::timeseries::{FloatValue, Horizon, YearSeries};
use serde::{Deserialize, Serialize};

/// Clip negative investment to zero.
///
/// Returns the clipped values and the derivative of the clipping, which is one
/// where the investment is nonnegative (the right derivative at exactly zero) and
/// zero where it was clipped.
fn clip_investment(
    name: &str,
    series: &YearSeries,
) -> RSForestResult<(Array1<FloatValue>, Array1<FloatValue>)> {
    if let Some((year, value)) = series.iter().find(|(_, value)| !value.is_finite()) {
        return Err(RSForestError::NumericDomainError {
            series: name.to_string(),
            year,
            reason: format!("investment must be finite, got {}", value),
        });
    }

    let clipped = series.values().iter().filter(|value| **value < 0.0).count();
    if clipped > 0 {
        warn!(
            "{} is negative in {} of {} years, clipped to zero",
            name,
            clipped,
            series.len()
        );
    }

    Ok((
        series.values().mapv(|value| value.max(0.0)),
        series
            .values()
            .mapv(|value| if value >= 0.0 { 1.0 } else { 0.0 }),
    ))
}

/// Deforestation accumulated against a finite capacity.
///
/// With $q$ the requested surface and $C$ the capacity, the headroom is
/// $H_y = C_y - D_{y-1}$. A year is saturated when $q_y > H_y$ or $H_y \le 0$,
/// in which case the cumulative surface is pinned to the capacity.
/// Otherwise the full request is cleared.
///
/// The saturation boundary $s_y$, the last saturated year up to $y$, is recorded in
/// the same loop so that the derivatives follow the forward branches exactly:
///
/// $$ \frac{\partial D_y}{\partial q_k} = 1 \text{ for } s_y < k \le y, \qquad
///    \frac{\partial D_y}{\partial C_{s_y}} = 1 $$
#[derive(Debug, Clone, PartialEq)]
pub struct SaturatingAccumulation {
    pub cumulative: Array1<FloatValue>,
    pub delta: Array1<FloatValue>,
    pub boundary: Vec<Option<usize>>,
}

impl SaturatingAccumulation {
    pub fn solve(requested: &Array1<FloatValue>, capacity: &Array1<FloatValue>) -> Self {
        let n = requested.len();
        let mut cumulative = Array1::zeros(n);
        let mut delta = Array1::zeros(n);
        let mut boundary = Vec::with_capacity(n);

        let mut previous = 0.0;
        let mut last_saturated = None;
        for i in 0..n {
            let headroom = capacity[i] - previous;
            if requested[i] > headroom || headroom <= 0.0 {
                last_saturated = Some(i);
                cumulative[i] = capacity[i].max(previous);
            } else {
                cumulative[i] = previous + requested[i];
            }
            delta[i] = requested[i].min(headroom.max(0.0));
            boundary.push(last_saturated);
            previous = cumulative[i];
        }

        Self {
            cumulative,
            delta,
            boundary,
        }
    }

    /// First saturated year index, if any
    pub fn first_saturated(&self) -> Option<usize> {
        self.boundary.iter().flatten().next().copied()
    }

    /// $\partial D / \partial q$
    pub fn requested_derivative(&self) -> Array2<FloatValue> {
        let n = self.boundary.len();
        Array2::from_shape_fn((n, n), |(i, k)| {
            let after_boundary = self.boundary[i].map_or(true, |s| k > s);
            if k <= i && after_boundary {
                1.0
            } else {
                0.0
            }
        })
    }

    /// $\partial D / \partial C$
    pub fn capacity_derivative(&self) -> Array2<FloatValue> {
        let n = self.boundary.len();
        let mut values = Array2::zeros((n, n));
        for (i, boundary) in self.boundary.iter().enumerate() {
            if let Some(s) = boundary {
                values[[i, *s]] = 1.0;
            }
        }
        values
    }
}

/// Surface evolution of the forest land-use categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceEvolution {
    parameters: SurfaceParameters,
}

impl SurfaceEvolution {
    pub fn from_parameters(parameters: SurfaceParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &SurfaceParameters {
        &self.parameters
    }
}

impl Default for SurfaceEvolution {
    fn default() -> Self {
        Self::from_parameters(SurfaceParameters::default())
    }
}

#[typetag::serde]
impl Component for SurfaceEvolution {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        let mut definitions = vec![
            RequirementDefinition::input(&VAR_DEFORESTATION_INVESTMENT),
            RequirementDefinition::input(&VAR_REFORESTATION_INVESTMENT),
            RequirementDefinition::input(&VAR_MANAGED_WOOD_INVESTMENT),
        ];
        definitions.extend(
            [
                &VAR_DEFORESTATION_REQUESTED,
                &VAR_DEFORESTATION_CAPACITY,
                &VAR_DEFORESTATION_DELTA,
                &VAR_DEFORESTATION_CUMULATIVE,
                &VAR_REFORESTATION_DELTA,
                &VAR_REFORESTATION_CUMULATIVE,
                &VAR_MANAGED_WOOD_DELTA,
                &VAR_MANAGED_WOOD_CUMULATIVE,
                &VAR_MANAGED_WOOD_CONVERTED,
                &VAR_MANAGED_WOOD_STANDING,
                &VAR_UNMANAGED_FOREST,
                &VAR_REMAINING_UNMANAGED_FOREST,
                &VAR_PROTECTED_FOREST,
                &VAR_GLOBAL_FOREST_SURFACE,
                &VAR_GLOBAL_FOREST_DELTA,
                &VAR_FOREST_CONSTRAINT,
            ]
            .into_iter()
            .map(RequirementDefinition::output),
        );
        definitions
    }

    fn solve(&self, horizon: Horizon, input_state: &InputState) -> RSForestResult<ComponentOutput> {
        let p = &self.parameters;
        let n = horizon.len();
        let unmanaged = p.initial_unmanaged_forest;
        let protected = p.initial_protected_forest;

        let (deforestation, deforestation_mask) = clip_investment(
            VAR_DEFORESTATION_INVESTMENT.name,
            input_state.variable(&VAR_DEFORESTATION_INVESTMENT)?,
        )?;
        let (reforestation, reforestation_mask) = clip_investment(
            VAR_REFORESTATION_INVESTMENT.name,
            input_state.variable(&VAR_REFORESTATION_INVESTMENT)?,
        )?;
        let (managed_wood, managed_wood_mask) = clip_investment(
            VAR_MANAGED_WOOD_INVESTMENT.name,
            input_state.variable(&VAR_MANAGED_WOOD_INVESTMENT)?,
        )?;

        let running_sum = operators::running_sum(n);

        let requested = deforestation / p.deforestation_cost_per_ha;
        let reforestation_delta = reforestation / p.reforestation_cost_per_ha;
        let reforested = running_sum.dot(&reforestation_delta);
        let managed_wood_delta = managed_wood / p.managed_wood_cost_per_ha;
        let managed_wood_cumulative = running_sum.dot(&managed_wood_delta) + p.initial_managed_wood;

        let capacity = match p.deforestation_policy {
            DeforestationPolicy::UnmanagedOnly => Array1::from_elem(n, unmanaged),
            DeforestationPolicy::UnmanagedThenManagedWood => &managed_wood_cumulative + unmanaged,
        };

        let accumulation = SaturatingAccumulation::solve(&requested, &capacity);
        if let Some(first) = accumulation.first_saturated() {
            info!(
                "Deforestation saturates in {}, later deforestation investment has no effect",
                horizon.year_at(first)
            );
        }
        let deforested = accumulation.cumulative.clone();

        let converted = deforested.mapv(|d| (d - unmanaged).max(0.0));
        let converted_mask = deforested.mapv(|d| if d > unmanaged { 1.0 } else { 0.0 });
        let standing = &managed_wood_cumulative - &converted;
        // U0 - (D - O) written so that it is exactly zero once the stock is exhausted
        let remaining = deforested.mapv(|d| unmanaged - d.min(unmanaged));
        let global = &managed_wood_cumulative + &reforested - &deforested + (unmanaged + protected);
        let mut global_delta = Array1::zeros(n);
        let mut previous_global = unmanaged + protected + p.initial_managed_wood;
        for (i, value) in global.iter().enumerate() {
            global_delta[i] = value - previous_global;
            previous_global = *value;
        }
        let constraint = &reforested - &deforested;

        let series = |values: Array1<FloatValue>| YearSeries::new(horizon.year_start, values);
        let mut output = ComponentOutput::new();
        output.insert(&VAR_DEFORESTATION_REQUESTED, series(requested)?);
        output.insert(&VAR_DEFORESTATION_CAPACITY, series(capacity)?);
        output.insert(&VAR_DEFORESTATION_DELTA, series(accumulation.delta.clone())?);
        output.insert(&VAR_DEFORESTATION_CUMULATIVE, series(deforested)?);
        output.insert(&VAR_REFORESTATION_DELTA, series(reforestation_delta)?);
        output.insert(&VAR_REFORESTATION_CUMULATIVE, series(reforested)?);
        output.insert(&VAR_MANAGED_WOOD_DELTA, series(managed_wood_delta)?);
        output.insert(&VAR_MANAGED_WOOD_CUMULATIVE, series(managed_wood_cumulative)?);
        output.insert(&VAR_MANAGED_WOOD_CONVERTED, series(converted)?);
        output.insert(&VAR_MANAGED_WOOD_STANDING, series(standing)?);
        output.insert(&VAR_UNMANAGED_FOREST, YearSeries::constant(horizon, unmanaged));
        output.insert(&VAR_REMAINING_UNMANAGED_FOREST, series(remaining)?);
        output.insert(&VAR_PROTECTED_FOREST, YearSeries::constant(horizon, protected));
        output.insert(&VAR_GLOBAL_FOREST_SURFACE, series(global)?);
        output.insert(&VAR_GLOBAL_FOREST_DELTA, series(global_delta)?);
        output.insert(&VAR_FOREST_CONSTRAINT, series(constraint)?);

        let identity = operators::identity(n);
        let minus_identity = operators::scaled_identity(n, -1.0);

        // investments to yearly surfaces
        output.derivative(
            &VAR_DEFORESTATION_REQUESTED,
            &VAR_DEFORESTATION_INVESTMENT,
            operators::diagonal(&(deforestation_mask / p.deforestation_cost_per_ha)),
        );
        output.derivative(
            &VAR_REFORESTATION_DELTA,
            &VAR_REFORESTATION_INVESTMENT,
            operators::diagonal(&(reforestation_mask / p.reforestation_cost_per_ha)),
        );
        output.derivative(
            &VAR_MANAGED_WOOD_DELTA,
            &VAR_MANAGED_WOOD_INVESTMENT,
            operators::diagonal(&(managed_wood_mask / p.managed_wood_cost_per_ha)),
        );

        // stocks
        output.derivative(
            &VAR_REFORESTATION_CUMULATIVE,
            &VAR_REFORESTATION_DELTA,
            running_sum.clone(),
        );
        output.derivative(
            &VAR_MANAGED_WOOD_CUMULATIVE,
            &VAR_MANAGED_WOOD_DELTA,
            running_sum,
        );
        if p.deforestation_policy == DeforestationPolicy::UnmanagedThenManagedWood {
            output.derivative(
                &VAR_DEFORESTATION_CAPACITY,
                &VAR_MANAGED_WOOD_CUMULATIVE,
                identity.clone(),
            );
        }
        output.derivative(
            &VAR_DEFORESTATION_CUMULATIVE,
            &VAR_DEFORESTATION_REQUESTED,
            accumulation.requested_derivative(),
        );
        output.derivative(
            &VAR_DEFORESTATION_CUMULATIVE,
            &VAR_DEFORESTATION_CAPACITY,
            accumulation.capacity_derivative(),
        );
        output.derivative(
            &VAR_DEFORESTATION_DELTA,
            &VAR_DEFORESTATION_CUMULATIVE,
            operators::difference(n),
        );

        // split of the deforested surface
        output.derivative(
            &VAR_MANAGED_WOOD_CONVERTED,
            &VAR_DEFORESTATION_CUMULATIVE,
            operators::diagonal(&converted_mask),
        );
        output.derivative(
            &VAR_MANAGED_WOOD_STANDING,
            &VAR_MANAGED_WOOD_CUMULATIVE,
            identity.clone(),
        );
        output.derivative(
            &VAR_MANAGED_WOOD_STANDING,
            &VAR_MANAGED_WOOD_CONVERTED,
            minus_identity.clone(),
        );
        output.derivative(
            &VAR_REMAINING_UNMANAGED_FOREST,
            &VAR_DEFORESTATION_CUMULATIVE,
            minus_identity.clone(),
        );
        output.derivative(
            &VAR_REMAINING_UNMANAGED_FOREST,
            &VAR_MANAGED_WOOD_CONVERTED,
            identity.clone(),
        );

        // aggregates
        output.derivative(
            &VAR_GLOBAL_FOREST_SURFACE,
            &VAR_MANAGED_WOOD_CUMULATIVE,
            identity.clone(),
        );
        output.derivative(
            &VAR_GLOBAL_FOREST_SURFACE,
            &VAR_REFORESTATION_CUMULATIVE,
            identity.clone(),
        );
        output.derivative(
            &VAR_GLOBAL_FOREST_SURFACE,
            &VAR_DEFORESTATION_CUMULATIVE,
            minus_identity.clone(),
        );
        output.derivative(
            &VAR_GLOBAL_FOREST_DELTA,
            &VAR_GLOBAL_FOREST_SURFACE,
            operators::difference(n),
        );
        output.derivative(&VAR_FOREST_CONSTRAINT, &VAR_REFORESTATION_CUMULATIVE, identity);
        output.derivative(
            &VAR_FOREST_CONSTRAINT,
            &VAR_DEFORESTATION_CUMULATIVE,
            minus_identity,
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rsforest_core::timeseries_collection::{TimeseriesCollection, VariableType};

    fn solve(
        parameters: SurfaceParameters,
        horizon: Horizon,
        deforestation: Vec<FloatValue>,
        reforestation: Vec<FloatValue>,
        managed_wood: Vec<FloatValue>,
    ) -> ComponentOutput {
        let mut collection = TimeseriesCollection::new();
        for (variable, values) in [
            (&VAR_DEFORESTATION_INVESTMENT, deforestation),
            (&VAR_REFORESTATION_INVESTMENT, reforestation),
            (&VAR_MANAGED_WOOD_INVESTMENT, managed_wood),
        ] {
            collection
                .add_timeseries(
                    variable.name,
                    YearSeries::from_vec(horizon.year_start, values).unwrap(),
                    VariableType::Decision,
                )
                .unwrap();
        }
        let state = InputState::build(horizon, collection.iter().collect());
        SurfaceEvolution::from_parameters(parameters)
            .solve(horizon, &state)
            .unwrap()
    }

    fn values(output: &ComponentOutput, name: &str) -> Vec<FloatValue> {
        output.get(name).unwrap().to_vec()
    }

    #[test]
    fn accumulation_below_capacity() {
        let accumulation =
            SaturatingAccumulation::solve(&array![1.0, 1.0, 1.0], &array![10.0, 10.0, 10.0]);
        assert_eq!(accumulation.cumulative, array![1.0, 2.0, 3.0]);
        assert_eq!(accumulation.boundary, vec![None, None, None]);
        assert_eq!(
            accumulation.requested_derivative(),
            operators::running_sum(3)
        );
        assert!(accumulation.capacity_derivative().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn accumulation_saturates() {
        let accumulation = SaturatingAccumulation::solve(
            &array![1.0, 1.0, 1.0, 1.0],
            &array![2.5, 2.5, 2.5, 2.5],
        );
        assert_eq!(accumulation.cumulative, array![1.0, 2.0, 2.5, 2.5]);
        assert_eq!(accumulation.delta, array![1.0, 1.0, 0.5, 0.0]);
        assert_eq!(accumulation.boundary, vec![None, None, Some(2), Some(3)]);
        assert_eq!(accumulation.first_saturated(), Some(2));

        let by_request = accumulation.requested_derivative();
        assert_eq!(by_request.row(1).to_vec(), vec![1.0, 1.0, 0.0, 0.0]);
        assert!(by_request.row(2).iter().all(|v| *v == 0.0));
        assert!(by_request.row(3).iter().all(|v| *v == 0.0));

        let by_capacity = accumulation.capacity_derivative();
        assert_eq!(by_capacity[[2, 2]], 1.0);
        assert_eq!(by_capacity[[3, 3]], 1.0);
        assert_eq!(by_capacity.sum(), 2.0);
    }

    #[test]
    fn accumulation_recovers_when_capacity_grows() {
        let accumulation =
            SaturatingAccumulation::solve(&array![2.0, 1.0, 1.0], &array![1.0, 5.0, 5.0]);
        assert_eq!(accumulation.cumulative, array![1.0, 2.0, 3.0]);
        assert_eq!(accumulation.boundary, vec![Some(0), Some(0), Some(0)]);
        // D(2) = C(0) + q(1) + q(2)
        assert_eq!(
            accumulation.requested_derivative().row(2).to_vec(),
            vec![0.0, 1.0, 1.0]
        );
        assert_eq!(accumulation.capacity_derivative()[[2, 0]], 1.0);
    }

    #[test]
    fn linear_deforestation() {
        let horizon = Horizon::new(2020, 2030).unwrap();
        let parameters = SurfaceParameters {
            initial_unmanaged_forest: 1.0,
            deforestation_policy: DeforestationPolicy::UnmanagedOnly,
            ..Default::default()
        };
        let output = solve(parameters, horizon, vec![10.0; 11], vec![0.0; 11], vec![0.0; 11]);

        let deforested = values(&output, VAR_DEFORESTATION_CUMULATIVE.name);
        assert_relative_eq!(deforested[0], 10.0 / 8000.0);
        for (i, value) in deforested.iter().enumerate() {
            assert_relative_eq!(*value, (i + 1) as f64 * 10.0 / 8000.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn global_surface_is_sum_of_categories() {
        let horizon = Horizon::new(2020, 2024).unwrap();
        let output = solve(
            SurfaceParameters::default(),
            horizon,
            vec![5.0, 1.0, 0.0, 3.0, 2.0],
            vec![1.0, 2.0, 3.0, 0.0, 0.0],
            vec![0.5, 0.5, 0.5, 0.5, 0.5],
        );

        let global = values(&output, VAR_GLOBAL_FOREST_SURFACE.name);
        let unmanaged = values(&output, VAR_UNMANAGED_FOREST.name);
        let protected = values(&output, VAR_PROTECTED_FOREST.name);
        let managed = values(&output, VAR_MANAGED_WOOD_CUMULATIVE.name);
        let reforested = values(&output, VAR_REFORESTATION_CUMULATIVE.name);
        let deforested = values(&output, VAR_DEFORESTATION_CUMULATIVE.name);
        for i in 0..5 {
            assert_relative_eq!(
                global[i],
                unmanaged[i] + protected[i] + managed[i] + reforested[i] - deforested[i],
                max_relative = 1e-12
            );
        }

        let delta = values(&output, VAR_GLOBAL_FOREST_DELTA.name);
        assert_relative_eq!(global[0] - delta[0], 1.91 + 0.84 + 1.15, max_relative = 1e-12);
    }

    #[test]
    fn negative_investment_is_clipped() {
        let horizon = Horizon::new(2020, 2022).unwrap();
        let output = solve(
            SurfaceParameters::default(),
            horizon,
            vec![-8.0, 8.0, 0.0],
            vec![0.0; 3],
            vec![0.0; 3],
        );
        assert_eq!(
            values(&output, VAR_DEFORESTATION_REQUESTED.name),
            vec![0.0, 1e-3, 0.0]
        );

        let derivative = output
            .derivatives()
            .iter()
            .find(|d| d.input == VAR_DEFORESTATION_INVESTMENT.name)
            .unwrap();
        assert_eq!(derivative.values[[0, 0]], 0.0);
        assert_eq!(derivative.values[[1, 1]], 1.0 / 8000.0);
        // right derivative at exactly zero
        assert_eq!(derivative.values[[2, 2]], 1.0 / 8000.0);
    }

    #[test]
    fn non_finite_investment() {
        let horizon = Horizon::new(2020, 2021).unwrap();
        let mut collection = TimeseriesCollection::new();
        for (variable, values) in [
            (&VAR_DEFORESTATION_INVESTMENT, vec![1.0, FloatValue::NAN]),
            (&VAR_REFORESTATION_INVESTMENT, vec![0.0; 2]),
            (&VAR_MANAGED_WOOD_INVESTMENT, vec![0.0; 2]),
        ] {
            collection
                .add_timeseries(
                    variable.name,
                    YearSeries::from_vec(2020, values).unwrap(),
                    VariableType::Decision,
                )
                .unwrap();
        }
        let state = InputState::build(horizon, collection.iter().collect());
        let result = SurfaceEvolution::default().solve(horizon, &state);
        assert!(matches!(
            result,
            Err(RSForestError::NumericDomainError { year: 2021, .. })
        ));
    }

    #[test]
    fn deforestation_converts_managed_wood() {
        let horizon = Horizon::new(2020, 2022).unwrap();
        let parameters = SurfaceParameters {
            initial_unmanaged_forest: 0.001,
            initial_managed_wood: 0.001,
            ..Default::default()
        };
        // 0.0015 Gha requested in 2020 and 2021
        let output = solve(parameters, horizon, vec![12.0, 12.0, 0.0], vec![0.0; 3], vec![0.0; 3]);

        let deforested = values(&output, VAR_DEFORESTATION_CUMULATIVE.name);
        assert_relative_eq!(deforested[0], 0.0015);
        assert_relative_eq!(deforested[1], 0.002);
        let converted = values(&output, VAR_MANAGED_WOOD_CONVERTED.name);
        assert_relative_eq!(converted[0], 0.0005, max_relative = 1e-9);
        assert_relative_eq!(converted[1], 0.001, max_relative = 1e-9);
        let standing = values(&output, VAR_MANAGED_WOOD_STANDING.name);
        assert_relative_eq!(standing[2], 0.0, epsilon = 1e-15);
        let remaining = values(&output, VAR_REMAINING_UNMANAGED_FOREST.name);
        assert!(remaining.iter().all(|v| *v >= 0.0));
        assert_relative_eq!(remaining[2], 0.0, epsilon = 1e-15);
    }
}
