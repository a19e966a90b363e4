//! The forest model facade.
//!
//! [`ForestModel`] wires the five forest components into a core
//! [`Model`](rsforest_core::model::Model) with the three investments as decision
//! variables and the market schedules as exogenous series.
//! Each evaluation returns a [`ForestRun`] holding every series and the
//! sensitivity graph used to compute Jacobians.

use crate::components::{
    BiomassPrice, BiomassProduction, CarbonBalance, LostCapital, SurfaceEvolution,
};
use crate::parameters::ForestParameters;
use crate::variables::*;
use log::debug;
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::interpolate::{
    ControlPointInterpolator, ControlVector, InterpolationMap, PoleJacobian,
};
use rsforest_core::jacobian::Jacobian;
use rsforest_core::model::{Model, ModelBuilder, ModelRun};
use rsforest_core::timeseries::{Horizon, YearSeries};
use rsforest_core::timeseries_collection::{TimeseriesCollection, VariableType};
use rsforest_core::variable::StaticVariableDefinition;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Yearly investments in G$.
#[derive(Debug, Clone, PartialEq)]
pub struct Investments {
    pub deforestation: YearSeries,
    pub reforestation: YearSeries,
    pub managed_wood: YearSeries,
}

impl Investments {
    fn to_collection(&self) -> RSForestResult<TimeseriesCollection> {
        let mut collection = TimeseriesCollection::new();
        for (variable, series) in [
            (&VAR_DEFORESTATION_INVESTMENT, &self.deforestation),
            (&VAR_REFORESTATION_INVESTMENT, &self.reforestation),
            (&VAR_MANAGED_WOOD_INVESTMENT, &self.managed_wood),
        ] {
            collection.add_timeseries(variable.name, series.clone(), VariableType::Decision)?;
        }
        Ok(collection)
    }
}

/// Investments given as control points.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlInvestments {
    pub deforestation: ControlVector,
    pub reforestation: ControlVector,
    pub managed_wood: ControlVector,
}

#[derive(Debug)]
pub struct ForestModel {
    parameters: ForestParameters,
    model: Model,
}

impl ForestModel {
    pub fn from_parameters(parameters: ForestParameters) -> RSForestResult<Self> {
        parameters.validate()?;
        let horizon = parameters.horizon()?;

        let model = ModelBuilder::new()
            .with_horizon(horizon)
            .with_component(Arc::new(SurfaceEvolution::from_parameters(
                parameters.surface_parameters(),
            )))
            .with_component(Arc::new(CarbonBalance::from_parameters(
                parameters.carbon_parameters(),
            )))
            .with_component(Arc::new(BiomassProduction::from_parameters(
                parameters.biomass_parameters(),
            )))
            .with_component(Arc::new(BiomassPrice::from_parameters(
                parameters.price_parameters(),
            )))
            .with_component(Arc::new(LostCapital::from_parameters(
                parameters.lost_capital_parameters(),
            )))
            .with_exogenous_variable(
                VAR_TRANSPORT_COST.name,
                parameters
                    .market
                    .transport
                    .to_series(VAR_TRANSPORT_COST.name, horizon)?,
            )
            .with_exogenous_variable(
                VAR_MARGIN.name,
                parameters.market.margin.to_series(VAR_MARGIN.name, horizon)?,
            )
            .with_decision_variable(&VAR_DEFORESTATION_INVESTMENT)
            .with_decision_variable(&VAR_REFORESTATION_INVESTMENT)
            .with_decision_variable(&VAR_MANAGED_WOOD_INVESTMENT)
            .build()?;

        debug!(
            "Built forest model over {}-{}",
            horizon.year_start, horizon.year_end
        );
        Ok(Self { parameters, model })
    }

    pub fn from_toml(document: &str) -> RSForestResult<Self> {
        Self::from_parameters(ForestParameters::from_toml(document)?)
    }

    pub fn parameters(&self) -> &ForestParameters {
        &self.parameters
    }

    pub fn horizon(&self) -> Horizon {
        self.model.horizon()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Evaluate the forest with yearly investments
    pub fn evaluate(&self, investments: &Investments) -> RSForestResult<ForestRun> {
        Ok(ForestRun {
            run: self.model.run(&investments.to_collection()?)?,
            map: None,
        })
    }

    /// Evaluate the forest with investments expanded from control points.
    ///
    /// The returned run can also report Jacobians with respect to the poles.
    pub fn evaluate_controls(
        &self,
        controls: &ControlInvestments,
        interpolator: &ControlPointInterpolator,
    ) -> RSForestResult<ForestRun> {
        if interpolator.map().horizon() != self.horizon() {
            return Err(RSForestError::ConfigurationError(format!(
                "Interpolator horizon {:?} does not match model horizon {:?}",
                interpolator.map().horizon(),
                self.horizon()
            )));
        }
        let (deforestation, map) = interpolator.expand(&controls.deforestation)?;
        let (reforestation, _) = interpolator.expand(&controls.reforestation)?;
        let (managed_wood, _) = interpolator.expand(&controls.managed_wood)?;
        let investments = Investments {
            deforestation,
            reforestation,
            managed_wood,
        };
        Ok(ForestRun {
            run: self.model.run(&investments.to_collection()?)?,
            map: Some(map.clone()),
        })
    }
}

fn extract(run: &ModelRun, variable: &StaticVariableDefinition) -> RSForestResult<YearSeries> {
    run.series(variable.name).cloned()
}

/// Forest surfaces in Gha.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub deforestation_requested: YearSeries,
    pub deforestation_capacity: YearSeries,
    pub deforested_delta: YearSeries,
    pub deforested_cumulative: YearSeries,
    pub reforested_delta: YearSeries,
    pub reforested_cumulative: YearSeries,
    pub managed_wood_delta: YearSeries,
    pub managed_wood_cumulative: YearSeries,
    pub managed_wood_converted: YearSeries,
    pub managed_wood_standing: YearSeries,
    pub unmanaged_forest: YearSeries,
    pub remaining_unmanaged_forest: YearSeries,
    pub protected_forest: YearSeries,
    pub global_forest_surface: YearSeries,
    pub global_forest_delta: YearSeries,
    pub forest_constraint_evolution: YearSeries,
}

/// Forest CO2 flows in GtCO2.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonState {
    pub emitted: YearSeries,
    pub absorbed: YearSeries,
    pub net: YearSeries,
    pub cumulative: YearSeries,
}

/// Biomass flows in Mt, energy in TWh.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomassState {
    pub productive_surface: YearSeries,
    pub managed_wood: YearSeries,
    pub deforestation: YearSeries,
    pub total: YearSeries,
    pub wood: YearSeries,
    pub residue: YearSeries,
    pub energy: YearSeries,
    pub industry: YearSeries,
    pub energy_production: YearSeries,
    pub co2_consumption: YearSeries,
    pub co2_intensity: YearSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceState {
    pub managed_wood: YearSeries,
    pub deforestation: YearSeries,
    pub per_tonne: YearSeries,
    pub per_mwh: YearSeries,
}

/// Lost capital in G$.
#[derive(Debug, Clone, PartialEq)]
pub struct LostCapitalState {
    pub deforestation: YearSeries,
    pub managed_wood: YearSeries,
    pub reforestation: YearSeries,
    pub total: YearSeries,
}

/// Results of one evaluation of a [`ForestModel`].
#[derive(Debug, Clone)]
pub struct ForestRun {
    run: ModelRun,
    map: Option<InterpolationMap>,
}

impl ForestRun {
    pub fn horizon(&self) -> Horizon {
        self.run.horizon()
    }

    pub fn model_run(&self) -> &ModelRun {
        &self.run
    }

    /// Interpolation map of the controls, for runs created from control points
    pub fn interpolation_map(&self) -> Option<&InterpolationMap> {
        self.map.as_ref()
    }

    pub fn series(&self, name: &str) -> RSForestResult<&YearSeries> {
        self.run.series(name)
    }

    /// Names of every series of the run
    pub fn names(&self) -> Vec<&str> {
        self.run.timeseries().names().collect()
    }

    pub fn surface(&self) -> RSForestResult<SurfaceState> {
        let run = &self.run;
        Ok(SurfaceState {
            deforestation_requested: extract(run, &VAR_DEFORESTATION_REQUESTED)?,
            deforestation_capacity: extract(run, &VAR_DEFORESTATION_CAPACITY)?,
            deforested_delta: extract(run, &VAR_DEFORESTATION_DELTA)?,
            deforested_cumulative: extract(run, &VAR_DEFORESTATION_CUMULATIVE)?,
            reforested_delta: extract(run, &VAR_REFORESTATION_DELTA)?,
            reforested_cumulative: extract(run, &VAR_REFORESTATION_CUMULATIVE)?,
            managed_wood_delta: extract(run, &VAR_MANAGED_WOOD_DELTA)?,
            managed_wood_cumulative: extract(run, &VAR_MANAGED_WOOD_CUMULATIVE)?,
            managed_wood_converted: extract(run, &VAR_MANAGED_WOOD_CONVERTED)?,
            managed_wood_standing: extract(run, &VAR_MANAGED_WOOD_STANDING)?,
            unmanaged_forest: extract(run, &VAR_UNMANAGED_FOREST)?,
            remaining_unmanaged_forest: extract(run, &VAR_REMAINING_UNMANAGED_FOREST)?,
            protected_forest: extract(run, &VAR_PROTECTED_FOREST)?,
            global_forest_surface: extract(run, &VAR_GLOBAL_FOREST_SURFACE)?,
            global_forest_delta: extract(run, &VAR_GLOBAL_FOREST_DELTA)?,
            forest_constraint_evolution: extract(run, &VAR_FOREST_CONSTRAINT)?,
        })
    }

    pub fn carbon(&self) -> RSForestResult<CarbonState> {
        let run = &self.run;
        Ok(CarbonState {
            emitted: extract(run, &VAR_CO2_EMITTED)?,
            absorbed: extract(run, &VAR_CO2_ABSORBED)?,
            net: extract(run, &VAR_CO2_NET)?,
            cumulative: extract(run, &VAR_CO2_CUMULATIVE)?,
        })
    }

    pub fn biomass(&self) -> RSForestResult<BiomassState> {
        let run = &self.run;
        Ok(BiomassState {
            productive_surface: extract(run, &VAR_PRODUCTIVE_SURFACE)?,
            managed_wood: extract(run, &VAR_MANAGED_WOOD_MASS)?,
            deforestation: extract(run, &VAR_DEFORESTATION_MASS)?,
            total: extract(run, &VAR_TOTAL_MASS)?,
            wood: extract(run, &VAR_WOOD_MASS)?,
            residue: extract(run, &VAR_RESIDUE_MASS)?,
            energy: extract(run, &VAR_ENERGY_MASS)?,
            industry: extract(run, &VAR_INDUSTRY_MASS)?,
            energy_production: extract(run, &VAR_ENERGY_PRODUCTION)?,
            co2_consumption: extract(run, &VAR_CO2_CONSUMPTION)?,
            co2_intensity: extract(run, &VAR_CO2_INTENSITY)?,
        })
    }

    pub fn price(&self) -> RSForestResult<PriceState> {
        let run = &self.run;
        Ok(PriceState {
            managed_wood: extract(run, &VAR_MANAGED_WOOD_PRICE)?,
            deforestation: extract(run, &VAR_DEFORESTATION_PRICE)?,
            per_tonne: extract(run, &VAR_PRICE_PER_TONNE)?,
            per_mwh: extract(run, &VAR_PRICE_PER_MWH)?,
        })
    }

    pub fn lost_capital(&self) -> RSForestResult<LostCapitalState> {
        let run = &self.run;
        Ok(LostCapitalState {
            deforestation: extract(run, &VAR_LOST_CAPITAL_DEFORESTATION)?,
            managed_wood: extract(run, &VAR_LOST_CAPITAL_MANAGED_WOOD)?,
            reforestation: extract(run, &VAR_LOST_CAPITAL_REFORESTATION)?,
            total: extract(run, &VAR_LOST_CAPITAL_TOTAL)?,
        })
    }

    /// Total derivative of `output` with respect to `input`, indexed by year
    pub fn jacobian(&self, output: &str, input: &str) -> RSForestResult<Jacobian> {
        self.run.jacobian(output, input)
    }

    pub fn jacobians_for_input(&self, input: &str) -> RSForestResult<BTreeMap<String, Jacobian>> {
        self.run.jacobians_for_input(input)
    }

    /// Total derivative of `output` with respect to the poles of `input`
    pub fn pole_jacobian(&self, output: &str, input: &str) -> RSForestResult<PoleJacobian> {
        let map = self.map.as_ref().ok_or_else(|| {
            RSForestError::ConfigurationError(
                "Pole Jacobians are only available for runs evaluated from control points"
                    .to_string(),
            )
        })?;
        self.run.pole_jacobian(output, input, map)
    }
}
