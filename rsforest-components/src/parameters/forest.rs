//! Configuration of the whole forest module.

use super::biomass::{BiomassParameters, ProductionParameters};
use super::carbon::CarbonParameters;
use super::lost_capital::LostCapitalParameters;
use super::price::{MarketParameters, PriceParameters};
use super::surface::SurfaceParameters;
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::timeseries::{Horizon, Year};
use serde::{Deserialize, Serialize};

/// Every constant of the forest module, grouped by concern.
///
/// Constants shared by several components (costs per hectare, initial managed wood,
/// production yields) are defined once here and copied into each component's own
/// parameter struct by the `*_parameters` methods.
///
/// ```toml
/// year_start = 2020
/// year_end = 2050
///
/// [surface]
/// deforestation_cost_per_ha = 8000.0
/// deforestation_policy = "unmanaged_only"
///
/// [market]
/// margin = [[2020, 110.0], [2021, 112.0], ...]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParameters {
    /// Default: 2020
    pub year_start: Year,
    /// Default: 2100
    pub year_end: Year,
    pub surface: SurfaceParameters,
    pub carbon: CarbonParameters,
    pub production: ProductionParameters,
    pub market: MarketParameters,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            year_start: 2020,
            year_end: 2100,
            surface: SurfaceParameters::default(),
            carbon: CarbonParameters::default(),
            production: ProductionParameters::default(),
            market: MarketParameters::default(),
        }
    }
}

impl ForestParameters {
    /// Parse and validate a TOML document.
    ///
    /// Missing entries take their default value.
    pub fn from_toml(document: &str) -> RSForestResult<Self> {
        let parameters: Self = toml::from_str(document)
            .map_err(|e| RSForestError::ConfigurationError(e.to_string()))?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn to_toml(&self) -> RSForestResult<String> {
        toml::to_string(self).map_err(|e| RSForestError::ConfigurationError(e.to_string()))
    }

    pub fn horizon(&self) -> RSForestResult<Horizon> {
        Horizon::new(self.year_start, self.year_end)
    }

    pub fn validate(&self) -> RSForestResult<()> {
        self.horizon()?;
        self.surface.validate()?;
        self.carbon.validate()?;
        self.market.validate()?;
        self.biomass_parameters().validate()?;
        self.price_parameters().validate()?;
        self.lost_capital_parameters().validate()?;
        self.market.transport.to_series("market.transport", self.horizon()?)?;
        self.market.margin.to_series("market.margin", self.horizon()?)?;
        Ok(())
    }

    pub fn surface_parameters(&self) -> SurfaceParameters {
        self.surface.clone()
    }

    pub fn carbon_parameters(&self) -> CarbonParameters {
        self.carbon.clone()
    }

    pub fn biomass_parameters(&self) -> BiomassParameters {
        BiomassParameters {
            production: self.production.clone(),
            managed_wood_cost_per_ha: self.surface.managed_wood_cost_per_ha,
            initial_managed_wood: self.surface.initial_managed_wood,
        }
    }

    pub fn price_parameters(&self) -> PriceParameters {
        PriceParameters {
            managed_wood_cost_per_ha: self.surface.managed_wood_cost_per_ha,
            deforestation_cost_per_ha: self.surface.deforestation_cost_per_ha,
            wacc: self.market.wacc,
            opex_share: self.market.opex_share,
            lifetime: self.production.years_between_harvest,
            mass_per_ha: self.production.mass_per_ha(),
            managed_wood_yield: self.production.managed_wood_yield(),
            calorific_value: self.production.calorific_value,
            default_price: self.market.default_price,
        }
    }

    pub fn lost_capital_parameters(&self) -> LostCapitalParameters {
        LostCapitalParameters {
            deforestation_cost_per_ha: self.surface.deforestation_cost_per_ha,
            managed_wood_cost_per_ha: self.surface.managed_wood_cost_per_ha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{DeforestationPolicy, Schedule};

    #[test]
    fn defaults_are_valid() {
        assert!(ForestParameters::default().validate().is_ok());
    }

    #[test]
    fn derived_parameters_share_constants() {
        let mut parameters = ForestParameters::default();
        parameters.surface.managed_wood_cost_per_ha = 10000.0;

        assert_eq!(parameters.biomass_parameters().managed_wood_cost_per_ha, 10000.0);
        assert_eq!(parameters.price_parameters().managed_wood_cost_per_ha, 10000.0);
        assert_eq!(
            parameters.lost_capital_parameters().managed_wood_cost_per_ha,
            10000.0
        );
        assert_eq!(PriceParameters::default(), ForestParameters::default().price_parameters());
    }

    #[test]
    fn partial_toml() {
        let parameters = ForestParameters::from_toml(
            r#"
year_start = 2020
year_end = 2030

[surface]
initial_unmanaged_forest = 1.0
deforestation_policy = "unmanaged_only"

[market]
transport = 8.0
default_price = 150.0
"#,
        )
        .unwrap();

        assert_eq!(parameters.year_end, 2030);
        assert_eq!(parameters.surface.initial_unmanaged_forest, 1.0);
        assert_eq!(
            parameters.surface.deforestation_policy,
            DeforestationPolicy::UnmanagedOnly
        );
        // untouched entries keep their defaults
        assert_eq!(parameters.surface.deforestation_cost_per_ha, 8000.0);
        assert_eq!(parameters.market.transport, Schedule::Constant(8.0));
        assert_eq!(parameters.market.default_price, Some(150.0));
        assert_eq!(parameters.production.construction_delay, 3);
    }

    #[test]
    fn invalid_toml() {
        let result = ForestParameters::from_toml("year_start = 2030\nyear_end = 2020\n");
        assert!(matches!(result, Err(RSForestError::ConfigurationError(_))));

        let result = ForestParameters::from_toml("[production]\nconstruction_delay = 2\n");
        assert!(matches!(result, Err(RSForestError::ConfigurationError(_))));

        let result = ForestParameters::from_toml("[market]\nmargin = [[2020, 110.0]]\n");
        assert!(matches!(result, Err(RSForestError::HorizonMismatch { .. })));
    }

    #[test]
    fn toml_round_trip() {
        let mut parameters = ForestParameters::default();
        parameters.year_end = 2022;
        parameters.market.margin =
            Schedule::Yearly(vec![(2020, 110.0), (2021, 115.0), (2022, 120.0)]);
        parameters.market.default_price = Some(100.0);

        let document = parameters.to_toml().unwrap();
        assert_eq!(ForestParameters::from_toml(&document).unwrap(), parameters);
    }

    #[test]
    fn json_round_trip() {
        let parameters = ForestParameters::default();
        let serialised = serde_json::to_string(&parameters).unwrap();
        let restored: ForestParameters = serde_json::from_str(&serialised).unwrap();
        assert_eq!(restored, parameters);
    }
}
