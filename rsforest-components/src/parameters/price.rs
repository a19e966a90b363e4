//! Cost and price parameters

use super::biomass::ProductionParameters;
use super::schedule::Schedule;
use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Market assumptions used to turn production costs into a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParameters {
    /// Weighted average cost of capital used to annualise planting costs.
    ///
    /// Default: 0.07
    pub wacc: FloatValue,

    /// Yearly operating cost as a share of the planting cost.
    ///
    /// Default: 0.045
    pub opex_share: FloatValue,

    /// Cost of transporting one tonne of biomass ($/t).
    ///
    /// Default: 7.6 $/t
    pub transport: Schedule,

    /// Price as a percentage of the cost including transport.
    ///
    /// Default: 110 %
    pub margin: Schedule,

    /// Price used when the first simulated year produces no biomass ($/t).
    ///
    /// Default: none, which makes such a year an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_price: Option<FloatValue>,
}

impl Default for MarketParameters {
    fn default() -> Self {
        Self {
            wacc: 0.07,
            opex_share: 0.045,
            transport: Schedule::Constant(7.6),
            margin: Schedule::Constant(110.0),
            default_price: None,
        }
    }
}

impl MarketParameters {
    pub fn validate(&self) -> RSForestResult<()> {
        if !(self.wacc.is_finite() && self.wacc >= 0.0) {
            return Err(RSForestError::ConfigurationError(format!(
                "wacc must not be negative, got {}",
                self.wacc
            )));
        }
        if !(self.opex_share.is_finite() && self.opex_share >= 0.0) {
            return Err(RSForestError::ConfigurationError(format!(
                "opex_share must not be negative, got {}",
                self.opex_share
            )));
        }
        if self.transport.min() < 0.0 {
            return Err(RSForestError::ConfigurationError(
                "transport must not be negative".to_string(),
            ));
        }
        if self.margin.min() <= 0.0 {
            return Err(RSForestError::ConfigurationError(
                "margin must be positive".to_string(),
            ));
        }
        if let Some(price) = self.default_price {
            if !(price.is_finite() && price > 0.0) {
                return Err(RSForestError::ConfigurationError(format!(
                    "default_price must be positive, got {}",
                    price
                )));
            }
        }
        Ok(())
    }
}

/// Capital recovery factor
///
/// $$ crf = \frac{r (1 + r)^n}{(1 + r)^n - 1} $$
///
/// which reduces to $1 / n$ without discounting.
pub fn capital_recovery_factor(rate: FloatValue, lifetime: FloatValue) -> FloatValue {
    if rate == 0.0 {
        return 1.0 / lifetime;
    }
    let growth = (1.0 + rate).powf(lifetime);
    rate * growth / (growth - 1.0)
}

/// Everything the price component needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceParameters {
    /// Default: 13047 $/ha
    pub managed_wood_cost_per_ha: FloatValue,
    /// Default: 8000 $/ha
    pub deforestation_cost_per_ha: FloatValue,
    /// Default: 0.07
    pub wacc: FloatValue,
    /// Default: 0.045
    pub opex_share: FloatValue,
    /// Amortisation period of managed wood (years)
    pub lifetime: FloatValue,
    /// Biomass obtained by clearing one hectare (kg/ha)
    pub mass_per_ha: FloatValue,
    /// Biomass harvested per hectare of productive managed wood and per year (kg/ha)
    pub managed_wood_yield: FloatValue,
    /// Default: 3.6 kWh/kg
    pub calorific_value: FloatValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_price: Option<FloatValue>,
}

impl Default for PriceParameters {
    fn default() -> Self {
        let production = ProductionParameters::default();
        let market = MarketParameters::default();
        Self {
            managed_wood_cost_per_ha: 13047.0,
            deforestation_cost_per_ha: 8000.0,
            wacc: market.wacc,
            opex_share: market.opex_share,
            lifetime: production.years_between_harvest,
            mass_per_ha: production.mass_per_ha(),
            managed_wood_yield: production.managed_wood_yield(),
            calorific_value: production.calorific_value,
            default_price: market.default_price,
        }
    }
}

impl PriceParameters {
    /// Cost of one tonne of managed-wood biomass ($/t)
    pub fn managed_wood_unit_cost(&self) -> FloatValue {
        let yearly_cost = self.managed_wood_cost_per_ha
            * (capital_recovery_factor(self.wacc, self.lifetime) + self.opex_share);
        yearly_cost / (self.managed_wood_yield / 1e3)
    }

    /// Cost of one tonne of biomass from cleared forest ($/t)
    pub fn deforestation_unit_cost(&self) -> FloatValue {
        self.deforestation_cost_per_ha / (self.mass_per_ha / 1e3)
    }

    pub fn validate(&self) -> RSForestResult<()> {
        for (name, value) in [
            ("managed_wood_cost_per_ha", self.managed_wood_cost_per_ha),
            ("deforestation_cost_per_ha", self.deforestation_cost_per_ha),
            ("lifetime", self.lifetime),
            ("mass_per_ha", self.mass_per_ha),
            ("managed_wood_yield", self.managed_wood_yield),
            ("calorific_value", self.calorific_value),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RSForestError::ConfigurationError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
