use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the forest carbon balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonParameters {
    /// CO2 stored per hectare of forest, released on clearing and captured on reforesting.
    ///
    /// Default: 4000 kgCO2/ha
    pub co2_per_ha: FloatValue,

    /// Cumulative balance before the first simulated year.
    ///
    /// Default: 3.21 GtCO2
    pub initial_co2_debt: FloatValue,
}

impl Default for CarbonParameters {
    fn default() -> Self {
        Self {
            co2_per_ha: 4000.0,
            initial_co2_debt: 3.21,
        }
    }
}

impl CarbonParameters {
    pub fn validate(&self) -> RSForestResult<()> {
        if !(self.co2_per_ha.is_finite() && self.co2_per_ha >= 0.0) {
            return Err(RSForestError::ConfigurationError(format!(
                "co2_per_ha must not be negative, got {}",
                self.co2_per_ha
            )));
        }
        if !self.initial_co2_debt.is_finite() {
            return Err(RSForestError::ConfigurationError(
                "initial_co2_debt must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
