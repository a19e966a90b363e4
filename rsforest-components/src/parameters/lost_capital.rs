use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Capital costs used to value forfeited investments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LostCapitalParameters {
    /// Default: 8000 $/ha
    pub deforestation_cost_per_ha: FloatValue,
    /// Default: 13047 $/ha
    pub managed_wood_cost_per_ha: FloatValue,
}

impl Default for LostCapitalParameters {
    fn default() -> Self {
        Self {
            deforestation_cost_per_ha: 8000.0,
            managed_wood_cost_per_ha: 13047.0,
        }
    }
}

impl LostCapitalParameters {
    pub fn validate(&self) -> RSForestResult<()> {
        for (name, value) in [
            ("deforestation_cost_per_ha", self.deforestation_cost_per_ha),
            ("managed_wood_cost_per_ha", self.managed_wood_cost_per_ha),
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
