//! Surface evolution parameters

use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Which forest deforestation is allowed to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeforestationPolicy {
    /// Only the unmanaged forest stock can be cleared
    UnmanagedOnly,
    /// Unmanaged forest is cleared first, then managed wood is converted
    UnmanagedThenManagedWood,
}

/// Parameters for the surface evolution.
///
/// Investments are converted into surfaces with a cost per hectare:
///
/// $$ \Delta S = \frac{\max(I, 0)}{c} $$
///
/// with $I$ in G$ and $c$ in $/ha giving $\Delta S$ in Gha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParameters {
    /// Cost of clearing one hectare of forest.
    ///
    /// Default: 8000 $/ha
    pub deforestation_cost_per_ha: FloatValue,

    /// Cost of reforesting one hectare.
    ///
    /// Default: 13800 $/ha
    pub reforestation_cost_per_ha: FloatValue,

    /// Cost of planting one hectare of managed wood.
    ///
    /// Default: 13047 $/ha
    pub managed_wood_cost_per_ha: FloatValue,

    /// Unmanaged forest at the start of the horizon.
    ///
    /// Default: 1.91 Gha
    pub initial_unmanaged_forest: FloatValue,

    /// Protected forest, constant over the horizon.
    ///
    /// Default: 0.84 Gha
    pub initial_protected_forest: FloatValue,

    /// Managed wood at the start of the horizon.
    ///
    /// Default: 1.15 Gha
    pub initial_managed_wood: FloatValue,

    /// Default: unmanaged then managed wood
    pub deforestation_policy: DeforestationPolicy,
}

impl Default for SurfaceParameters {
    fn default() -> Self {
        Self {
            deforestation_cost_per_ha: 8000.0,
            reforestation_cost_per_ha: 13800.0,
            managed_wood_cost_per_ha: 13047.0,
            initial_unmanaged_forest: 1.91,
            initial_protected_forest: 0.84,
            initial_managed_wood: 1.15,
            deforestation_policy: DeforestationPolicy::UnmanagedThenManagedWood,
        }
    }
}

impl SurfaceParameters {
    pub fn validate(&self) -> RSForestResult<()> {
        for (name, value) in [
            ("deforestation_cost_per_ha", self.deforestation_cost_per_ha),
            ("reforestation_cost_per_ha", self.reforestation_cost_per_ha),
            ("managed_wood_cost_per_ha", self.managed_wood_cost_per_ha),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RSForestError::ConfigurationError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("initial_unmanaged_forest", self.initial_unmanaged_forest),
            ("initial_protected_forest", self.initial_protected_forest),
            ("initial_managed_wood", self.initial_managed_wood),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RSForestError::ConfigurationError(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
