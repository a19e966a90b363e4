//! Biomass production parameters

use rsforest_core::errors::{RSForestError, RSForestResult};
use rsforest_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// kg of CO2 per kg of carbon
const CO2_PER_CARBON: FloatValue = 44.01 / 12.0;

/// Physical constants of biomass production.
///
/// A hectare of harvested forest yields wood and residue, each with its own
/// density and volume. Managed wood is harvested on a fixed cycle and only starts
/// producing `construction_delay` years after it was planted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionParameters {
    /// Years between planting managed wood and its first harvest.
    ///
    /// Default: 3 years
    pub construction_delay: usize,

    /// Managed-wood investment of the `construction_delay` years before the horizon,
    /// oldest first.
    ///
    /// Default: 1.135081 G$ for each year
    pub investment_history: Vec<FloatValue>,

    /// Default: 600 kg/m3
    pub wood_density: FloatValue,

    /// Default: 200 kg/m3
    pub residue_density: FloatValue,

    /// Default: 96 m3/ha
    pub wood_volume_per_ha: FloatValue,

    /// Default: 46.5 m3/ha
    pub residue_volume_per_ha: FloatValue,

    /// Default: 25 years
    pub years_between_harvest: FloatValue,

    /// Share of harvested wood that comes back through recycling.
    ///
    /// Default: 0.52
    pub recycle_share: FloatValue,

    /// Default: 0.48
    pub wood_energy_share: FloatValue,

    /// Default: 0.48
    pub residue_energy_share: FloatValue,

    /// Energy content of dry biomass.
    ///
    /// Default: 3.6 kWh/kg
    pub calorific_value: FloatValue,

    /// Mass fraction of carbon in dry biomass.
    ///
    /// Default: 0.425
    pub carbon_fraction: FloatValue,
}

impl Default for ProductionParameters {
    fn default() -> Self {
        Self {
            construction_delay: 3,
            investment_history: vec![1.135081; 3],
            wood_density: 600.0,
            residue_density: 200.0,
            wood_volume_per_ha: 96.0,
            residue_volume_per_ha: 46.5,
            years_between_harvest: 25.0,
            recycle_share: 0.52,
            wood_energy_share: 0.48,
            residue_energy_share: 0.48,
            calorific_value: 3.6,
            carbon_fraction: 0.425,
        }
    }
}

impl ProductionParameters {
    /// kg of wood per hectare
    pub fn wood_mass_per_ha(&self) -> FloatValue {
        self.wood_density * self.wood_volume_per_ha
    }

    /// kg of residue per hectare
    pub fn residue_mass_per_ha(&self) -> FloatValue {
        self.residue_density * self.residue_volume_per_ha
    }

    /// kg of biomass per hectare
    pub fn mass_per_ha(&self) -> FloatValue {
        self.wood_mass_per_ha() + self.residue_mass_per_ha()
    }

    pub fn wood_share(&self) -> FloatValue {
        self.wood_mass_per_ha() / self.mass_per_ha()
    }

    pub fn residue_share(&self) -> FloatValue {
        self.residue_mass_per_ha() / self.mass_per_ha()
    }

    /// Fraction of the total mass used for energy
    pub fn energy_share(&self) -> FloatValue {
        self.wood_share() * self.wood_energy_share
            + self.residue_share() * self.residue_energy_share
    }

    /// kg of biomass obtained per hectare of productive managed wood and per year
    pub fn managed_wood_yield(&self) -> FloatValue {
        self.mass_per_ha() / self.years_between_harvest / (1.0 - self.recycle_share)
    }

    /// kg of CO2 captured per kg of biomass grown
    pub fn co2_per_kg(&self) -> FloatValue {
        self.carbon_fraction * CO2_PER_CARBON
    }

    /// kg of CO2 emitted per kWh of biomass energy
    pub fn co2_intensity(&self) -> FloatValue {
        -self.co2_per_kg() / self.calorific_value
    }

    pub fn validate(&self) -> RSForestResult<()> {
        if self.construction_delay < 1 {
            return Err(RSForestError::ConfigurationError(
                "construction_delay must be at least 1 year".to_string(),
            ));
        }
        if self.investment_history.len() != self.construction_delay {
            return Err(RSForestError::ConfigurationError(format!(
                "investment_history has {} values but construction_delay is {}",
                self.investment_history.len(),
                self.construction_delay
            )));
        }
        if let Some(value) = self
            .investment_history
            .iter()
            .find(|v| !(v.is_finite() && **v >= 0.0))
        {
            return Err(RSForestError::ConfigurationError(format!(
                "investment_history values must not be negative, got {}",
                value
            )));
        }
        for (name, value) in [
            ("wood_density", self.wood_density),
            ("residue_density", self.residue_density),
            ("wood_volume_per_ha", self.wood_volume_per_ha),
            ("residue_volume_per_ha", self.residue_volume_per_ha),
            ("years_between_harvest", self.years_between_harvest),
            ("calorific_value", self.calorific_value),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RSForestError::ConfigurationError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..1.0).contains(&self.recycle_share) {
            return Err(RSForestError::ConfigurationError(format!(
                "recycle_share must be in [0, 1), got {}",
                self.recycle_share
            )));
        }
        for (name, value) in [
            ("wood_energy_share", self.wood_energy_share),
            ("residue_energy_share", self.residue_energy_share),
            ("carbon_fraction", self.carbon_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RSForestError::ConfigurationError(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Everything the biomass production component needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomassParameters {
    pub production: ProductionParameters,

    /// Converts `investment_history` into planted surface.
    ///
    /// Default: 13047 $/ha
    pub managed_wood_cost_per_ha: FloatValue,

    /// Managed wood at the start of the horizon, including the plantings of
    /// `investment_history`.
    ///
    /// Default: 1.15 Gha
    pub initial_managed_wood: FloatValue,
}

impl Default for BiomassParameters {
    fn default() -> Self {
        Self {
            production: ProductionParameters::default(),
            managed_wood_cost_per_ha: 13047.0,
            initial_managed_wood: 1.15,
        }
    }
}

impl BiomassParameters {
    /// Surface planted in each year of the investment history (Gha)
    pub fn history_surface(&self) -> Vec<FloatValue> {
        self.production
            .investment_history
            .iter()
            .map(|investment| investment / self.managed_wood_cost_per_ha)
            .collect()
    }

    pub fn validate(&self) -> RSForestResult<()> {
        self.production.validate()?;
        if !(self.managed_wood_cost_per_ha.is_finite() && self.managed_wood_cost_per_ha > 0.0) {
            return Err(RSForestError::ConfigurationError(format!(
                "managed_wood_cost_per_ha must be positive, got {}",
                self.managed_wood_cost_per_ha
            )));
        }
        let planted: FloatValue = self.history_surface().iter().sum();
        if planted > self.initial_managed_wood {
            return Err(RSForestError::ConfigurationError(format!(
                "investment_history plants {} Gha which exceeds the initial managed wood of {} Gha",
                planted, self.initial_managed_wood
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shares_sum_to_one() {
        let parameters = ProductionParameters::default();
        assert_relative_eq!(parameters.wood_share() + parameters.residue_share(), 1.0);
        assert_relative_eq!(parameters.mass_per_ha(), 600.0 * 96.0 + 200.0 * 46.5);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(BiomassParameters::default().validate().is_ok());
    }

    #[test]
    fn co2_of_dry_biomass() {
        let parameters = ProductionParameters::default();
        assert_relative_eq!(parameters.co2_per_kg(), 0.425 * 44.01 / 12.0);
        assert_relative_eq!(parameters.co2_intensity(), -0.425 * 44.01 / 12.0 / 3.6);
    }

    #[test]
    fn delay_and_history_must_agree() {
        let mut parameters = BiomassParameters::default();
        parameters.production.construction_delay = 0;
        parameters.production.investment_history = vec![];
        assert!(matches!(
            parameters.validate(),
            Err(RSForestError::ConfigurationError(_))
        ));

        let mut parameters = BiomassParameters::default();
        parameters.production.investment_history = vec![1.0, 1.0];
        assert!(matches!(
            parameters.validate(),
            Err(RSForestError::ConfigurationError(_))
        ));
    }

    #[test]
    fn history_cannot_exceed_initial_surface() {
        let mut parameters = BiomassParameters::default();
        parameters.initial_managed_wood = 1e-4;
        assert!(matches!(
            parameters.validate(),
            Err(RSForestError::ConfigurationError(_))
        ));
    }
}
