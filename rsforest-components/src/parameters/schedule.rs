use rsforest_core::errors::RSForestResult;
use rsforest_core::timeseries::{FloatValue, Horizon, Year, YearSeries};
use serde::{Deserialize, Serialize};

/// Exogenous yearly values given either as a single number or year by year.
///
/// In TOML a schedule is written as `transport = 7.6` or as
/// `transport = [[2020, 7.6], [2021, 7.8], ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    Constant(FloatValue),
    Yearly(Vec<(Year, FloatValue)>),
}

impl Schedule {
    /// Values of the schedule over `horizon`
    ///
    /// Yearly schedules must cover exactly the horizon.
    pub fn to_series(&self, name: &str, horizon: Horizon) -> RSForestResult<YearSeries> {
        match self {
            Schedule::Constant(value) => Ok(YearSeries::constant(horizon, *value)),
            Schedule::Yearly(pairs) => {
                let series = YearSeries::from_pairs(pairs)?;
                series.check_horizon(name, horizon)?;
                Ok(series)
            }
        }
    }

    /// Smallest value of the schedule
    pub fn min(&self) -> FloatValue {
        match self {
            Schedule::Constant(value) => *value,
            Schedule::Yearly(pairs) => pairs
                .iter()
                .map(|(_, value)| *value)
                .fold(FloatValue::INFINITY, FloatValue::min),
        }
    }
}
