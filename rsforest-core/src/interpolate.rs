//! Control-point parameterization of yearly series.
//!
//! An optimizer rarely steers every year of a multi-decade series directly.
//! Instead it moves a handful of poles placed at knot years and the yearly series is
//! recovered by piecewise-linear interpolation between them:
//!
//! $$ x = M c $$
//!
//! where $c$ is the [`ControlVector`] and $M$ is the [`InterpolationMap`], an $N \times P$
//! matrix that only depends on the horizon and the [`PoleLayout`].
//! Because the expansion is linear, a year-indexed Jacobian $J$ converts to a
//! pole-indexed one with $J M$.
//!
//! Outside the range covered by the knots the series is clamped to the nearest pole.

use crate::errors::{RSForestError, RSForestResult};
use crate::jacobian::Jacobian;
use crate::timeseries::{FloatValue, Horizon, Year, YearSeries};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Ordered pole values owned by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlVector(Array1<FloatValue>);

impl ControlVector {
    pub fn new(values: Vec<FloatValue>) -> Self {
        Self(Array1::from_vec(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.0
    }
}

impl From<Vec<FloatValue>> for ControlVector {
    fn from(values: Vec<FloatValue>) -> Self {
        Self::new(values)
    }
}

/// Placement of the poles on the simulation horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoleLayout {
    /// `n_poles` poles evenly spread from the first to the last simulated year
    Even { n_poles: usize },
    /// Poles at explicit, strictly increasing knot years
    Knots { years: Vec<Year> },
}

impl PoleLayout {
    /// Resolve the knot years of this layout on `horizon`.
    pub fn knot_years(&self, horizon: Horizon) -> RSForestResult<Vec<Year>> {
        match self {
            PoleLayout::Even { n_poles } => {
                let n_poles = *n_poles;
                if n_poles < 2 {
                    return Err(RSForestError::ConfigurationError(format!(
                        "At least 2 poles are required, got {}",
                        n_poles
                    )));
                }
                let n_years = horizon.len();
                if n_poles > n_years {
                    return Err(RSForestError::ConfigurationError(format!(
                        "{} poles cannot be placed on a horizon of {} years",
                        n_poles, n_years
                    )));
                }
                let intervals = n_poles - 1;
                if (n_years - 1) % intervals != 0 {
                    return Err(RSForestError::ConfigurationError(format!(
                        "A horizon of {} years cannot be split into {} equal intervals; \
                         choose a pole count P with (N - 1) divisible by (P - 1)",
                        n_years, intervals
                    )));
                }
                let spacing = ((n_years - 1) / intervals) as Year;
                Ok((0..n_poles as Year)
                    .map(|k| horizon.year_start + k * spacing)
                    .collect())
            }
            PoleLayout::Knots { years } => {
                if years.len() < 2 {
                    return Err(RSForestError::ConfigurationError(format!(
                        "At least 2 poles are required, got {}",
                        years.len()
                    )));
                }
                if years.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(RSForestError::ConfigurationError(
                        "Knot years must be strictly increasing".to_string(),
                    ));
                }
                Ok(years.clone())
            }
        }
    }
}

/// Linear operator expanding a [`ControlVector`] to one value per simulated year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationMap {
    horizon: Horizon,
    pole_years: Vec<Year>,
    weights: Array2<FloatValue>,
}

impl InterpolationMap {
    pub fn build(horizon: Horizon, layout: &PoleLayout) -> RSForestResult<Self> {
        let pole_years = layout.knot_years(horizon)?;
        let n_poles = pole_years.len();
        let first = pole_years[0];
        let last = pole_years[n_poles - 1];

        let mut weights = Array2::zeros((horizon.len(), n_poles));
        for (row, year) in horizon.years().enumerate() {
            if year <= first {
                weights[[row, 0]] = 1.0;
            } else if year >= last {
                weights[[row, n_poles - 1]] = 1.0;
            } else {
                // `year` is strictly inside the knot range so a bracketing interval exists
                let k = pole_years
                    .windows(2)
                    .position(|w| w[0] <= year && year < w[1])
                    .unwrap_or(n_poles - 2);
                let span = (pole_years[k + 1] - pole_years[k]) as FloatValue;
                let w = (year - pole_years[k]) as FloatValue / span;
                weights[[row, k]] = 1.0 - w;
                weights[[row, k + 1]] = w;
            }
        }

        Ok(Self {
            horizon,
            pole_years,
            weights,
        })
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn n_poles(&self) -> usize {
        self.pole_years.len()
    }

    pub fn pole_years(&self) -> &[Year] {
        &self.pole_years
    }

    pub fn weights(&self) -> &Array2<FloatValue> {
        &self.weights
    }

    /// Expand a control vector into a yearly series
    pub fn apply(&self, controls: &ControlVector) -> RSForestResult<YearSeries> {
        if controls.len() != self.n_poles() {
            return Err(RSForestError::ConfigurationError(format!(
                "Expected {} control points, got {}",
                self.n_poles(),
                controls.len()
            )));
        }
        YearSeries::new(self.horizon.year_start, self.weights.dot(controls.values()))
    }

    /// Convert a year-indexed Jacobian into a pole-indexed one
    pub fn to_poles(&self, jacobian: &Jacobian) -> RSForestResult<PoleJacobian> {
        if jacobian.horizon() != self.horizon {
            return Err(RSForestError::ConfigurationError(format!(
                "Jacobian horizon {:?} does not match interpolation horizon {:?}",
                jacobian.horizon(),
                self.horizon
            )));
        }
        Ok(PoleJacobian {
            horizon: self.horizon,
            pole_years: self.pole_years.clone(),
            values: jacobian.values().dot(&self.weights),
        })
    }
}

/// Sensitivities of a yearly output with respect to poles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleJacobian {
    horizon: Horizon,
    pole_years: Vec<Year>,
    values: Array2<FloatValue>,
}

impl PoleJacobian {
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn pole_years(&self) -> &[Year] {
        &self.pole_years
    }

    pub fn values(&self) -> &Array2<FloatValue> {
        &self.values
    }

    /// Entry for an output year and a pole position
    pub fn at(&self, output_year: Year, pole: usize) -> Option<FloatValue> {
        let row = self.horizon.index_of(output_year)?;
        self.values.get((row, pole)).copied()
    }
}

/// Expands control vectors for a fixed horizon and pole layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointInterpolator {
    map: InterpolationMap,
}

impl ControlPointInterpolator {
    pub fn new(horizon: Horizon, layout: &PoleLayout) -> RSForestResult<Self> {
        Ok(Self {
            map: InterpolationMap::build(horizon, layout)?,
        })
    }

    /// Evenly spaced poles across `[year_start, year_end]`
    pub fn even(horizon: Horizon, n_poles: usize) -> RSForestResult<Self> {
        Self::new(horizon, &PoleLayout::Even { n_poles })
    }

    /// Expand `controls` and return the series alongside the reusable map
    pub fn expand(&self, controls: &ControlVector) -> RSForestResult<(YearSeries, &InterpolationMap)> {
        Ok((self.map.apply(controls)?, &self.map))
    }

    pub fn map(&self) -> &InterpolationMap {
        &self.map
    }
}
