//! Dense year-by-year sensitivity matrices.
//!
//! A [`Jacobian`] holds $\partial O_{y_{out}} / \partial I_{y_{in}}$ for two series
//! defined on the same horizon: rows are output years and columns are input years.
//! Future inputs can never influence past outputs so every valid Jacobian is lower
//! triangular; [`Jacobian::check_causality`] enforces this.
//!
//! The [`operators`] module contains the handful of structured matrices the
//! components use to express their local derivatives.

use crate::errors::{RSForestError, RSForestResult};
use crate::timeseries::{FloatValue, Horizon, Year};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Matrix of partial derivatives between two yearly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jacobian {
    horizon: Horizon,
    values: Array2<FloatValue>,
}

impl Jacobian {
    pub fn from_array(horizon: Horizon, values: Array2<FloatValue>) -> RSForestResult<Self> {
        let n = horizon.len();
        if values.dim() != (n, n) {
            return Err(RSForestError::ConfigurationError(format!(
                "Jacobian shape {:?} does not match a horizon of {} years",
                values.dim(),
                n
            )));
        }
        Ok(Self { horizon, values })
    }

    pub fn zeros(horizon: Horizon) -> Self {
        let n = horizon.len();
        Self {
            horizon,
            values: Array2::zeros((n, n)),
        }
    }

    pub fn identity(horizon: Horizon) -> Self {
        Self {
            horizon,
            values: operators::identity(horizon.len()),
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn values(&self) -> &Array2<FloatValue> {
        &self.values
    }

    pub fn into_values(self) -> Array2<FloatValue> {
        self.values
    }

    /// Entry for a pair of years, `None` if either is outside the horizon
    pub fn at(&self, output_year: Year, input_year: Year) -> Option<FloatValue> {
        let row = self.horizon.index_of(output_year)?;
        let column = self.horizon.index_of(input_year)?;
        Some(self.values[[row, column]])
    }

    /// Sensitivity of every output year to the input of `input_year`
    pub fn column(&self, input_year: Year) -> Option<Vec<FloatValue>> {
        let column = self.horizon.index_of(input_year)?;
        Some(self.values.column(column).to_vec())
    }

    /// Sensitivity of the output of `output_year` to every input year
    pub fn row(&self, output_year: Year) -> Option<Vec<FloatValue>> {
        let row = self.horizon.index_of(output_year)?;
        Some(self.values.row(row).to_vec())
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Fail if any entry links a later input year to an earlier output year.
    ///
    /// The strictly upper triangular part of a causal Jacobian is exactly zero:
    /// every operator used to build it is lower triangular, so no tolerance is applied.
    pub fn check_causality(&self, output: &str, input: &str) -> RSForestResult<()> {
        for ((row, column), value) in self.values.indexed_iter() {
            if column > row && *value != 0.0 {
                return Err(RSForestError::CausalityViolation {
                    output: output.to_string(),
                    input: input.to_string(),
                    output_year: self.horizon.year_at(row),
                    input_year: self.horizon.year_at(column),
                    value: *value,
                });
            }
        }
        Ok(())
    }
}

/// Structured operators used to assemble local derivatives.
///
/// All operators act on column vectors indexed by year, so `A.dot(x)` maps an
/// input series `x` to an output series.
pub mod operators {
    use crate::timeseries::FloatValue;
    use ndarray::{Array1, Array2};

    pub fn identity(n: usize) -> Array2<FloatValue> {
        Array2::eye(n)
    }

    pub fn scaled_identity(n: usize, factor: FloatValue) -> Array2<FloatValue> {
        Array2::eye(n) * factor
    }

    pub fn diagonal(values: &Array1<FloatValue>) -> Array2<FloatValue> {
        Array2::from_diag(values)
    }

    /// Running sum: $y_i = \sum_{k \le i} x_k$
    pub fn running_sum(n: usize) -> Array2<FloatValue> {
        Array2::from_shape_fn((n, n), |(i, k)| if k <= i { 1.0 } else { 0.0 })
    }

    /// First difference: $y_i = x_i - x_{i-1}$, with $x_{-1}$ treated as a constant
    pub fn difference(n: usize) -> Array2<FloatValue> {
        Array2::from_shape_fn((n, n), |(i, k)| {
            if k == i {
                1.0
            } else if k + 1 == i {
                -1.0
            } else {
                0.0
            }
        })
    }

    /// Lag by `lag` years: $y_i = x_{i - lag}$ where $i \ge lag$, zero before
    pub fn lag(n: usize, lag: usize) -> Array2<FloatValue> {
        Array2::from_shape_fn((n, n), |(i, k)| if i >= lag && k == i - lag { 1.0 } else { 0.0 })
    }
}
