//! Yearly series over a fixed simulation horizon.
//!
//! Every series handled by the model covers the same contiguous range of years.
//! The range is described by a [`Horizon`] and the values are stored densely,
//! one per year, so that the year index doubles as the row/column index of the
//! Jacobians built on top of these series.

use crate::errors::{RSForestError, RSForestResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
pub type Year = i32;

/// Inclusive range of simulated years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Horizon {
    pub year_start: Year,
    pub year_end: Year,
}

impl Horizon {
    pub fn new(year_start: Year, year_end: Year) -> RSForestResult<Self> {
        if year_end < year_start {
            return Err(RSForestError::ConfigurationError(format!(
                "Horizon end {} is before its start {}",
                year_end, year_start
            )));
        }
        Ok(Self {
            year_start,
            year_end,
        })
    }

    /// Number of years in the horizon
    ///
    /// An inverted horizon, which [`Horizon::new`] refuses but a struct literal can
    /// still build, is empty.
    pub fn len(&self) -> usize {
        (self.year_end - self.year_start + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn years(&self) -> impl Iterator<Item = Year> {
        self.year_start..=self.year_end
    }

    /// Position of `year` in the horizon, if it is simulated
    pub fn index_of(&self, year: Year) -> Option<usize> {
        if year < self.year_start || year > self.year_end {
            None
        } else {
            Some((year - self.year_start) as usize)
        }
    }

    pub fn year_at(&self, index: usize) -> Year {
        self.year_start + index as Year
    }
}

/// Ordered (year, value) pairs over a contiguous horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSeries {
    year_start: Year,
    values: Array1<FloatValue>,
}

impl YearSeries {
    /// Create a series starting at `year_start` with one value per year.
    pub fn new(year_start: Year, values: Array1<FloatValue>) -> RSForestResult<Self> {
        if values.is_empty() {
            return Err(RSForestError::ConfigurationError(
                "A year series needs at least one value".to_string(),
            ));
        }
        Ok(Self { year_start, values })
    }

    pub fn from_vec(year_start: Year, values: Vec<FloatValue>) -> RSForestResult<Self> {
        Self::new(year_start, Array1::from_vec(values))
    }

    /// Build a series from explicit pairs.
    ///
    /// Years must be strictly increasing and contiguous.
    pub fn from_pairs(pairs: &[(Year, FloatValue)]) -> RSForestResult<Self> {
        let (first_year, _) = *pairs.first().ok_or_else(|| {
            RSForestError::ConfigurationError("A year series needs at least one value".to_string())
        })?;

        for (i, window) in pairs.windows(2).enumerate() {
            let (previous, current) = (window[0].0, window[1].0);
            if current != previous + 1 {
                return Err(RSForestError::ConfigurationError(format!(
                    "Years must be contiguous and strictly increasing: {} follows {} at position {}",
                    current,
                    previous,
                    i + 1
                )));
            }
        }

        Self::from_vec(first_year, pairs.iter().map(|(_, v)| *v).collect())
    }

    /// Same value for every year of `horizon`
    pub fn constant(horizon: Horizon, value: FloatValue) -> Self {
        Self {
            year_start: horizon.year_start,
            values: Array1::from_elem(horizon.len(), value),
        }
    }

    pub fn zeros(horizon: Horizon) -> Self {
        Self::constant(horizon, 0.0)
    }

    pub fn horizon(&self) -> Horizon {
        Horizon {
            year_start: self.year_start,
            year_end: self.year_end(),
        }
    }

    pub fn year_start(&self) -> Year {
        self.year_start
    }

    pub fn year_end(&self) -> Year {
        self.year_start + self.values.len() as Year - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    pub fn into_values(self) -> Array1<FloatValue> {
        self.values
    }

    pub fn to_vec(&self) -> Vec<FloatValue> {
        self.values.to_vec()
    }

    /// Value for a given year
    pub fn at(&self, year: Year) -> Option<FloatValue> {
        self.horizon()
            .index_of(year)
            .map(|index| self.values[index])
    }

    pub fn get(&self, index: usize) -> Option<FloatValue> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Year, FloatValue)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.year_start + i as Year, *v))
    }

    /// Check that the series covers exactly `horizon`
    pub fn check_horizon(&self, name: &str, horizon: Horizon) -> RSForestResult<()> {
        if self.horizon() != horizon {
            return Err(RSForestError::HorizonMismatch {
                name: name.to_string(),
                start: self.year_start,
                end: self.year_end(),
                expected_start: horizon.year_start,
                expected_end: horizon.year_end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn horizon_length_and_indexing() {
        let horizon = Horizon::new(2020, 2030).unwrap();
        assert_eq!(horizon.len(), 11);
        assert_eq!(horizon.index_of(2020), Some(0));
        assert_eq!(horizon.index_of(2030), Some(10));
        assert_eq!(horizon.index_of(2031), None);
        assert_eq!(horizon.year_at(3), 2023);
    }

    #[test]
    fn reversed_horizon_is_rejected() {
        assert!(matches!(
            Horizon::new(2030, 2020),
            Err(RSForestError::ConfigurationError(_))
        ));

        let inverted = Horizon {
            year_start: 2030,
            year_end: 2020,
        };
        assert_eq!(inverted.len(), 0);
        assert!(inverted.is_empty());
        assert_eq!(inverted.years().count(), 0);
    }

    #[test]
    fn from_pairs() {
        let series = YearSeries::from_pairs(&[(2020, 1.0), (2021, 2.0), (2022, 3.0)]).unwrap();
        assert_eq!(series.year_end(), 2022);
        assert_eq!(series.at(2021), Some(2.0));
        assert_eq!(series.values(), &array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_pairs_rejects_gaps_and_duplicates() {
        let gap = YearSeries::from_pairs(&[(2020, 1.0), (2022, 2.0)]);
        assert!(matches!(gap, Err(RSForestError::ConfigurationError(_))));

        let duplicate = YearSeries::from_pairs(&[(2020, 1.0), (2020, 2.0)]);
        assert!(matches!(duplicate, Err(RSForestError::ConfigurationError(_))));

        let decreasing = YearSeries::from_pairs(&[(2021, 1.0), (2020, 2.0)]);
        assert!(matches!(decreasing, Err(RSForestError::ConfigurationError(_))));

        assert!(YearSeries::from_pairs(&[]).is_err());
    }

    #[test]
    fn check_horizon() {
        let horizon = Horizon::new(2020, 2022).unwrap();
        let series = YearSeries::constant(horizon, 1.0);
        assert!(series.check_horizon("x", horizon).is_ok());

        let other = Horizon::new(2020, 2023).unwrap();
        assert!(matches!(
            series.check_horizon("x", other),
            Err(RSForestError::HorizonMismatch { .. })
        ));
    }

    #[test]
    fn iter_yields_years() {
        let series = YearSeries::from_vec(2000, vec![1.0, 2.0]).unwrap();
        let collected: Vec<_> = series.iter().collect();
        assert_eq!(collected, vec![(2000, 1.0), (2001, 2.0)]);
    }
}
